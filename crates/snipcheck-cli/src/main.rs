//! Snipcheck CLI
//!
//! Runs code snippets from the command line or serves them over HTTP.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snipcheck::{CodeSubmission, Config, EXAMPLE_CONFIG, Service};
use tokio::io::AsyncReadExt;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

mod server;

#[derive(Parser)]
#[command(name = "snipcheck")]
#[command(about = "Run code snippets and point at the lines that failed")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the remote line resolver and only scan traces
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: snipcheck.toml)
        #[arg(short, long, default_value = "snipcheck.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a snippet and print the response envelope as JSON
    Run {
        /// Source file to run ("-" reads stdin)
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Serve the code interpreter over HTTP
    Serve {
        /// Address to bind (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Show the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Ok(path) = dotenv {
        debug!(?path, "loaded environment file");
    }

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Run { source, pretty } => {
            let config = load_config(cli.config.as_deref())?;
            run_snippet(&config, cli.offline, &source, pretty).await
        }
        Commands::Serve { bind } => {
            let config = load_config(cli.config.as_deref())?;
            let service =
                Service::from_config(&config, cli.offline).context("failed to build service")?;
            let bind = bind.unwrap_or_else(|| config.server.bind_addr.clone());
            server::serve(service, &bind, config.server.cors).await
        }
        Commands::ShowConfig => {
            let config = load_config(cli.config.as_deref())?;
            show_config(&config);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => info!(?path, "loading configuration"),
        None => debug!("using default configuration"),
    }
    Config::load(path).context("failed to load configuration")
}

async fn run_snippet(config: &Config, offline: bool, source: &Path, pretty: bool) -> Result<()> {
    let code = read_source(source).await?;
    let service = Service::from_config(config, offline).context("failed to build service")?;

    info!(interpreter = %config.interpreter.name, "running snippet");
    let handled = service
        .handle_detailed(&CodeSubmission::new(code))
        .await
        .context("execution failed")?;
    let envelope = &handled.envelope;

    let json = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    println!("{json}");

    // Exit with appropriate code
    if handled.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

async fn read_source(source: &Path) -> Result<String> {
    if source.as_os_str() == "-" {
        let mut code = String::new();
        tokio::io::stdin()
            .read_to_string(&mut code)
            .await
            .context("failed to read source from stdin")?;
        return Ok(code);
    }

    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("failed to read source file '{}'", source.display()))
}

fn show_config(config: &Config) {
    println!("Interpreter: {}", config.interpreter.name);
    println!("  Command: {:?}", config.interpreter.command);
    println!("  Source marker: {}", config.interpreter.source_marker);
    println!();
    println!("Resolver enabled: {}", config.resolver.enabled);
    println!("  Model: {}", config.resolver.model);
    println!("  Base URL: {}", config.resolver.base_url);
    println!(
        "  API key ({}): {}",
        config.resolver.api_key_env,
        if config.resolver.api_key().is_some() {
            "set"
        } else {
            "missing"
        }
    );
    println!("  Timeout: {}s", config.resolver.timeout_secs);
    println!();
    println!("Server bind address: {}", config.server.bind_addr);
    println!("  CORS: {}", config.server.cors);
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}

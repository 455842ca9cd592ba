//! A library for running code snippets and pointing at the lines that failed.
//!
//! Snipcheck runs a submission through an interpreter in its own child
//! process and returns either the exact stdout or the exact diagnostic trace.
//! On failure it asks a remote model which lines of the submission were
//! responsible, falling back to scanning the trace when the model cannot help.
//!
//! # Features
//!
//! - **Isolated capture** — Every execution gets private stdout/stderr pipes, so concurrent runs never mix output.
//! - **Byte-exact results** — Success returns stdout verbatim; failure returns the interpreter's own trace.
//! - **Two-tier localization** — Gemini structured output first, deterministic `File "<string>", line N` scan second.
//! - **TOML configuration** — Interpreter, resolver and server settings with environment overrides.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, InterpreterConfig};
pub use locate::{
    GeminiResolver, LineResolver, Localizer, ResolutionError, TraceLineExtractor,
};
pub use runner::{ExecuteError, Runner};
pub use service::{Handled, Service, ServiceError};
pub use types::{CodeSubmission, ErrorLines, ExecutionOutcome, ResponseEnvelope};

pub mod capture;
pub mod config;
pub mod locate;
pub mod runner;
pub mod service;
pub mod types;

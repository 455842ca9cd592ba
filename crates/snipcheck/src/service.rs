//! Request orchestration
//!
//! Runs a submission and, if it faulted, localizes the error lines.

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Config;
use crate::locate::{GeminiResolver, LineResolver, Localizer, ResolutionError, TraceLineExtractor};
use crate::runner::{ExecuteError, Runner};
use crate::types::{CodeSubmission, ResponseEnvelope};

/// Errors building a [`Service`] from configuration
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid source marker: {0}")]
    SourceMarker(#[from] regex::Error),

    #[error("failed to set up line resolver: {0}")]
    Resolver(#[from] ResolutionError),
}

/// A response together with whether the submission ran cleanly
///
/// A fault can still produce an empty `error` list, so callers that need the
/// pass/fail signal read it here rather than from the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    pub success: bool,
    pub envelope: ResponseEnvelope,
}

/// Execute-then-localize pipeline for one submission at a time
///
/// Each call runs in its own child process, so a single service can be
/// shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct Service<R = GeminiResolver> {
    runner: Runner,
    localizer: Localizer<R>,
}

impl Service<GeminiResolver> {
    /// Build the service described by `config`
    ///
    /// With `offline` set, or the resolver disabled in config, errors are
    /// localized by trace scanning alone.
    pub fn from_config(config: &Config, offline: bool) -> Result<Self, ServiceError> {
        let runner = Runner::new(config.interpreter.clone());
        let fallback = TraceLineExtractor::new(runner.source_marker())?;

        let localizer = if offline || !config.resolver.enabled {
            Localizer::fallback_only(fallback)
        } else {
            Localizer::new(GeminiResolver::new(&config.resolver)?, fallback)
        };

        Ok(Self::new(runner, localizer))
    }
}

impl<R: LineResolver> Service<R> {
    pub fn new(runner: Runner, localizer: Localizer<R>) -> Self {
        Self { runner, localizer }
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn localizer(&self) -> &Localizer<R> {
        &self.localizer
    }

    /// Run a submission and build its response
    ///
    /// Faults in the submitted code and resolver failures are folded into the
    /// envelope. Only a broken interpreter setup surfaces as an error.
    pub async fn handle(
        &self,
        submission: &CodeSubmission,
    ) -> Result<ResponseEnvelope, ExecuteError> {
        Ok(self.handle_detailed(submission).await?.envelope)
    }

    /// Like [`handle`](Self::handle), keeping the pass/fail signal
    #[instrument(skip_all, fields(code_len = submission.code.len()))]
    pub async fn handle_detailed(
        &self,
        submission: &CodeSubmission,
    ) -> Result<Handled, ExecuteError> {
        let outcome = self.runner.execute(&submission.code).await?;

        if outcome.success {
            info!(output_len = outcome.text.len(), "submission succeeded");
            return Ok(Handled {
                success: true,
                envelope: ResponseEnvelope::from_success(outcome),
            });
        }

        let error = self.localizer.localize(&submission.code, &outcome.text).await;
        info!(?error, "submission faulted");

        Ok(Handled {
            success: false,
            envelope: ResponseEnvelope {
                error,
                result: outcome.text,
            },
        })
    }
}

//! Error localization
//!
//! Maps a diagnostic trace back to line numbers in the submission. A remote
//! resolver is tried first; any failure there falls back to scanning the trace
//! for the interpreter's synthetic-source frames.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, instrument, warn};

pub use crate::locate::fallback::TraceLineExtractor;
pub use crate::locate::gemini::GeminiResolver;

mod fallback;
mod gemini;

use crate::types::{ErrorLines, line_count};

/// Errors from a line resolver
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no API key in environment variable {0}")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("resolver returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("resolver returned no content")]
    EmptyResponse,

    #[error("malformed resolver response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("line {line} is outside the submission ({line_count} lines)")]
    LineOutOfRange { line: u32, line_count: usize },

    #[error("invalid source marker pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Something that can point at the lines of `code` responsible for `diagnostic`
pub trait LineResolver: Send + Sync {
    fn resolve_lines(
        &self,
        code: &str,
        diagnostic: &str,
    ) -> impl Future<Output = Result<ErrorLines, ResolutionError>> + Send;
}

/// Reject line numbers that do not exist in `code`
pub fn validate_lines(lines: ErrorLines, code: &str) -> Result<ErrorLines, ResolutionError> {
    let line_count = line_count(code);
    if let Some(&line) = lines
        .iter()
        .find(|&&line| line == 0 || line as usize > line_count)
    {
        return Err(ResolutionError::LineOutOfRange { line, line_count });
    }
    Ok(lines)
}

/// Tries a primary resolver and falls back to trace scanning
#[derive(Debug, Clone)]
pub struct Localizer<R> {
    primary: Option<R>,
    fallback: TraceLineExtractor,
}

impl<R: LineResolver> Localizer<R> {
    pub fn new(primary: R, fallback: TraceLineExtractor) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }

    /// Localizer that only scans traces
    pub fn fallback_only(fallback: TraceLineExtractor) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Resolve error lines; never fails
    #[instrument(skip_all, fields(diagnostic_len = diagnostic.len()))]
    pub async fn localize(&self, code: &str, diagnostic: &str) -> ErrorLines {
        if let Some(primary) = &self.primary {
            let resolved = primary
                .resolve_lines(code, diagnostic)
                .await
                .and_then(|lines| validate_lines(lines, code));

            match resolved {
                Ok(lines) => {
                    debug!(?lines, "primary resolver succeeded");
                    return lines;
                }
                Err(e) => warn!(error = %e, "line resolver failed, scanning trace instead"),
            }
        }

        let lines = self.fallback.extract(diagnostic);
        debug!(?lines, "fallback extraction");
        validate_lines(lines, code).unwrap_or_else(|e| {
            debug!(error = %e, "discarding fallback line");
            ErrorLines::new()
        })
    }
}

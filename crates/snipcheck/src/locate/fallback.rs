//! Deterministic trace scanning

use std::future::{Future, ready};

use regex::Regex;

use crate::locate::{LineResolver, ResolutionError};
use crate::types::ErrorLines;

/// Pulls the first `File "<marker>", line N` reference out of a trace
#[derive(Debug, Clone)]
pub struct TraceLineExtractor {
    pattern: Regex,
}

impl TraceLineExtractor {
    /// Build an extractor for the interpreter's synthetic-source marker
    pub fn new(source_marker: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r#"File "{}", line (\d+)"#,
            regex::escape(source_marker)
        ))?;
        Ok(Self { pattern })
    }

    /// Line of the earliest marker reference, or nothing
    pub fn extract(&self, diagnostic: &str) -> ErrorLines {
        self.pattern
            .captures(diagnostic)
            .and_then(|caps| caps[1].parse().ok())
            .into_iter()
            .collect()
    }
}

impl LineResolver for TraceLineExtractor {
    fn resolve_lines(
        &self,
        _code: &str,
        diagnostic: &str,
    ) -> impl Future<Output = Result<ErrorLines, ResolutionError>> + Send {
        ready(Ok(self.extract(diagnostic)))
    }
}

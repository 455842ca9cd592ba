use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the submission text in the interpreter command
pub const SOURCE_PLACEHOLDER: &str = "{source}";

/// File name Python gives to code compiled from a string
pub const DEFAULT_SOURCE_MARKER: &str = "<string>";

/// Configuration for the interpreter that runs submissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Human-readable name (e.g., "Python 3")
    pub name: String,

    /// Command and arguments
    ///
    /// `{source}` is replaced by the submission. Without a placeholder the
    /// submission is written to the child's stdin instead.
    pub command: Vec<String>,

    /// File name the interpreter reports for the submission in tracebacks
    #[serde(default = "default_source_marker")]
    pub source_marker: String,

    /// Environment variables to set for the child
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// PATH override for the child (inherits the host PATH if unset)
    #[serde(default)]
    pub path: Option<String>,
}

impl InterpreterConfig {
    /// Whether the submission is passed on the command line
    pub fn takes_source_argument(&self) -> bool {
        self.command.iter().any(|arg| arg.contains(SOURCE_PLACEHOLDER))
    }

    /// Expand the source placeholder in the command
    pub fn expand_command(&self, source: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| arg.replace(SOURCE_PLACEHOLDER, source))
            .collect()
    }
}

fn default_source_marker() -> String {
    DEFAULT_SOURCE_MARKER.to_owned()
}

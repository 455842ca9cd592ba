use serde::{Deserialize, Serialize};

/// 1-based line numbers into a submission, in resolver order
pub type ErrorLines = Vec<u32>;

/// Code submitted for a single execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSubmission {
    /// Program text, run as one synthetic source unit
    pub code: String,
}

impl CodeSubmission {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Number of lines in the submission, counting the first line as line 1
    pub fn line_count(&self) -> usize {
        line_count(&self.code)
    }
}

/// Result of running a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Whether the program ran to completion without a fault
    pub success: bool,

    /// Captured stdout on success, the formatted diagnostic trace on failure
    pub text: String,
}

impl ExecutionOutcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }
}

/// Wire response for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Lines believed responsible for the fault (empty on success)
    pub error: ErrorLines,

    /// Exact program output or diagnostic trace
    pub result: String,
}

impl ResponseEnvelope {
    /// Envelope for a run that did not fault
    pub fn from_success(outcome: ExecutionOutcome) -> Self {
        Self {
            error: Vec::new(),
            result: outcome.text,
        }
    }
}

/// Count lines the way an interpreter numbers them.
///
/// `\n`, `\r\n` and a bare `\r` each end a line, and the line after a
/// trailing break is still addressable (a parser reports errors there). The
/// empty string has zero lines.
pub(crate) fn line_count(code: &str) -> usize {
    if code.is_empty() {
        return 0;
    }
    let breaks = code.matches('\r').count() + code.matches('\n').count()
        - code.matches("\r\n").count();
    breaks + 1
}

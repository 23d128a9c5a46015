//! User-facing diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation failed
    Error,
    /// The operation went through with a remark
    Warning,
}

/// One message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Short title
    pub summary: String,
    /// Full message
    pub detail: String,
}

impl Diagnostic {
    /// Error diagnostic
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Warning diagnostic
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Error diagnostic carrying an error's message
    pub fn from_error(summary: impl Into<String>, error: &Error) -> Self {
        Self::error(summary, error.to_string())
    }

    /// Whether this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        if self.detail.is_empty() {
            write!(f, "{}: {}", severity, self.summary)
        } else {
            write!(f, "{}: {}: {}", severity, self.summary, self.detail)
        }
    }
}

/// Whether any diagnostic is an error
pub fn has_error(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// Outcome of a resource or data source operation: the new state (`None`
/// when the object is gone) and what to tell the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    /// New state
    pub state: Option<serde_json::Value>,
    /// Errors and warnings
    pub diagnostics: Vec<Diagnostic>,
}

impl Response {
    /// Successful response carrying a state
    pub fn with_state(state: serde_json::Value) -> Self {
        Self {
            state: Some(state),
            diagnostics: Vec::new(),
        }
    }

    /// Failed response
    pub fn failed(summary: impl Into<String>, error: &Error) -> Self {
        Self {
            state: None,
            diagnostics: vec![Diagnostic::from_error(summary, error)],
        }
    }

    /// Add an error diagnostic
    pub fn add_error(&mut self, summary: impl Into<String>, error: &Error) {
        self.diagnostics.push(Diagnostic::from_error(summary, error));
    }

    /// Whether any diagnostic is an error
    pub fn has_error(&self) -> bool {
        has_error(&self.diagnostics)
    }

    /// Details of the error diagnostics
    pub fn errors(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.detail.as_str())
            .collect()
    }

    /// Warning diagnostics
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error()).collect()
    }
}

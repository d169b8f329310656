//! Structured progress reports

use serde::Serialize;

use crate::orchestrator::OrchestratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of an orchestrator operation
#[derive(Debug)]
pub struct Progress {
    pub severity: Severity,
    pub message: String,
    pub cause: Option<OrchestratorError>,
}

impl Progress {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            cause: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
            cause: None,
        }
    }

    /// Non-fatal failure with its cause
    pub fn warning(message: impl Into<String>, cause: OrchestratorError) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            cause: Some(cause),
        }
    }

    /// Failure; the message is the error's display text
    pub fn error(cause: OrchestratorError) -> Self {
        Self {
            severity: Severity::Error,
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

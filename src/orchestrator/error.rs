//! Orchestrator error taxonomy

use std::path::PathBuf;

use crate::builder::BuildError;
use crate::config::ConfigError;
use crate::detect::ExcludeError;
use crate::mode::{ModeError, ModeKind};
use crate::scaffold::ScaffoldError;
use crate::toolchain::{ToolchainError, ToolchainFamily};

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Mode token not in the registry
    #[error(transparent)]
    Validation(#[from] ModeError),

    /// Mode needs a toolchain that is not installed
    #[error("{family} toolchain is not available: {source}")]
    UnavailableToolchain {
        family: ToolchainFamily,
        #[source]
        source: ToolchainError,
    },

    /// No builder registered for the active mode
    #[error("No builder initialized for {mode} mode")]
    NotInitialized { mode: ModeKind },

    #[error("Compilation failed: {0}")]
    Compilation(#[source] BuildError),

    /// Payload lookup or other toolchain failure
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid scan exclude pattern: {0}")]
    Exclude(#[from] ExcludeError),

    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    #[error("File event path is empty")]
    EmptyEventPath,

    #[error("Entry file not found: {}", .0.display())]
    EntryFileMissing(PathBuf),

    #[error("Unknown file event kind '{0}'")]
    UnknownEventKind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    /// Captured compiler output for compilation failures
    pub fn compiler_output(&self) -> Option<&str> {
        match self {
            OrchestratorError::Compilation(e) => e.output(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passes_through() {
        let err: OrchestratorError = ModeError::Invalid {
            token: "X".to_string(),
            valid: vec!["L".to_string()],
        }
        .into();
        assert_eq!(err.to_string(), "Invalid mode 'X'; valid modes: L");
    }

    #[test]
    fn test_compiler_output() {
        let err = OrchestratorError::Compilation(BuildError::Failed {
            program: "tinygo".to_string(),
            code: Some(1),
            output: "undefined: foo".to_string(),
        });
        assert_eq!(err.compiler_output(), Some("undefined: foo"));
        assert!(OrchestratorError::EmptyEventPath.compiler_output().is_none());
    }
}

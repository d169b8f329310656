//! File watcher events

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Orchestrator, OrchestratorError};

/// Kind of file system change reported by a watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileEventKind {
    Create,
    Write,
    Remove,
    Rename,
}

impl FileEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileEventKind::Create => "create",
            FileEventKind::Write => "write",
            FileEventKind::Remove => "remove",
            FileEventKind::Rename => "rename",
        }
    }
}

impl std::fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileEventKind {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(FileEventKind::Create),
            "write" => Ok(FileEventKind::Write),
            "remove" => Ok(FileEventKind::Remove),
            "rename" => Ok(FileEventKind::Rename),
            _ => Err(OrchestratorError::UnknownEventKind(s.to_string())),
        }
    }
}

impl Orchestrator {
    /// Handle a watcher event.
    ///
    /// Relevant files mark the tree as a target project whatever the event
    /// kind. Only writes to relevant files compile.
    pub fn handle_file_event(
        &mut self,
        file_name: &str,
        extension: &str,
        path: &str,
        kind: FileEventKind,
    ) -> Result<(), OrchestratorError> {
        if path.is_empty() {
            return Err(OrchestratorError::EmptyEventPath);
        }

        let verdict = self.classifier.classify(file_name, path);
        debug!(
            %extension,
            %kind,
            %path,
            module = ?wasmlane_classifier::module_name(path),
            verdict = %verdict.to_code(),
            "file event"
        );

        if !verdict.relevant {
            return Ok(());
        }
        if !self.state.is_target_project {
            info!(file = %file_name, "detected WebAssembly project from file event");
            self.mark_target_project();
        }
        if kind != FileEventKind::Write {
            return Ok(());
        }

        let entry = self.entry_path();
        if !entry.is_file() {
            return Err(OrchestratorError::EntryFileMissing(entry));
        }

        self.compile_active()?;

        if !self.init_script_path().exists() {
            self.persist_init_script();
        }
        Ok(())
    }
}

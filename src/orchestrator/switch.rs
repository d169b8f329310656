//! Mode transitions and on-demand compiles

use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::{Orchestrator, OrchestratorError};
use crate::progress::Progress;
use crate::toolchain::ToolchainFamily;

impl Orchestrator {
    /// Switch to the mode named by `token`.
    ///
    /// Reports exactly one [`Progress`]. Validation, toolchain and missing
    /// builder failures leave the state untouched; a failed compile after the switch is a
    /// warning and the switch stays committed.
    pub fn change_mode(&mut self, token: &str, mut progress: impl FnMut(Progress)) {
        let mode = match self.registry.resolve(token) {
            Ok(mode) => mode.clone(),
            Err(e) => {
                progress(Progress::error(e.into()));
                return;
            }
        };

        if mode.requires_secondary_toolchain && !self.state.secondary_toolchain_installed {
            let family = ToolchainFamily::Secondary;
            match self.toolchains.verify(family) {
                Ok(version) => {
                    info!(%version, "secondary toolchain now available");
                    self.state.secondary_toolchain_installed = true;
                    self.clear_cache();
                }
                Err(source) => {
                    progress(Progress::error(OrchestratorError::UnavailableToolchain {
                        family,
                        source,
                    }));
                    return;
                }
            }
        }

        if self.builders.get(mode.kind).is_none() {
            progress(Progress::error(OrchestratorError::NotInitialized { mode: mode.kind }));
            return;
        }

        if let Some(previous) = self.builders.get(self.state.current_mode) {
            previous.cancel();
        }
        debug!(from = %self.state.current_mode, to = %mode.kind, "switching mode");
        self.state.current_mode = mode.kind;

        if !self.entry_path().is_file() {
            progress(Progress::success(mode.success_message()));
            return;
        }

        match self.compile_active() {
            Ok(_) => {
                self.persist_init_script();
                progress(Progress::success(mode.success_message()));
            }
            Err(e) => {
                warn!(mode = %mode.kind, error = %e, "compile after mode switch failed");
                let message = format!("auto compilation failed: {}", e);
                progress(Progress::warning(message, e));
            }
        }
    }

    /// Compile with the active builder and refresh the artifact
    pub fn recompile(&mut self) -> Result<PathBuf, OrchestratorError> {
        let entry = self.entry_path();
        if !entry.is_file() {
            return Err(OrchestratorError::EntryFileMissing(entry));
        }
        let output = self.compile_active()?;
        self.persist_init_script();
        Ok(output)
    }

    pub(super) fn compile_active(&self) -> Result<PathBuf, OrchestratorError> {
        let builder = self.active_builder()?;
        let output = builder.compile().map_err(OrchestratorError::Compilation)?;
        debug!(path = %output.display(), mode = %self.state.current_mode, "compiled");
        Ok(output)
    }
}

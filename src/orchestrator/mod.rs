//! Compilation mode orchestrator
//!
//! Owns the current mode, the mode-keyed builders and the per-mode script
//! cache. Construction runs detection once; afterwards the state changes
//! only through [`Orchestrator::change_mode`], [`Orchestrator::redetect`]
//! and file events.
//!
//! The active builder is never stored. It is looked up from the
//! [`BuilderSet`] by the current mode on every use.

mod error;
mod events;
mod switch;

pub use error::OrchestratorError;
pub use events::FileEventKind;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use wasmlane_classifier::Classifier;

use crate::builder::{Builder, BuilderSet};
use crate::config::LaneConfig;
use crate::detect::{Detection, DetectionPhase, Detector};
use crate::mode::{ModeKind, ModeRegistry};
use crate::scaffold::{self, ScaffoldOutcome};
use crate::script::{self, ScriptCache};
use crate::toolchain::{ToolchainFamily, ToolchainProbe};

/// Mutable orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrchestratorState {
    pub current_mode: ModeKind,
    /// Monotonic: never reset once true
    pub is_target_project: bool,
    pub secondary_toolchain_installed: bool,
}

pub struct Orchestrator {
    root: PathBuf,
    config: LaneConfig,
    registry: ModeRegistry,
    builders: BuilderSet,
    toolchains: Box<dyn ToolchainProbe>,
    detector: Detector,
    classifier: Classifier,
    state: OrchestratorState,
    cache: ScriptCache,
    last_detection: Option<Detection>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("root", &self.root)
            .field("state", &self.state)
            .field("builders", &self.builders)
            .finish()
    }
}

impl Orchestrator {
    /// Build the orchestrator and run detection
    pub fn new(
        root: impl Into<PathBuf>,
        config: LaneConfig,
        builders: BuilderSet,
        toolchains: Box<dyn ToolchainProbe>,
    ) -> Result<Self, OrchestratorError> {
        let root = root.into();
        config.validate()?;
        let registry = ModeRegistry::new(&config.modes)?;
        let detector = Detector::new(&root, &config)?;
        let classifier = Classifier::new(config.classifier_config());

        let secondary_toolchain_installed = match toolchains.verify(ToolchainFamily::Secondary) {
            Ok(version) => {
                debug!(%version, "secondary toolchain available");
                true
            }
            Err(e) => {
                debug!(error = %e, "secondary toolchain unavailable");
                false
            }
        };

        let mut orchestrator = Self {
            root,
            config,
            registry,
            builders,
            toolchains,
            detector,
            classifier,
            state: OrchestratorState {
                current_mode: ModeKind::Large,
                is_target_project: false,
                secondary_toolchain_installed,
            },
            cache: ScriptCache::new(),
            last_detection: None,
        };
        orchestrator.run_detection();
        Ok(orchestrator)
    }

    /// Process-backed builders for every mode, derived from `config`
    pub fn with_system_builders(
        root: impl Into<PathBuf>,
        config: LaneConfig,
        toolchains: Box<dyn ToolchainProbe>,
    ) -> Result<Self, OrchestratorError> {
        let root = root.into();
        let registry = ModeRegistry::new(&config.modes)?;
        let builders = BuilderSet::from_config(&root, &config, &registry);
        Self::new(root, config, builders, toolchains)
    }

    fn run_detection(&mut self) -> Detection {
        let detection = self.detector.detect(&self.registry);

        match (detection.phase, detection.mode) {
            (DetectionPhase::None, _) | (_, None) => {
                info!(
                    root = %self.root.display(),
                    "no WebAssembly project detected (no runtime-init artifact, no {} or *{} under {})",
                    self.config.entry_file,
                    self.config.always_compile_suffix,
                    self.config.source_dir
                );
            }
            (phase, Some(mode)) => {
                self.mark_target_project();
                self.state.current_mode = mode;
                info!(phase = ?phase, mode = %mode, "project detected");

                if phase == DetectionPhase::SourceScan {
                    self.persist_init_script();
                }
            }
        }

        self.last_detection = Some(detection.clone());
        detection
    }

    /// Re-run detection; also re-verifies the secondary toolchain.
    ///
    /// A change in toolchain availability empties the script cache.
    pub fn redetect(&mut self) -> Detection {
        let installed = self.toolchains.verify(ToolchainFamily::Secondary).is_ok();
        if installed != self.state.secondary_toolchain_installed {
            debug!(installed, "secondary toolchain availability changed");
            self.state.secondary_toolchain_installed = installed;
            self.clear_cache();
        }
        self.run_detection()
    }

    pub fn last_detection(&self) -> Option<&Detection> {
        self.last_detection.as_ref()
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalized token of the current mode
    pub fn current_mode(&self) -> &str {
        self.registry.token(self.state.current_mode)
    }

    pub fn current_mode_kind(&self) -> ModeKind {
        self.state.current_mode
    }

    pub fn is_target_project(&self) -> bool {
        self.state.is_target_project
    }

    fn mark_target_project(&mut self) {
        if !self.state.is_target_project {
            self.state.is_target_project = true;
            debug!("marked as WebAssembly project");
        }
    }

    /// Whether a file change should trigger a compile
    pub fn classify(&self, file_name: &str, path: &str) -> bool {
        self.classifier.is_relevant(file_name, path)
    }

    fn active_builder(&self) -> Result<&dyn Builder, OrchestratorError> {
        self.builders
            .get(self.state.current_mode)
            .ok_or(OrchestratorError::NotInitialized {
                mode: self.state.current_mode,
            })
    }

    /// Generated files a watcher should ignore
    pub fn unobserved_files(&self) -> Vec<String> {
        match self.active_builder() {
            Ok(builder) => builder.unobserved_files(),
            Err(_) => vec![self.config.output_relative_path()],
        }
    }

    /// Module path relative to the root, with forward slashes
    pub fn output_relative_path(&self) -> String {
        self.config.output_relative_path()
    }

    /// Compiled module path for the active builder
    pub fn module_path(&self) -> Result<PathBuf, OrchestratorError> {
        let name = self.active_builder()?.output_file_name();
        Ok(self.root.join(&self.config.output_dir).join(name))
    }

    /// Size in bytes of the compiled module, `None` before the first build
    pub fn module_size(&self) -> Result<Option<u64>, OrchestratorError> {
        match fs::metadata(self.module_path()?) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn entry_path(&self) -> PathBuf {
        self.config.entry_path(&self.root)
    }

    pub fn init_script_path(&self) -> PathBuf {
        self.config.init_script_path(&self.root)
    }

    /// Runtime-init script for the current mode.
    ///
    /// Empty when the tree is not a target project. Cached per mode until
    /// [`Orchestrator::clear_cache`].
    pub fn generate_runtime_init_script(&mut self) -> Result<String, OrchestratorError> {
        if !self.state.is_target_project {
            return Ok(String::new());
        }

        let mode = self.state.current_mode;
        if let Some(cached) = self.cache.get(mode) {
            return Ok(cached.to_string());
        }

        let payload = self.toolchains.load_payload(mode.family())?;
        let token = self.registry.token(mode).to_string();
        let output_file_name = self.active_builder()?.output_file_name();

        let rendered = script::render(&self.config.header_marker, &token, &payload, &output_file_name);
        self.cache.store(mode, rendered.clone());
        Ok(rendered)
    }

    /// Empty every cache slot
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_scripts(&self) -> usize {
        self.cache.len()
    }

    /// Generate and write the runtime-init artifact.
    ///
    /// Returns `None` without writing when the tree is not a target project.
    pub fn write_init_script(&mut self) -> Result<Option<PathBuf>, OrchestratorError> {
        let script = self.generate_runtime_init_script()?;
        if script.is_empty() {
            return Ok(None);
        }

        let path = self.init_script_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, script)?;
        debug!(path = %path.display(), mode = %self.state.current_mode, "wrote runtime-init artifact");
        Ok(Some(path))
    }

    /// Write the artifact, logging failures
    fn persist_init_script(&mut self) {
        if let Err(e) = self.write_init_script() {
            warn!(error = %e, path = %self.init_script_path().display(), "failed to write runtime-init artifact");
        }
    }

    /// Write the entry file from the bundled template if absent
    pub fn scaffold_entry_file(&mut self) -> Result<ScaffoldOutcome, OrchestratorError> {
        let outcome = scaffold::write_entry_file(&self.entry_path())?;
        self.mark_target_project();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBuilders, MockToolchains};

    fn orchestrator(root: &Path) -> (Orchestrator, MockBuilders, MockToolchains) {
        let config = LaneConfig::default();
        let mocks = MockBuilders::new(root.join(&config.output_dir), "main.wasm");
        let toolchains = MockToolchains::new();
        let orch = Orchestrator::new(root, config, mocks.set(), Box::new(toolchains.clone())).unwrap();
        (orch, mocks, toolchains)
    }

    #[test]
    fn test_empty_tree_is_not_a_target() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _, _) = orchestrator(dir.path());

        assert!(!orch.is_target_project());
        assert_eq!(orch.current_mode(), "L");
        assert_eq!(orch.generate_runtime_init_script().unwrap(), "");
        assert_eq!(orch.write_init_script().unwrap(), None);
        assert!(!orch.init_script_path().exists());
    }

    #[test]
    fn test_secondary_verified_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let (orch, _, toolchains) = orchestrator(dir.path());
        assert!(orch.state().secondary_toolchain_installed);
        assert_eq!(toolchains.verification_count(), 1);
    }

    #[test]
    fn test_missing_builder_is_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = Orchestrator::new(
            dir.path(),
            LaneConfig::default(),
            BuilderSet::new(),
            Box::new(MockToolchains::new()),
        )
        .unwrap();
        orch.scaffold_entry_file().unwrap();

        let err = orch.generate_runtime_init_script().unwrap_err();
        assert!(matches!(err, OrchestratorError::NotInitialized { mode: ModeKind::Large }));
        assert_eq!(orch.unobserved_files(), vec!["web/public/main.wasm".to_string()]);
    }

    #[test]
    fn test_missing_payload_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _, toolchains) = orchestrator(dir.path());
        orch.scaffold_entry_file().unwrap();
        toolchains.remove_payload(ToolchainFamily::Standard);

        let err = orch.generate_runtime_init_script().unwrap_err();
        assert!(matches!(err, OrchestratorError::Toolchain(_)));
        assert_eq!(orch.cached_scripts(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = LaneConfig {
            timeout_seconds: 0,
            ..LaneConfig::default()
        };
        let result = Orchestrator::new(dir.path(), config, BuilderSet::new(), Box::new(MockToolchains::new()));
        assert!(matches!(result, Err(OrchestratorError::Config(_))));
    }

    #[test]
    fn test_module_size_after_recompile() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _, _) = orchestrator(dir.path());
        assert_eq!(orch.module_size().unwrap(), None);

        orch.scaffold_entry_file().unwrap();
        let output = orch.recompile().unwrap();
        assert_eq!(orch.module_path().unwrap(), output);
        let expected = fs::metadata(&output).unwrap().len();
        assert_eq!(orch.module_size().unwrap(), Some(expected));
    }

    #[test]
    fn test_scaffold_marks_target() {
        let dir = tempfile::tempdir().unwrap();
        let (mut orch, _, _) = orchestrator(dir.path());
        let outcome = orch.scaffold_entry_file().unwrap();
        assert!(matches!(outcome, ScaffoldOutcome::Created(_)));
        assert!(orch.is_target_project());
        assert!(orch.entry_path().is_file());
    }
}

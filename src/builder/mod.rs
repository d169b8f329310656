//! Builder collaborator
//!
//! A builder compiles the entry file into the WebAssembly module for one
//! mode. The orchestrator treats builders as opaque handles and selects one
//! per mode through [`BuilderSet`], keyed by [`ModeKind`].

mod command;

pub use command::{CommandBuilder, CommandBuilderConfig};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::LaneConfig;
use crate::mode::{ModeKind, ModeRegistry};

/// Build errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {output}", .code.map(|c| format!("code {c}")).unwrap_or_else(|| "signal".to_string()))]
    Failed {
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Compilation timed out after {seconds}s: {output}")]
    TimedOut { seconds: u64, output: String },

    #[error("Compilation cancelled")]
    Cancelled,

    #[error("Compiler reported success but {} was not created", .0.display())]
    OutputMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Captured compiler output, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            BuildError::Failed { output, .. } | BuildError::TimedOut { output, .. } => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

/// Compiler-invocation handle for one mode
pub trait Builder: Send + Sync {
    /// Compile synchronously; returns the output path
    fn compile(&self) -> Result<PathBuf, BuildError>;

    /// Signal an in-flight compile to stop. Does not wait for exit.
    fn cancel(&self);

    /// File name of the compiled module, e.g. `main.wasm`
    fn output_file_name(&self) -> String;

    /// Generated files a watcher should ignore
    fn unobserved_files(&self) -> Vec<String>;
}

/// Mode-keyed builder table
#[derive(Default)]
pub struct BuilderSet {
    builders: BTreeMap<ModeKind, Box<dyn Builder>>,
}

impl std::fmt::Debug for BuilderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderSet")
            .field("modes", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BuilderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder for a mode, replacing any previous one
    pub fn with(mut self, kind: ModeKind, builder: impl Builder + 'static) -> Self {
        self.insert(kind, Box::new(builder));
        self
    }

    pub fn insert(&mut self, kind: ModeKind, builder: Box<dyn Builder>) {
        self.builders.insert(kind, builder);
    }

    pub fn get(&self, kind: ModeKind) -> Option<&dyn Builder> {
        self.builders.get(&kind).map(|b| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Process-backed builders for all three modes
    pub fn from_config(root: &Path, config: &LaneConfig, registry: &ModeRegistry) -> Self {
        let mut set = Self::new();
        for mode in registry.modes() {
            let family = mode.kind.family();
            let mut args = mode.arguments.clone();
            args.extend(config.compiling_arguments.iter().cloned());

            let builder = CommandBuilder::new(CommandBuilderConfig {
                program: family.program().to_string(),
                args,
                env: family.build_env(),
                entry_path: config.entry_path(root),
                output_dir: root.join(&config.output_dir),
                output_name: config.output_name.clone(),
                unobserved: vec![config.output_relative_path()],
                timeout: Duration::from_secs(config.timeout_seconds),
                termination_grace: Duration::from_secs(2),
            });
            set.insert(mode.kind, Box::new(builder));
        }
        set
    }
}

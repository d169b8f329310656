//! Typed lane configuration
//!
//! The merged JSON value is deserialized into [`LaneConfig`]. Every field has
//! a default so partial layers are accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wasmlane_classifier::ClassifierConfig;

use super::defaults::BuiltinDefaults;
use super::ConfigError;
use crate::mode::ModeTokens;
use crate::toolchain::{DetectionSignatures, PayloadPaths};

/// Upper bound for `timeout_seconds`
pub const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// Project layout and compile settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub source_dir: String,
    pub output_dir: String,
    pub output_name: String,
    pub entry_file: String,
    pub always_compile_suffix: String,
    pub init_script_dir: String,
    pub init_script_name: String,
    pub header_marker: String,
    pub timeout_seconds: u64,
    /// Extra arguments appended after each mode's own arguments
    pub compiling_arguments: Vec<String>,
    /// Extra glob patterns skipped by the source scan
    pub scan_exclude: Vec<String>,
    pub modes: ModeTokens,
    pub signatures: DetectionSignatures,
    pub payload_paths: PayloadPaths,
}

impl Default for LaneConfig {
    fn default() -> Self {
        let d = BuiltinDefaults::default();
        Self {
            source_dir: d.source_dir,
            output_dir: d.output_dir,
            output_name: d.output_name,
            entry_file: d.entry_file,
            always_compile_suffix: d.always_compile_suffix,
            init_script_dir: d.init_script_dir,
            init_script_name: d.init_script_name,
            header_marker: d.header_marker,
            timeout_seconds: d.timeout_seconds,
            compiling_arguments: Vec::new(),
            scan_exclude: Vec::new(),
            modes: d.modes,
            signatures: d.signatures,
            payload_paths: PayloadPaths::default(),
        }
    }
}

impl LaneConfig {
    /// Deserialize from a merged config value
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: LaneConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(format!("Invalid lane config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("source_dir", &self.source_dir),
            ("output_dir", &self.output_dir),
            ("output_name", &self.output_name),
            ("entry_file", &self.entry_file),
            ("init_script_dir", &self.init_script_dir),
            ("init_script_name", &self.init_script_name),
            ("header_marker", &self.header_marker),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{} must not be empty", key)));
            }
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "timeout_seconds must be in (0, {}]",
                MAX_TIMEOUT_SECONDS
            )));
        }

        Ok(())
    }

    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source_dir)
    }

    /// Absolute path of the entry source file
    pub fn entry_path(&self, root: &Path) -> PathBuf {
        self.source_path(root).join(&self.entry_file)
    }

    /// Absolute path of the runtime-init artifact
    pub fn init_script_path(&self, root: &Path) -> PathBuf {
        root.join(&self.init_script_dir).join(&self.init_script_name)
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.wasm", self.output_name)
    }

    /// Module path relative to the root, always with forward slashes
    pub fn output_relative_path(&self) -> String {
        let dir = self.output_dir.replace('\\', "/");
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            self.output_file_name()
        } else {
            format!("{}/{}", dir, self.output_file_name())
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig::new(&self.entry_file, &self.always_compile_suffix)
    }

    /// Payload paths with relative entries resolved against `root`
    pub fn resolved_payload_paths(&self, root: &Path) -> PayloadPaths {
        let resolve = |p: &Option<PathBuf>| {
            p.as_ref().map(|p| if p.is_absolute() { p.clone() } else { root.join(p) })
        };
        PayloadPaths {
            standard: resolve(&self.payload_paths.standard),
            secondary: resolve(&self.payload_paths.secondary),
        }
    }
}

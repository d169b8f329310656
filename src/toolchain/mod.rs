//! Toolchain families and bootstrap payloads
//!
//! Two compiler families can produce the WebAssembly module:
//! - the standard Go toolchain (`go`, GOOS=js GOARCH=wasm)
//! - the secondary TinyGo toolchain (`tinygo -target wasm`)
//!
//! Each family ships its own `wasm_exec.js` bootstrap payload. The payloads
//! differ enough that a few well-known substrings identify which family a
//! runtime-init artifact came from.

mod probe;

pub use probe::SystemToolchains;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Toolchain family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainFamily {
    Standard,
    Secondary,
}

impl ToolchainFamily {
    /// Compiler program for this family
    pub fn program(&self) -> &'static str {
        match self {
            ToolchainFamily::Standard => "go",
            ToolchainFamily::Secondary => "tinygo",
        }
    }

    /// Environment the compiler needs to target WebAssembly
    pub fn build_env(&self) -> Vec<(String, String)> {
        match self {
            ToolchainFamily::Standard => vec![
                ("GOOS".to_string(), "js".to_string()),
                ("GOARCH".to_string(), "wasm".to_string()),
            ],
            ToolchainFamily::Secondary => Vec::new(),
        }
    }
}

impl std::fmt::Display for ToolchainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Substrings identifying each family's bootstrap payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSignatures {
    pub standard: Vec<String>,
    pub secondary: Vec<String>,
}

impl Default for DetectionSignatures {
    fn default() -> Self {
        let to_vec = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            standard: to_vec(&[
                "runtime.wasmExit",
                "runtime.resetMemoryDataView",
                "runtime.nanotime1",
                "runtime.scheduleTimeoutEvent",
            ]),
            secondary: to_vec(&[
                "runtime.ticks",
                "runtime.sleepTicks",
                "wasi_snapshot_preview1",
                "fd_write",
            ]),
        }
    }
}

impl DetectionSignatures {
    pub fn for_family(&self, family: ToolchainFamily) -> &[String] {
        match family {
            ToolchainFamily::Standard => &self.standard,
            ToolchainFamily::Secondary => &self.secondary,
        }
    }
}

/// Explicit payload locations, overriding toolchain lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<PathBuf>,
}

impl PayloadPaths {
    pub fn for_family(&self, family: ToolchainFamily) -> Option<&PathBuf> {
        match family {
            ToolchainFamily::Standard => self.standard.as_ref(),
            ToolchainFamily::Secondary => self.secondary.as_ref(),
        }
    }
}

/// Toolchain errors
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// Program is not on PATH or could not be started
    #[error("{program} not found: {source}")]
    NotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Program ran but reported failure
    #[error("{program} {command} failed: {detail}")]
    CommandFailed {
        program: String,
        command: String,
        detail: String,
    },

    /// No bootstrap payload found in the toolchain installation
    #[error("No wasm_exec.js found for {family} (searched: {})", .searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    PayloadNotFound {
        family: ToolchainFamily,
        searched: Vec<PathBuf>,
    },

    /// Payload exists but could not be read
    #[error("Failed to read {family} payload {}: {source}", .path.display())]
    PayloadUnreadable {
        family: ToolchainFamily,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Access to installed toolchains.
///
/// The orchestrator only needs two things from the environment: whether a
/// family's compiler is usable, and that family's bootstrap payload.
pub trait ToolchainProbe: Send + Sync {
    /// Verify the family's compiler is installed; returns its version line
    fn verify(&self, family: ToolchainFamily) -> Result<String, ToolchainError>;

    /// Load the family's canonical bootstrap payload
    fn load_payload(&self, family: ToolchainFamily) -> Result<String, ToolchainError>;
}

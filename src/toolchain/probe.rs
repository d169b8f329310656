//! System toolchain probe
//!
//! Runs the installed compilers to verify them and to locate their
//! `wasm_exec.js` payloads.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{PayloadPaths, ToolchainError, ToolchainFamily, ToolchainProbe};

/// Payload locations relative to the toolchain root, newest layout first
fn payload_candidates(family: ToolchainFamily) -> &'static [&'static str] {
    match family {
        ToolchainFamily::Standard => &["lib/wasm/wasm_exec.js", "misc/wasm/wasm_exec.js"],
        ToolchainFamily::Secondary => &["targets/wasm_exec.js"],
    }
}

/// Environment variable naming the toolchain root
fn root_variable(family: ToolchainFamily) -> &'static str {
    match family {
        ToolchainFamily::Standard => "GOROOT",
        ToolchainFamily::Secondary => "TINYGOROOT",
    }
}

/// Probe backed by the real `go` / `tinygo` installations
#[derive(Debug, Clone, Default)]
pub struct SystemToolchains {
    payload_paths: PayloadPaths,
}

impl SystemToolchains {
    pub fn new(payload_paths: PayloadPaths) -> Self {
        Self { payload_paths }
    }

    /// Run a command and return trimmed stdout
    fn run_capture(program: &str, args: &[&str]) -> Result<String, ToolchainError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ToolchainError::NotFound {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolchainError::CommandFailed {
                program: program.to_string(),
                command: args.join(" "),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Installation root reported by the toolchain itself
    fn toolchain_root(family: ToolchainFamily) -> Result<PathBuf, ToolchainError> {
        let root = Self::run_capture(family.program(), &["env", root_variable(family)])?;
        if root.is_empty() {
            return Err(ToolchainError::CommandFailed {
                program: family.program().to_string(),
                command: format!("env {}", root_variable(family)),
                detail: "empty output".to_string(),
            });
        }
        Ok(PathBuf::from(root))
    }

    fn read_payload(family: ToolchainFamily, path: &Path) -> Result<String, ToolchainError> {
        fs::read_to_string(path).map_err(|source| ToolchainError::PayloadUnreadable {
            family,
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ToolchainProbe for SystemToolchains {
    fn verify(&self, family: ToolchainFamily) -> Result<String, ToolchainError> {
        let version = Self::run_capture(family.program(), &["version"])?;
        debug!(%family, %version, "toolchain verified");
        Ok(version)
    }

    fn load_payload(&self, family: ToolchainFamily) -> Result<String, ToolchainError> {
        if let Some(path) = self.payload_paths.for_family(family) {
            return Self::read_payload(family, path);
        }

        let root = Self::toolchain_root(family)?;
        let searched: Vec<PathBuf> = payload_candidates(family)
            .iter()
            .map(|rel| root.join(rel))
            .collect();

        match searched.iter().find(|p| p.is_file()) {
            Some(path) => {
                debug!(%family, path = %path.display(), "loading bootstrap payload");
                Self::read_payload(family, path)
            }
            None => Err(ToolchainError::PayloadNotFound { family, searched }),
        }
    }
}

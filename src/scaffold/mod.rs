//! First-run entry file
//!
//! Writes a minimal Go program to the entry path when none exists. An
//! existing file is never touched.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::info;

/// Bundled entry file template
pub const ENTRY_TEMPLATE: &str = r#"//go:build js && wasm

package main

import (
	"syscall/js"
)

func main() {
	document := js.Global().Get("document")
	body := document.Get("body")

	message := document.Call("createElement", "p")
	message.Set("textContent", "Hello from WebAssembly!")
	body.Call("appendChild", message)

	// Keep the module alive for callbacks
	select {}
}
"#;

/// Whether the scaffold wrote a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    Created(PathBuf),
    Exists(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write the template to `entry_path` unless something is already there.
///
/// The file is created exclusively, so a concurrent writer or a symlink at
/// `entry_path` is left alone.
pub fn write_entry_file(entry_path: &Path) -> Result<ScaffoldOutcome, ScaffoldError> {
    let write_err = |source| ScaffoldError::Write {
        path: entry_path.to_path_buf(),
        source,
    };
    if let Some(parent) = entry_path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(entry_path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!(path = %entry_path.display(), "entry file already exists, skipping scaffold");
            return Ok(ScaffoldOutcome::Exists(entry_path.to_path_buf()));
        }
        Err(e) => return Err(write_err(e)),
    };
    file.write_all(ENTRY_TEMPLATE.as_bytes()).map_err(write_err)?;

    info!(path = %entry_path.display(), "generated entry file");
    Ok(ScaffoldOutcome::Created(entry_path.to_path_buf()))
}

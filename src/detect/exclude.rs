//! Exclusion rules for the source scan

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Directories never scanned for entry files
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git",
    "**/.git/**",
    "**/node_modules",
    "**/node_modules/**",
    "**/target",
    "**/target/**",
    "**/.wasmlane",
    "**/.wasmlane/**",
];

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

/// Glob set matched against paths relative to the scanned directory
#[derive(Debug, Clone)]
pub struct ScanExcludes {
    glob_set: GlobSet,
}

impl ScanExcludes {
    /// Defaults plus `extra` patterns; empty patterns are skipped
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, ExcludeError> {
        let mut builder = GlobSetBuilder::new();

        for pattern in DEFAULT_EXCLUDES {
            builder.add(Glob::new(pattern)?);
        }
        for pattern in extra {
            let pattern = pattern.as_ref().trim();
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            glob_set: builder.build()?,
        })
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        let path_str = relative.to_string_lossy().replace('\\', "/");
        self.glob_set.is_match(path_str.as_str())
    }
}

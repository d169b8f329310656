//! File event path parser.
//!
//! Splits watcher paths into the name/extension pair the classifier and the
//! orchestrator consume. Both `/` and `\` are accepted as separators.

/// Errors for path parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path has no file name: {0}")]
    NoFileName(String),
}

/// A watcher path split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPath {
    /// Last path segment, e.g. `users.wasm.go`.
    pub file_name: String,

    /// Extension including the dot, e.g. `.go`. Empty when there is none.
    pub extension: String,

    /// The path as given.
    pub path: String,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty())
}

/// Parse a watcher path into file name and extension.
pub fn parse_event_path(path: &str) -> Result<EventPath, PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let file_name = segments(path)
        .last()
        .filter(|s| *s != "." && *s != "..")
        .ok_or_else(|| PathError::NoFileName(path.to_string()))?;

    // Dotfiles like `.env` have no extension
    let extension = match file_name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => file_name[idx..].to_string(),
    };

    Ok(EventPath {
        file_name: file_name.to_string(),
        extension,
        path: path.to_string(),
    })
}

/// Extract the module name from a path like `web/modules/users/wasm/users.wasm.go`.
///
/// Returns the segment following the first `modules` segment.
pub fn module_name(path: &str) -> Option<String> {
    let mut iter = segments(path);
    iter.by_ref().find(|s| *s == "modules")?;
    iter.next().map(|s| s.to_string())
}

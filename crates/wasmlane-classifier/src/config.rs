//! Classifier configuration types.

use serde::{Deserialize, Serialize};

/// Default entry file name.
pub const DEFAULT_ENTRY_FILE: &str = "main.go";

/// Default always-compile suffix.
pub const DEFAULT_ALWAYS_COMPILE_SUFFIX: &str = ".wasm.go";

/// Configuration for the classifier, derived from the lane config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Name of the top-level source file that is always relevant.
    #[serde(default = "default_entry_file")]
    pub entry_file: String,

    /// File name suffix marking a file as always relevant.
    /// An empty suffix disables the rule.
    #[serde(default = "default_always_compile_suffix")]
    pub always_compile_suffix: String,
}

fn default_entry_file() -> String {
    DEFAULT_ENTRY_FILE.to_string()
}

fn default_always_compile_suffix() -> String {
    DEFAULT_ALWAYS_COMPILE_SUFFIX.to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            entry_file: default_entry_file(),
            always_compile_suffix: default_always_compile_suffix(),
        }
    }
}

impl ClassifierConfig {
    /// Create a config with explicit entry file and suffix.
    pub fn new(entry_file: impl Into<String>, always_compile_suffix: impl Into<String>) -> Self {
        Self {
            entry_file: entry_file.into(),
            always_compile_suffix: always_compile_suffix.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert_eq!(config.entry_file, "main.go");
        assert_eq!(config.always_compile_suffix, ".wasm.go");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: ClassifierConfig = serde_json::from_str(r#"{"entry_file": "app.go"}"#).unwrap();
        assert_eq!(parsed.entry_file, "app.go");
        assert_eq!(parsed.always_compile_suffix, ".wasm.go");
    }
}

//! Classifier result types.

use serde::{Deserialize, Serialize};

/// Rule that made a file relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchedRule {
    /// File name equals the configured entry file.
    #[serde(rename = "ENTRY_FILE")]
    EntryFile,

    /// File name ends with the always-compile suffix.
    #[serde(rename = "ALWAYS_COMPILE_SUFFIX")]
    AlwaysCompileSuffix,
}

impl MatchedRule {
    /// Get a machine-readable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedRule::EntryFile => "ENTRY_FILE",
            MatchedRule::AlwaysCompileSuffix => "ALWAYS_COMPILE_SUFFIX",
        }
    }
}

/// Result of classifying a file event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the file should trigger a recompile.
    pub relevant: bool,

    /// The file name that was classified.
    pub file_name: String,

    /// The rule that matched. None when not relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<MatchedRule>,
}

impl Verdict {
    /// Create a relevant verdict.
    pub fn relevant(file_name: impl Into<String>, rule: MatchedRule) -> Self {
        Self {
            relevant: true,
            file_name: file_name.into(),
            rule: Some(rule),
        }
    }

    /// Create an ignored verdict.
    pub fn ignored(file_name: impl Into<String>) -> Self {
        Self {
            relevant: false,
            file_name: file_name.into(),
            rule: None,
        }
    }

    /// Machine-readable code, e.g. `RELEVANT:ENTRY_FILE` or `IGNORED`.
    pub fn to_code(&self) -> String {
        match self.rule {
            Some(rule) if self.relevant => format!("RELEVANT:{}", rule.as_str()),
            _ => "IGNORED".to_string(),
        }
    }
}

//! Relevance classifier for WebAssembly source file events.
//!
//! Decides whether a file change should trigger a recompile of the
//! WebAssembly front-end. The decision depends on the file name only:
//! the same name yields the same verdict anywhere in the tree.

mod config;
mod parser;
mod result;

pub use config::{ClassifierConfig, DEFAULT_ALWAYS_COMPILE_SUFFIX, DEFAULT_ENTRY_FILE};
pub use parser::{module_name, parse_event_path, EventPath, PathError};
pub use result::{MatchedRule, Verdict};

/// Classify a file event.
///
/// `path` is accepted for the watcher contract but does not influence the
/// verdict.
pub fn classify(file_name: &str, _path: &str, config: &ClassifierConfig) -> Verdict {
    if file_name == config.entry_file {
        return Verdict::relevant(file_name, MatchedRule::EntryFile);
    }

    if !config.always_compile_suffix.is_empty() && file_name.ends_with(&config.always_compile_suffix)
    {
        return Verdict::relevant(file_name, MatchedRule::AlwaysCompileSuffix);
    }

    Verdict::ignored(file_name)
}

/// The classifier, bound to a config.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a new classifier with the given configuration
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Full verdict for a file event.
    pub fn classify(&self, file_name: &str, path: &str) -> Verdict {
        classify(file_name, path, &self.config)
    }

    /// Whether a file event is compilation-relevant.
    pub fn is_relevant(&self, file_name: &str, path: &str) -> bool {
        self.classify(file_name, path).relevant
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

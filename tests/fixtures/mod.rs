//! Shared fixtures for integration tests
//!
//! - Classifier corpus (relevant/ignored file events)
//! - Temporary project trees wired to mock collaborators

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wasmlane::mock::{MockBuilders, MockToolchains};
use wasmlane::{LaneConfig, Orchestrator, Progress};

/// Path to the classifier corpus fixture
pub fn classifier_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/classifier_corpus/corpus.json")
}

/// Classifier test case from corpus.json
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClassifierTestCase {
    pub id: String,
    pub file_name: String,
    pub path: String,
    pub relevant: bool,
    #[serde(default)]
    pub rule: Option<String>,
}

/// Classifier corpus configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClassifierCorpusConfig {
    pub entry_file: String,
    pub always_compile_suffix: String,
}

/// Full classifier corpus
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClassifierCorpus {
    pub schema_version: u32,
    pub description: String,
    pub config: ClassifierCorpusConfig,
    pub test_cases: Vec<ClassifierTestCase>,
}

impl ClassifierCorpus {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(classifier_corpus_path())?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A temporary project tree
pub struct Project {
    pub dir: TempDir,
    pub config: LaneConfig,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            config: LaneConfig::default(),
        }
    }

    /// Project with `web/main.go`
    pub fn with_entry() -> Self {
        let project = Self::empty();
        project.write(&project.entry_relative(), "package main\n\nfunc main() {}\n");
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn entry_relative(&self) -> String {
        format!("{}/{}", self.config.source_dir, self.config.entry_file)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.config.init_script_path(self.root())
    }

    /// Write a file relative to the root, creating directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, content).expect("write file");
        path
    }

    pub fn write_artifact(&self, content: &str) {
        let path = self.artifact_path();
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, content).expect("write artifact");
    }

    pub fn read_artifact(&self) -> Option<String> {
        fs::read_to_string(self.artifact_path()).ok()
    }

    /// Mock builders writing into the configured output directory
    pub fn builders(&self) -> MockBuilders {
        MockBuilders::new(self.root().join(&self.config.output_dir), &self.config.output_file_name())
    }

    pub fn orchestrator(&self, builders: &MockBuilders, toolchains: &MockToolchains) -> Orchestrator {
        Orchestrator::new(
            self.root(),
            self.config.clone(),
            builders.set(),
            Box::new(toolchains.clone()),
        )
        .expect("orchestrator")
    }
}

/// Run `change_mode` and return its single report
pub fn change_mode(orchestrator: &mut Orchestrator, token: &str) -> Progress {
    let mut reports = Vec::new();
    orchestrator.change_mode(token, |p| reports.push(p));
    assert_eq!(reports.len(), 1, "expected exactly one progress report");
    reports.remove(0)
}

//! Mock builder
//!
//! Records every compile and cancel into a shared [`Journal`] so tests can
//! assert ordering across builders. Clones share state.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{lock, Journal};
use crate::builder::{BuildError, Builder};

#[derive(Debug, Default)]
struct MockBuilderState {
    compiles: u32,
    cancels: u32,
    /// Compiler output returned as a failure, if set
    failure: Option<String>,
    /// Remaining failures before compiles succeed again (None = always)
    failures_left: Option<u32>,
}

/// In-process builder double
#[derive(Debug, Clone)]
pub struct MockBuilder {
    label: String,
    output_name: String,
    output_dir: Option<PathBuf>,
    unobserved: Vec<String>,
    state: Arc<Mutex<MockBuilderState>>,
    journal: Journal,
}

impl MockBuilder {
    /// Create a builder whose module file is named `output_name`
    pub fn new(output_name: impl Into<String>) -> Self {
        let output_name = output_name.into();
        Self {
            label: "mock".to_string(),
            unobserved: vec![output_name.clone()],
            output_name,
            output_dir: None,
            state: Arc::new(Mutex::new(MockBuilderState::default())),
            journal: Journal::default(),
        }
    }

    /// Name used in journal entries, e.g. `compile:large`
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Write a placeholder module into `dir` on successful compiles
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Share a journal with other mocks
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Make every compile fail with `output`
    pub fn fail_with(&self, output: impl Into<String>) {
        let mut state = lock(&self.state);
        state.failure = Some(output.into());
        state.failures_left = None;
    }

    /// Make the next `count` compiles fail with `output`
    pub fn fail_times(&self, count: u32, output: impl Into<String>) {
        let mut state = lock(&self.state);
        state.failure = Some(output.into());
        state.failures_left = Some(count);
    }

    pub fn compile_count(&self) -> u32 {
        lock(&self.state).compiles
    }

    pub fn cancel_count(&self) -> u32 {
        lock(&self.state).cancels
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn output_path(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(&self.output_name),
            None => PathBuf::from(&self.output_name),
        }
    }

    /// Failure output for this compile, consuming one counted failure
    fn take_failure(&self) -> Option<String> {
        let mut state = lock(&self.state);
        state.compiles += 1;
        let output = state.failure.clone()?;
        match state.failures_left {
            None => Some(output),
            Some(0) => {
                state.failure = None;
                state.failures_left = None;
                None
            }
            Some(n) => {
                state.failures_left = Some(n - 1);
                Some(output)
            }
        }
    }
}

impl Builder for MockBuilder {
    fn compile(&self) -> Result<PathBuf, BuildError> {
        self.journal.record(format!("compile:{}", self.label));

        if let Some(output) = self.take_failure() {
            return Err(BuildError::Failed {
                program: self.label.clone(),
                code: Some(1),
                output,
            });
        }

        let path = self.output_path();
        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir)?;
            fs::write(&path, b"\0asm\x01\0\0\0")?;
        }
        Ok(path)
    }

    fn cancel(&self) {
        lock(&self.state).cancels += 1;
        self.journal.record(format!("cancel:{}", self.label));
    }

    fn output_file_name(&self) -> String {
        self.output_name.clone()
    }

    fn unobserved_files(&self) -> Vec<String> {
        self.unobserved.clone()
    }
}

//! In-process collaborator doubles
//!
//! - [`MockBuilder`]: records compiles/cancels, optional failure injection
//! - [`MockToolchains`]: canned payloads, switchable secondary toolchain
//!
//! Both can share a [`Journal`] so tests can assert call ordering across
//! collaborators (for example cancel-before-compile on a mode switch).

mod builder;
mod toolchains;

pub use builder::MockBuilder;
pub use toolchains::{MockToolchains, SECONDARY_PAYLOAD, STANDARD_PAYLOAD};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::builder::BuilderSet;
use crate::mode::ModeKind;

/// Lock ignoring poisoning; a panicking test must not cascade
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Ordered record of collaborator calls
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// One mock builder per mode sharing a journal
#[derive(Debug, Clone)]
pub struct MockBuilders {
    pub large: MockBuilder,
    pub medium: MockBuilder,
    pub small: MockBuilder,
    pub journal: Journal,
}

impl MockBuilders {
    /// Builders labelled by mode that write `output_name` into `output_dir`
    pub fn new(output_dir: impl Into<std::path::PathBuf>, output_name: &str) -> Self {
        let output_dir = output_dir.into();
        let journal = Journal::default();
        let make = |kind: ModeKind| {
            MockBuilder::new(output_name)
                .with_label(kind.label())
                .with_output_dir(output_dir.clone())
                .with_journal(journal.clone())
        };
        Self {
            large: make(ModeKind::Large),
            medium: make(ModeKind::Medium),
            small: make(ModeKind::Small),
            journal: journal.clone(),
        }
    }

    pub fn get(&self, kind: ModeKind) -> &MockBuilder {
        match kind {
            ModeKind::Large => &self.large,
            ModeKind::Medium => &self.medium,
            ModeKind::Small => &self.small,
        }
    }

    /// Builder table over clones of these mocks
    pub fn set(&self) -> BuilderSet {
        BuilderSet::new()
            .with(ModeKind::Large, self.large.clone())
            .with(ModeKind::Medium, self.medium.clone())
            .with(ModeKind::Small, self.small.clone())
    }
}

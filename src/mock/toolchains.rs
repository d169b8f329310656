//! Mock toolchain probe

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{lock, Journal};
use crate::toolchain::{ToolchainError, ToolchainFamily, ToolchainProbe};

/// Canned standard-family payload
pub const STANDARD_PAYLOAD: &str = "\"use strict\";\r\n\
(() => {\r\n\
  const importObject = {\r\n\
    \"runtime.wasmExit\": (sp) => {},   \r\n\
    \"runtime.resetMemoryDataView\": (sp) => {},\r\n\
    \"runtime.nanotime1\": (sp) => {},\r\n\
    \"runtime.scheduleTimeoutEvent\": (sp) => {},\r\n\
  };\r\n\
  globalThis.Go = class { constructor() { this.importObject = importObject; } };\r\n\
})();\r\n";

/// Canned secondary-family payload
pub const SECONDARY_PAYLOAD: &str = "\"use strict\";\n\
(() => {\n\
  const importObject = {\n\
    wasi_snapshot_preview1: {\n\
      fd_write: function(fd, iovs_ptr, iovs_len, nwritten_ptr) {},\n\
    },\n\
    gojs: {\n\
      \"runtime.ticks\": () => {},\n\
      \"runtime.sleepTicks\": (timeout) => {},\n\
    },\n\
  };\n\
  globalThis.Go = class { constructor() { this.importObject = importObject; } };\n\
})();\n";

#[derive(Debug)]
struct MockToolchainState {
    secondary_installed: bool,
    payloads: BTreeMap<ToolchainFamily, String>,
    verifications: u32,
}

/// In-process toolchain double. Clones share state.
#[derive(Debug, Clone)]
pub struct MockToolchains {
    state: Arc<Mutex<MockToolchainState>>,
    journal: Journal,
}

impl Default for MockToolchains {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolchains {
    /// Both payloads available, secondary toolchain installed
    pub fn new() -> Self {
        let mut payloads = BTreeMap::new();
        payloads.insert(ToolchainFamily::Standard, STANDARD_PAYLOAD.to_string());
        payloads.insert(ToolchainFamily::Secondary, SECONDARY_PAYLOAD.to_string());
        Self {
            state: Arc::new(Mutex::new(MockToolchainState {
                secondary_installed: true,
                payloads,
                verifications: 0,
            })),
            journal: Journal::default(),
        }
    }

    /// Standard toolchain only
    pub fn without_secondary() -> Self {
        let toolchains = Self::new();
        toolchains.set_secondary_installed(false);
        toolchains
    }

    /// Record verifications into a shared journal
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn set_secondary_installed(&self, installed: bool) {
        lock(&self.state).secondary_installed = installed;
    }

    /// Replace a family's payload
    pub fn set_payload(&self, family: ToolchainFamily, payload: impl Into<String>) {
        lock(&self.state).payloads.insert(family, payload.into());
    }

    /// Make a family's payload unavailable
    pub fn remove_payload(&self, family: ToolchainFamily) {
        lock(&self.state).payloads.remove(&family);
    }

    pub fn verification_count(&self) -> u32 {
        lock(&self.state).verifications
    }
}

impl ToolchainProbe for MockToolchains {
    fn verify(&self, family: ToolchainFamily) -> Result<String, ToolchainError> {
        let mut state = lock(&self.state);
        state.verifications += 1;
        self.journal.record(format!("verify:{}", family));

        let installed = match family {
            ToolchainFamily::Standard => true,
            ToolchainFamily::Secondary => state.secondary_installed,
        };
        if !installed {
            return Err(ToolchainError::NotFound {
                program: family.program().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            });
        }
        Ok(format!("{} version mock", family.program()))
    }

    fn load_payload(&self, family: ToolchainFamily) -> Result<String, ToolchainError> {
        self.journal.record(format!("payload:{}", family));
        lock(&self.state)
            .payloads
            .get(&family)
            .cloned()
            .ok_or(ToolchainError::PayloadNotFound {
                family,
                searched: Vec::new(),
            })
    }
}

//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

use crate::mode::ModeTokens;
use crate::toolchain::DetectionSignatures;

pub const DEFAULT_SOURCE_DIR: &str = "web";
pub const DEFAULT_OUTPUT_DIR: &str = "web/public";
pub const DEFAULT_OUTPUT_NAME: &str = "main";
pub const DEFAULT_INIT_SCRIPT_DIR: &str = "web/theme/js";
pub const DEFAULT_INIT_SCRIPT_NAME: &str = "wasm_exec.js";
pub const DEFAULT_HEADER_MARKER: &str = "// wasmlane";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Directory scanned for sources (default: "web")
    pub source_dir: String,

    /// Directory the module is written to (default: "web/public")
    pub output_dir: String,

    /// Module name without extension (default: "main")
    pub output_name: String,

    /// Entry source file name (default: "main.go")
    pub entry_file: String,

    /// Suffix that always triggers a compile (default: ".wasm.go")
    pub always_compile_suffix: String,

    /// Directory of the runtime-init artifact (default: "web/theme/js")
    pub init_script_dir: String,

    /// Runtime-init artifact name (default: "wasm_exec.js")
    pub init_script_name: String,

    /// Header line prefix (default: "// wasmlane")
    pub header_marker: String,

    /// Compile timeout in seconds (default: 60)
    pub timeout_seconds: u64,

    pub modes: ModeTokens,

    pub signatures: DetectionSignatures,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            entry_file: wasmlane_classifier::DEFAULT_ENTRY_FILE.to_string(),
            always_compile_suffix: wasmlane_classifier::DEFAULT_ALWAYS_COMPILE_SUFFIX.to_string(),
            init_script_dir: DEFAULT_INIT_SCRIPT_DIR.to_string(),
            init_script_name: DEFAULT_INIT_SCRIPT_NAME.to_string(),
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            modes: ModeTokens::default(),
            signatures: DetectionSignatures::default(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "source_dir": self.source_dir,
            "output_dir": self.output_dir,
            "output_name": self.output_name,
            "entry_file": self.entry_file,
            "always_compile_suffix": self.always_compile_suffix,
            "init_script_dir": self.init_script_dir,
            "init_script_name": self.init_script_name,
            "header_marker": self.header_marker,
            "timeout_seconds": self.timeout_seconds,
            "compiling_arguments": [],
            "scan_exclude": [],
            "modes": {
                "large": self.modes.large,
                "medium": self.modes.medium,
                "small": self.modes.small
            },
            "signatures": {
                "standard": self.signatures.standard,
                "secondary": self.signatures.secondary
            }
        })
    }
}

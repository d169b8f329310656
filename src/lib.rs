//! wasmlane - WebAssembly compilation mode orchestrator
//!
//! Manages compilation of a Go front-end into a single `.wasm` module with
//! three interchangeable modes (standard Go, TinyGo debug, TinyGo size),
//! detects the mode a project was last built with, and generates the
//! runtime-init script the browser needs to load the module.

pub mod builder;
pub mod config;
pub mod detect;
pub mod mock;
pub mod mode;
pub mod orchestrator;
pub mod progress;
pub mod scaffold;
pub mod script;
pub mod toolchain;

pub use builder::{BuildError, Builder, BuilderSet, CommandBuilder};
pub use config::{EffectiveConfig, LaneConfig};
pub use detect::{Detection, DetectionPhase};
pub use mode::{Mode, ModeKind, ModeRegistry};
pub use orchestrator::{FileEventKind, Orchestrator, OrchestratorError, OrchestratorState};
pub use progress::{Progress, Severity};
pub use toolchain::{SystemToolchains, ToolchainFamily, ToolchainProbe};
pub use wasmlane_classifier::{Classifier, ClassifierConfig, Verdict};

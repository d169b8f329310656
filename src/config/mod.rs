//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/wasmlane/config.toml)
//! 3. Repo config (.wasmlane/config.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod lane;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    cli_overrides, default_host_path, repo_path, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig,
};
pub use lane::{LaneConfig, MAX_TIMEOUT_SECONDS};
pub use merge::{deep_merge, merge_layers};

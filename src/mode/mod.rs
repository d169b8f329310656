//! Mode registry and validation
//!
//! Three compilation modes trade binary size against debuggability:
//! - `Large`: standard Go toolchain, fastest compile, biggest module
//! - `Medium`: TinyGo with debug info kept
//! - `Small`: TinyGo optimized for size
//!
//! Tokens are configurable. They are normalized (trimmed, ASCII uppercase)
//! once when the registry is built; lookups are exact on the normalized form.

use serde::{Deserialize, Serialize};

use crate::toolchain::ToolchainFamily;

/// The fixed set of compilation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Large,
    Medium,
    Small,
}

impl ModeKind {
    /// All modes, in registry order
    pub const ALL: [ModeKind; 3] = [ModeKind::Large, ModeKind::Medium, ModeKind::Small];

    /// Lowercase label used in messages and config keys
    pub fn label(&self) -> &'static str {
        match self {
            ModeKind::Large => "large",
            ModeKind::Medium => "medium",
            ModeKind::Small => "small",
        }
    }

    /// Toolchain family that compiles this mode
    pub fn family(&self) -> ToolchainFamily {
        match self {
            ModeKind::Large => ToolchainFamily::Standard,
            ModeKind::Medium | ModeKind::Small => ToolchainFamily::Secondary,
        }
    }

    pub fn requires_secondary_toolchain(&self) -> bool {
        self.family() == ToolchainFamily::Secondary
    }

    /// Mode-specific compiler arguments
    pub fn arguments(&self) -> Vec<String> {
        let args: &[&str] = match self {
            ModeKind::Large => &["-tags", "dev"],
            ModeKind::Medium => &["-target", "wasm", "-opt=1"],
            ModeKind::Small => &["-target", "wasm", "-opt=z", "-no-debug", "-panic=trap"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }

    /// Default mode for a detected toolchain family
    pub fn default_for(family: ToolchainFamily) -> Self {
        match family {
            ToolchainFamily::Standard => ModeKind::Large,
            ToolchainFamily::Secondary => ModeKind::Medium,
        }
    }
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Configured mode tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeTokens {
    pub large: String,
    pub medium: String,
    pub small: String,
}

impl Default for ModeTokens {
    fn default() -> Self {
        Self {
            large: "L".to_string(),
            medium: "M".to_string(),
            small: "S".to_string(),
        }
    }
}

impl ModeTokens {
    fn token(&self, kind: ModeKind) -> &str {
        match kind {
            ModeKind::Large => &self.large,
            ModeKind::Medium => &self.medium,
            ModeKind::Small => &self.small,
        }
    }
}

/// A configured mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub kind: ModeKind,
    /// Normalized identifier, e.g. "L"
    pub token: String,
    pub requires_secondary_toolchain: bool,
    pub arguments: Vec<String>,
}

impl Mode {
    fn new(kind: ModeKind, token: String) -> Self {
        Self {
            kind,
            token,
            requires_secondary_toolchain: kind.requires_secondary_toolchain(),
            arguments: kind.arguments(),
        }
    }

    /// Message reported after a successful switch
    pub fn success_message(&self) -> String {
        format!("Switching to {} mode", self.kind.label())
    }
}

/// Mode registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("Invalid mode '{token}'; valid modes: {}", .valid.join(", "))]
    Invalid { token: String, valid: Vec<String> },

    #[error("Mode '{kind}' has an empty token")]
    EmptyToken { kind: ModeKind },

    #[error("Mode token '{token}' is configured for more than one mode")]
    DuplicateToken { token: String },
}

/// The three configured modes
#[derive(Debug, Clone)]
pub struct ModeRegistry {
    modes: [Mode; 3],
}

impl Default for ModeRegistry {
    fn default() -> Self {
        let tokens = ModeTokens::default();
        Self {
            modes: ModeKind::ALL.map(|kind| Mode::new(kind, tokens.token(kind).to_string())),
        }
    }
}

impl ModeRegistry {
    /// Build a registry from configured tokens
    pub fn new(tokens: &ModeTokens) -> Result<Self, ModeError> {
        let mut seen: Vec<String> = Vec::with_capacity(3);
        for kind in ModeKind::ALL {
            let token = Self::normalize(tokens.token(kind));
            if token.is_empty() {
                return Err(ModeError::EmptyToken { kind });
            }
            if seen.contains(&token) {
                return Err(ModeError::DuplicateToken { token });
            }
            seen.push(token);
        }

        let [large, medium, small] = [0, 1, 2].map(|i| seen[i].clone());
        Ok(Self {
            modes: [
                Mode::new(ModeKind::Large, large),
                Mode::new(ModeKind::Medium, medium),
                Mode::new(ModeKind::Small, small),
            ],
        })
    }

    /// Normalize a caller-supplied token
    pub fn normalize(token: &str) -> String {
        token.trim().to_ascii_uppercase()
    }

    /// Validate an already-normalized token
    pub fn validate(&self, token: &str) -> Result<&Mode, ModeError> {
        self.modes
            .iter()
            .find(|m| m.token == token)
            .ok_or_else(|| ModeError::Invalid {
                token: token.to_string(),
                valid: self.tokens(),
            })
    }

    /// Normalize then validate
    pub fn resolve(&self, token: &str) -> Result<&Mode, ModeError> {
        self.validate(&Self::normalize(token))
    }

    pub fn get(&self, kind: ModeKind) -> &Mode {
        match kind {
            ModeKind::Large => &self.modes[0],
            ModeKind::Medium => &self.modes[1],
            ModeKind::Small => &self.modes[2],
        }
    }

    pub fn token(&self, kind: ModeKind) -> &str {
        &self.get(kind).token
    }

    pub fn tokens(&self) -> Vec<String> {
        self.modes.iter().map(|m| m.token.clone()).collect()
    }

    pub fn modes(&self) -> impl Iterator<Item = &Mode> {
        self.modes.iter()
    }
}

//! Keyboard input as the engine sees it.
use serde::{Deserialize, Serialize};

/// A keydown, reduced to the key value and modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn is(&self, key: &str) -> bool {
        self.key == key
    }
}

/// A key plus the exact modifier set it must be pressed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyChord {
    /// Keys compare case-insensitively, since Shift changes the reported
    /// key value for letters.
    #[must_use]
    pub fn matches(&self, input: &KeyInput) -> bool {
        self.key.eq_ignore_ascii_case(&input.key)
            && self.alt == input.alt
            && self.shift == input.shift
            && self.ctrl == input.ctrl
            && self.meta == input.meta
    }
}

impl Default for KeyChord {
    fn default() -> Self {
        Self {
            key: "a".to_string(),
            alt: true,
            shift: true,
            ctrl: false,
            meta: false,
        }
    }
}

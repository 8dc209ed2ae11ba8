//! Overlay configuration
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACTIVATION_PHRASES, DEFAULT_ANCESTOR_DEPTH, DEFAULT_FALLBACK_MAX_CHARS,
    DEFAULT_HOVER_DELAY_MS, MAX_ANCESTOR_DEPTH, MAX_HOVER_DELAY_MS, OPEN_ATTRIBUTE,
};
use crate::error::ConfigError;
use crate::input::KeyChord;
use crate::profiles::SwitchPolicy;

const MAX_FALLBACK_CHARS: usize = 1_000;
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    #[serde(default = "default_hover_delay_ms")]
    pub hover_delay_ms: u32,
    #[serde(default = "default_ancestor_depth")]
    pub ancestor_depth: usize,
    #[serde(default = "default_fallback_max_chars")]
    pub fallback_max_chars: usize,
    #[serde(default)]
    pub switch_policy: SwitchPolicy,
    #[serde(default)]
    pub shortcut: KeyChord,
    #[serde(default = "default_activation_phrases")]
    pub activation_phrases: Vec<String>,
    #[serde(default = "default_open_attribute")]
    pub open_attribute: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

const fn default_hover_delay_ms() -> u32 {
    DEFAULT_HOVER_DELAY_MS
}

const fn default_ancestor_depth() -> usize {
    DEFAULT_ANCESTOR_DEPTH
}

const fn default_fallback_max_chars() -> usize {
    DEFAULT_FALLBACK_MAX_CHARS
}

fn default_activation_phrases() -> Vec<String> {
    DEFAULT_ACTIVATION_PHRASES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_open_attribute() -> String {
    OPEN_ATTRIBUTE.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: default_hover_delay_ms(),
            ancestor_depth: default_ancestor_depth(),
            fallback_max_chars: default_fallback_max_chars(),
            switch_policy: SwitchPolicy::default(),
            shortcut: KeyChord::default(),
            activation_phrases: default_activation_phrases(),
            open_attribute: default_open_attribute(),
            log_level: default_log_level(),
        }
    }
}

impl OverlayConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if any value falls outside its supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "hoverDelayMs",
            u64::from(self.hover_delay_ms),
            0,
            u64::from(MAX_HOVER_DELAY_MS),
        )?;
        check_range(
            "ancestorDepth",
            self.ancestor_depth as u64,
            1,
            MAX_ANCESTOR_DEPTH as u64,
        )?;
        check_range(
            "fallbackMaxChars",
            self.fallback_max_chars as u64,
            1,
            MAX_FALLBACK_CHARS as u64,
        )?;
        if self.shortcut.key.trim().is_empty() {
            return Err(ConfigError::EmptyShortcut);
        }
        if !self.open_attribute.starts_with("data-") || self.open_attribute.len() <= "data-".len() {
            return Err(ConfigError::OpenAttribute(self.open_attribute.clone()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }
        Ok(())
    }

    /// `log_level` as a filter. Call after [`Self::validate`]; unknown values
    /// read as `Warn`.
    #[must_use]
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

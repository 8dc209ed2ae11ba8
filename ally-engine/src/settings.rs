//! In-memory settings state
//!
//! The session's source of truth for every preference value. Mutation goes
//! through [`crate::engine::PreferenceEngine`], which keeps this struct, the
//! store, and the effect sink in step.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::{Feature, Registry};

/// Current value of a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FeatureValue {
    Toggle(bool),
    Level(u8),
    Swatch(Option<u8>),
}

impl FeatureValue {
    /// Whether the value produces a visible effect.
    #[must_use]
    pub const fn is_active(self) -> bool {
        match self {
            Self::Toggle(on) => on,
            Self::Level(level) => level > 0,
            Self::Swatch(selected) => selected.is_some(),
        }
    }
}

/// Which edge of the viewport the panel docks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelSide {
    Left,
    #[default]
    Right,
}

impl PanelSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Speaking rate presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechRate {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeechRate {
    pub const ALL: [Self; 3] = [Self::Slow, Self::Normal, Self::Fast];

    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Slow => 0.75,
            Self::Normal => 1.0,
            Self::Fast => 1.5,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.as_str() == raw)
    }

    /// Next preset, wrapping from fast back to slow.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Slow => Self::Normal,
            Self::Normal => Self::Fast,
            Self::Fast => Self::Slow,
        }
    }
}

/// Snapshot of every feature's value, used as the pre-profile baseline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    values: BTreeMap<String, FeatureValue>,
}

impl Snapshot {
    /// Value recorded for `feature`, validated against its kind.
    ///
    /// A value of the wrong kind (e.g. the registry changed since the backup
    /// was written) resolves to the feature default.
    #[must_use]
    pub fn value_for(&self, feature: &Feature) -> FeatureValue {
        self.values
            .get(feature.key)
            .and_then(|value| feature.coerce(*value).ok())
            .unwrap_or_else(|| feature.default_value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize for the profile-backup storage key.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a persisted backup.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Every preference value for the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    values: BTreeMap<&'static str, FeatureValue>,
    pub panel_side: PanelSide,
    pub speech_rate: SpeechRate,
    pub speech_enabled: bool,
    pub active_profile: Option<&'static str>,
}

impl SettingsState {
    /// Fresh state with every feature at its default.
    #[must_use]
    pub fn defaults(registry: &Registry) -> Self {
        Self {
            values: registry
                .iter()
                .map(|feature| (feature.key, feature.default_value()))
                .collect(),
            panel_side: PanelSide::default(),
            speech_rate: SpeechRate::default(),
            speech_enabled: false,
            active_profile: None,
        }
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<FeatureValue> {
        self.values.get(key).copied()
    }

    #[must_use]
    pub fn is_on(&self, key: &str) -> bool {
        matches!(self.value(key), Some(FeatureValue::Toggle(true)))
    }

    #[must_use]
    pub fn level(&self, key: &str) -> u8 {
        match self.value(key) {
            Some(FeatureValue::Level(level)) => level,
            _ => 0,
        }
    }

    #[must_use]
    pub fn swatch(&self, key: &str) -> Option<u8> {
        match self.value(key) {
            Some(FeatureValue::Swatch(selected)) => selected,
            _ => None,
        }
    }

    /// Iterate feature values keyed by feature key.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, FeatureValue)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }

    /// Whether every feature sits at its default value.
    #[must_use]
    pub fn features_at_default(&self, registry: &Registry) -> bool {
        registry
            .iter()
            .all(|feature| self.value(feature.key) == Some(feature.default_value()))
    }

    pub(crate) fn put(&mut self, key: &'static str, value: FeatureValue) {
        self.values.insert(key, value);
    }

    /// Capture every feature value.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            values: self
                .values
                .iter()
                .map(|(key, value)| ((*key).to_string(), *value))
                .collect(),
        }
    }
}

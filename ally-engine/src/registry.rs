//! Feature registry
//!
//! The canonical, ordered list of adjustments the overlay knows about. Order
//! is display order only; lookups are by key.
use crate::constants::{EFFECT_PREFIX, PAUSE_ROTATION, REDUCE_MOTION, STORAGE_PREFIX};
use crate::error::{MalformedValue, PreferenceError};
use crate::settings::FeatureValue;

pub const TEXT_SWATCHES: &[&str] = &[
    "#1a1a2e", "#e63946", "#e76f51", "#f4a261", "#2a9d8f", "#457b9d", "#7209b7",
];
pub const BG_SWATCHES: &[&str] = &[
    "#ffffff", "#ffc8dd", "#ffcdb2", "#fce4a8", "#d8f3dc", "#bde0fe", "#e2cfea",
];

/// Shape of the value a feature holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Toggle,
    Leveled { max_level: u8 },
    Palette { swatches: &'static [&'static str] },
}

impl FeatureKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Leveled { .. } => "level",
            Self::Palette { .. } => "swatch",
        }
    }
}

/// Static descriptor for one adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FeatureKind,
    effect: &'static str,
}

impl Feature {
    #[must_use]
    pub const fn toggle(key: &'static str, label: &'static str, effect: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FeatureKind::Toggle,
            effect,
        }
    }

    #[must_use]
    pub const fn leveled(
        key: &'static str,
        label: &'static str,
        effect: &'static str,
        max_level: u8,
    ) -> Self {
        Self {
            key,
            label,
            kind: FeatureKind::Leveled { max_level },
            effect,
        }
    }

    #[must_use]
    pub const fn palette(
        key: &'static str,
        label: &'static str,
        effect: &'static str,
        swatches: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            label,
            kind: FeatureKind::Palette { swatches },
            effect,
        }
    }

    /// Storage key, derived from the feature key.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{STORAGE_PREFIX}{}", self.key)
    }

    /// Stable effect name handed to the styling layer.
    #[must_use]
    pub const fn effect_name(&self) -> &'static str {
        self.effect
    }

    #[must_use]
    pub const fn default_value(&self) -> FeatureValue {
        match self.kind {
            FeatureKind::Toggle => FeatureValue::Toggle(false),
            FeatureKind::Leveled { .. } => FeatureValue::Level(0),
            FeatureKind::Palette { .. } => FeatureValue::Swatch(None),
        }
    }

    #[must_use]
    pub const fn max_level(&self) -> Option<u8> {
        match self.kind {
            FeatureKind::Leveled { max_level } => Some(max_level),
            _ => None,
        }
    }

    #[must_use]
    pub fn swatch(&self, index: u8) -> Option<&'static str> {
        match self.kind {
            FeatureKind::Palette { swatches } => swatches.get(usize::from(index)).copied(),
            _ => None,
        }
    }

    /// Validate a value against this feature's kind, clamping levels into range.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has the wrong kind or names a swatch
    /// that does not exist.
    pub fn coerce(&self, value: FeatureValue) -> Result<FeatureValue, PreferenceError> {
        match (self.kind, value) {
            (FeatureKind::Toggle, FeatureValue::Toggle(_))
            | (FeatureKind::Palette { .. }, FeatureValue::Swatch(None)) => Ok(value),
            (FeatureKind::Leveled { max_level }, FeatureValue::Level(level)) => {
                Ok(FeatureValue::Level(level.min(max_level)))
            }
            (FeatureKind::Palette { swatches }, FeatureValue::Swatch(Some(index))) => {
                if usize::from(index) < swatches.len() {
                    Ok(value)
                } else {
                    Err(PreferenceError::SwatchOutOfRange {
                        key: self.key.to_string(),
                        index: usize::from(index),
                    })
                }
            }
            (kind, _) => Err(PreferenceError::KindMismatch {
                key: self.key.to_string(),
                expected: kind.label(),
            }),
        }
    }

    /// Parse a persisted string. Out-of-range levels are malformed, not clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not encode a valid value.
    pub fn decode(&self, raw: &str) -> Result<FeatureValue, MalformedValue> {
        let malformed = || MalformedValue {
            key: self.storage_key(),
            raw: raw.to_string(),
        };
        match self.kind {
            FeatureKind::Toggle => match raw {
                "true" => Ok(FeatureValue::Toggle(true)),
                "false" => Ok(FeatureValue::Toggle(false)),
                _ => Err(malformed()),
            },
            FeatureKind::Leveled { max_level } => raw
                .parse::<u8>()
                .ok()
                .filter(|level| *level <= max_level)
                .map(FeatureValue::Level)
                .ok_or_else(malformed),
            FeatureKind::Palette { swatches } => {
                if raw.is_empty() {
                    return Ok(FeatureValue::Swatch(None));
                }
                swatches
                    .iter()
                    .position(|swatch| swatch.eq_ignore_ascii_case(raw))
                    .and_then(|idx| u8::try_from(idx).ok())
                    .map(|idx| FeatureValue::Swatch(Some(idx)))
                    .ok_or_else(malformed)
            }
        }
    }

    /// Encode a value for persistence.
    #[must_use]
    pub fn encode(&self, value: FeatureValue) -> String {
        match value {
            FeatureValue::Toggle(on) => on.to_string(),
            FeatureValue::Level(level) => level.to_string(),
            FeatureValue::Swatch(Some(index)) => self.swatch(index).unwrap_or_default().to_string(),
            FeatureValue::Swatch(None) => String::new(),
        }
    }
}

/// Ordered, immutable set of features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    features: Vec<Feature>,
}

impl Registry {
    /// Build a registry, keeping the first occurrence of any duplicated key.
    #[must_use]
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut unique: Vec<Feature> = Vec::new();
        for feature in features {
            if unique.iter().any(|existing| existing.key == feature.key) {
                log::warn!("duplicate feature key `{}` ignored", feature.key);
                continue;
            }
            unique.push(feature);
        }
        Self { features: unique }
    }

    /// The adjustments shipped with the overlay.
    #[must_use]
    pub fn standard() -> Self {
        Self::new([
            Feature::toggle("keyboard-nav", "Keyboard Navigation", "a11y-keyboard-nav"),
            Feature::toggle("big-cursor", "Big Cursor", "a11y-big-cursor"),
            Feature::toggle("highlight-focus", "Highlight Focus", "a11y-highlight-focus"),
            Feature::toggle("highlight-hover", "Highlight Hover", "a11y-highlight-hover"),
            Feature::toggle(REDUCE_MOTION, "Reduce Motion", "a11y-reduce-motion"),
            Feature::toggle(PAUSE_ROTATION, "Pause Rotating Content", "a11y-pause-rotation"),
            Feature::toggle("hide-images", "Hide Images", "a11y-hide-images"),
            Feature::toggle("reading-mode", "Reading Mode", "a11y-reading-mode"),
            Feature::toggle("dyslexic-font", "Dyslexic Font", "a11y-dyslexic-font"),
            Feature::toggle("invert-colors", "Invert Colors", "a11y-invert-colors"),
            Feature::leveled("zoom", "Zoom Screen", "a11y-zoom", 3),
            Feature::leveled("brightness", "Brightness", "a11y-bright", 3),
            Feature::leveled("font-sizing", "Font Sizing", "a11y-font", 3),
            Feature::leveled("letter-spacing", "Letter Spacing", "a11y-spacing", 3),
            Feature::leveled("saturation", "Saturation", "a11y-sat", 3),
            Feature::leveled("align-text", "Align Text", "a11y-align", 3),
            Feature::palette("text-color", "Adjust Text Colors", "a11y-text-color", TEXT_SWATCHES),
            Feature::palette(
                "title-color",
                "Adjust Title Colors",
                "a11y-title-color",
                TEXT_SWATCHES,
            ),
            Feature::palette("bg-color", "Adjust Background Colors", "a11y-bg-color", BG_SWATCHES),
        ])
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.key == key)
    }

    /// Look up a feature, reporting unknown keys as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if no feature has the given key.
    pub fn require(&self, key: &str) -> Result<&Feature, PreferenceError> {
        self.get(key)
            .ok_or_else(|| PreferenceError::UnknownFeature(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Storage keys of every feature, in display order.
    #[must_use]
    pub fn storage_keys(&self) -> Vec<String> {
        self.features.iter().map(Feature::storage_key).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

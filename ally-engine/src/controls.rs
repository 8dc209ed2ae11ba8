//! Control surface
//!
//! Every interactive control in the panel is described by a
//! [`ControlDescriptor`] whose [`Binding`] says what it drives. Hosts render
//! from the descriptors and route activations back by id, so no per-widget
//! logic lives outside the engine.
use std::fmt;

use crate::error::PreferenceError;
use crate::profiles::ProfileCatalog;
use crate::registry::{FeatureKind, Registry};
use crate::settings::{FeatureValue, PanelSide, SettingsState, SpeechRate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reset,
    Save,
    Close,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::Reset, Self::Save, Self::Close];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Save => "save",
            Self::Close => "close",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reset => "Reset all settings",
            Self::Save => "Save settings",
            Self::Close => "Close accessibility menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Feature(&'static str),
    Swatch { feature: &'static str, index: u8 },
    Profile(&'static str),
    PanelSide,
    SpeechEnabled,
    SpeechRate,
    Action(Action),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature(key) => write!(f, "feature:{key}"),
            Self::Swatch { feature, index } => write!(f, "swatch:{feature}:{index}"),
            Self::Profile(id) => write!(f, "profile:{id}"),
            Self::PanelSide => f.write_str("panel-side"),
            Self::SpeechEnabled => f.write_str("speech-active"),
            Self::SpeechRate => f.write_str("speech-rate"),
            Self::Action(action) => f.write_str(action.id()),
        }
    }
}

impl Binding {
    /// Parse a control id back into a binding against the live catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is malformed or names an unknown feature,
    /// swatch, or profile.
    pub fn parse(
        id: &str,
        registry: &Registry,
        profiles: &ProfileCatalog,
    ) -> Result<Self, PreferenceError> {
        let unknown = || PreferenceError::UnknownControl(id.to_string());
        match id {
            "panel-side" => return Ok(Self::PanelSide),
            "speech-active" => return Ok(Self::SpeechEnabled),
            "speech-rate" => return Ok(Self::SpeechRate),
            _ => {}
        }
        if let Some(action) = Action::ALL.into_iter().find(|action| action.id() == id) {
            return Ok(Self::Action(action));
        }
        if let Some(key) = id.strip_prefix("feature:") {
            return Ok(Self::Feature(registry.require(key)?.key));
        }
        if let Some(id) = id.strip_prefix("profile:") {
            return Ok(Self::Profile(profiles.require(id)?.id));
        }
        let rest = id.strip_prefix("swatch:").ok_or_else(unknown)?;
        let (key, index) = rest.rsplit_once(':').ok_or_else(unknown)?;
        let index: u8 = index.parse().map_err(|_| unknown())?;
        let feature = registry.require(key)?;
        if feature.swatch(index).is_none() {
            return Err(PreferenceError::SwatchOutOfRange {
                key: feature.key.to_string(),
                index: usize::from(index),
            });
        }
        Ok(Self::Swatch {
            feature: feature.key,
            index,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub id: String,
    pub label: String,
    pub binding: Binding,
}

impl ControlDescriptor {
    fn new(binding: Binding, label: impl Into<String>) -> Self {
        Self {
            id: binding.to_string(),
            label: label.into(),
            binding,
        }
    }
}

/// Every control the panel offers, in display order.
#[must_use]
pub fn descriptors(registry: &Registry, profiles: &ProfileCatalog) -> Vec<ControlDescriptor> {
    let mut out = Vec::new();
    for profile in profiles.iter() {
        out.push(ControlDescriptor::new(
            Binding::Profile(profile.id),
            profile.label,
        ));
    }
    for feature in registry.iter() {
        match feature.kind {
            FeatureKind::Palette { swatches } => {
                for (index, hex) in (0..=u8::MAX).zip(swatches.iter()) {
                    out.push(ControlDescriptor::new(
                        Binding::Swatch {
                            feature: feature.key,
                            index,
                        },
                        format!("{}: {hex}", feature.label),
                    ));
                }
            }
            _ => out.push(ControlDescriptor::new(
                Binding::Feature(feature.key),
                feature.label,
            )),
        }
    }
    out.push(ControlDescriptor::new(Binding::SpeechEnabled, "Hover Speech"));
    out.push(ControlDescriptor::new(Binding::SpeechRate, "Speech Rate"));
    out.push(ControlDescriptor::new(Binding::PanelSide, "Widget Position"));
    for action in Action::ALL {
        out.push(ControlDescriptor::new(Binding::Action(action), action.label()));
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlValue {
    Pressed(bool),
    Level { level: u8, max: u8 },
    Selected(bool),
    Rate(SpeechRate),
    Side(PanelSide),
    Action,
}

/// Current presentation state of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub value: ControlValue,
    /// Accessible label reflecting the current value.
    pub label: String,
}

impl ControlState {
    #[must_use]
    pub fn describe(
        binding: Binding,
        registry: &Registry,
        profiles: &ProfileCatalog,
        state: &SettingsState,
    ) -> Self {
        match binding {
            Binding::Feature(key) => {
                let label = registry.get(key).map_or(key, |feature| feature.label);
                match state.value(key) {
                    Some(FeatureValue::Level(level)) => {
                        let max = registry
                            .get(key)
                            .and_then(|feature| feature.max_level())
                            .unwrap_or(level);
                        Self {
                            value: ControlValue::Level { level, max },
                            label: format!("{label}, level {level} of {max}"),
                        }
                    }
                    other => {
                        let on = other.is_some_and(FeatureValue::is_active);
                        Self {
                            value: ControlValue::Pressed(on),
                            label: format!("{label}, {}", if on { "on" } else { "off" }),
                        }
                    }
                }
            }
            Binding::Swatch { feature, index } => {
                let selected = state.swatch(feature) == Some(index);
                let descriptor = registry.get(feature);
                let hex = descriptor.and_then(|f| f.swatch(index)).unwrap_or_default();
                let name = descriptor.map_or(feature, |f| f.label);
                Self {
                    value: ControlValue::Selected(selected),
                    label: format!(
                        "{name}: {hex}{}",
                        if selected { ", selected" } else { "" }
                    ),
                }
            }
            Binding::Profile(id) => {
                let active = state.active_profile == Some(id);
                let name = profiles.get(id).map_or(id, |profile| profile.label);
                Self {
                    value: ControlValue::Pressed(active),
                    label: format!("{name} profile, {}", if active { "on" } else { "off" }),
                }
            }
            Binding::PanelSide => Self {
                value: ControlValue::Side(state.panel_side),
                label: format!("Move widget to the {}", state.panel_side.flipped().as_str()),
            },
            Binding::SpeechEnabled => Self {
                value: ControlValue::Pressed(state.speech_enabled),
                label: format!(
                    "Hover Speech, {}",
                    if state.speech_enabled { "on" } else { "off" }
                ),
            },
            Binding::SpeechRate => Self {
                value: ControlValue::Rate(state.speech_rate),
                label: format!("Speech rate: {}", state.speech_rate.as_str()),
            },
            Binding::Action(action) => Self {
                value: ControlValue::Action,
                label: action.label().to_string(),
            },
        }
    }

    /// `aria-pressed` value, for controls that have one.
    #[must_use]
    pub const fn aria_pressed(&self) -> Option<bool> {
        match self.value {
            ControlValue::Pressed(on) | ControlValue::Selected(on) => Some(on),
            ControlValue::Level { level, .. } => Some(level > 0),
            _ => None,
        }
    }
}

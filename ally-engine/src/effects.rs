//! Effects derived from settings
//!
//! One effect per feature. Leveled features carry the single active level
//! rather than one flag per level, so contradictory level effects can never
//! be active together.
use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::constants::{PAUSE_ROTATION, REDUCE_MOTION};
use crate::registry::{Feature, FeatureKind, Registry};
use crate::settings::{FeatureValue, PanelSide, SettingsState};

/// Externally observable flag for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Flag {
        name: &'static str,
        on: bool,
    },
    Level {
        name: &'static str,
        level: Option<u8>,
        max_level: u8,
    },
    Color {
        name: &'static str,
        value: Option<&'static str>,
    },
}

impl Effect {
    fn from_feature(feature: &Feature, value: FeatureValue) -> Self {
        let name = feature.effect_name();
        match (feature.kind, value) {
            (FeatureKind::Leveled { max_level }, FeatureValue::Level(level)) => Self::Level {
                name,
                level: (level > 0).then_some(level.min(max_level)),
                max_level,
            },
            (FeatureKind::Leveled { max_level }, _) => Self::Level {
                name,
                level: None,
                max_level,
            },
            (FeatureKind::Palette { .. }, FeatureValue::Swatch(Some(index))) => Self::Color {
                name,
                value: feature.swatch(index),
            },
            (FeatureKind::Palette { .. }, _) => Self::Color { name, value: None },
            (FeatureKind::Toggle, value) => Self::Flag {
                name,
                on: value.is_active(),
            },
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Flag { name, .. } | Self::Level { name, .. } | Self::Color { name, .. } => *name,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        match self {
            Self::Flag { on, .. } => *on,
            Self::Level { level, .. } => level.is_some(),
            Self::Color { value, .. } => value.is_some(),
        }
    }

    /// Class name a stylesheet keys on, if this effect is expressed as one.
    #[must_use]
    pub fn class_name(&self) -> Option<String> {
        match self {
            Self::Flag { name, on: true } => Some((*name).to_string()),
            Self::Level {
                name,
                level: Some(level),
                ..
            } => Some(format!("{name}-{level}")),
            _ => None,
        }
    }
}

/// Full effect set for a settings state, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectSet {
    effects: SmallVec<[Effect; 24]>,
}

impl EffectSet {
    #[must_use]
    pub fn compute(registry: &Registry, state: &SettingsState) -> Self {
        Self {
            effects: registry
                .iter()
                .map(|feature| {
                    let value = state
                        .value(feature.key)
                        .unwrap_or_else(|| feature.default_value());
                    Effect::from_feature(feature, value)
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Effect> {
        self.effects.iter().find(|effect| effect.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Class names that should be present on the document element.
    #[must_use]
    pub fn active_classes(&self) -> Vec<String> {
        self.effects.iter().filter_map(Effect::class_name).collect()
    }
}

/// Consumer of effect sets; typically the page's styling layer.
pub trait EffectSink {
    fn apply(&mut self, effects: &EffectSet);

    /// Dock the panel. Hosts without a movable panel can ignore this.
    fn place_panel(&mut self, _side: PanelSide) {}
}

/// Sink that keeps every emitted set, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    emitted: Rc<RefCell<Vec<EffectSet>>>,
    panel: Rc<RefCell<Option<PanelSide>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last(&self) -> Option<EffectSet> {
        self.emitted.borrow().last().cloned()
    }

    #[must_use]
    pub fn emissions(&self) -> usize {
        self.emitted.borrow().len()
    }

    #[must_use]
    pub fn panel_side(&self) -> Option<PanelSide> {
        *self.panel.borrow()
    }
}

impl EffectSink for RecordingSink {
    fn apply(&mut self, effects: &EffectSet) {
        self.emitted.borrow_mut().push(effects.clone());
    }

    fn place_panel(&mut self, side: PanelSide) {
        *self.panel.borrow_mut() = Some(side);
    }
}

/// A boolean feature that forces another boolean feature on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coupling {
    pub source: &'static str,
    pub forces: &'static str,
}

pub const COUPLINGS: &[Coupling] = &[Coupling {
    source: REDUCE_MOTION,
    forces: PAUSE_ROTATION,
}];

/// Apply every coupling to `state`, returning the keys that were changed.
pub fn enforce_couplings(
    registry: &Registry,
    state: &mut SettingsState,
) -> SmallVec<[&'static str; 2]> {
    let mut changed = SmallVec::new();
    for coupling in COUPLINGS {
        let Some(target) = registry.get(coupling.forces) else {
            continue;
        };
        if state.is_on(coupling.source) && !state.is_on(target.key) {
            state.put(target.key, FeatureValue::Toggle(true));
            changed.push(target.key);
        }
    }
    changed
}

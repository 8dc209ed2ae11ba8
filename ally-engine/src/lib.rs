//! Ally Preference Engine
//!
//! Platform-agnostic core of the accessibility overlay: the feature registry,
//! persisted settings, profiles, effect computation, hover speech timing,
//! and panel focus management. This crate has no browser dependencies;
//! hosts plug in through the [`KeyValueStore`], [`EffectSink`],
//! [`SpeechBackend`], [`SpeakableNode`] and [`DialogHost`] traits.

pub mod config;
pub mod constants;
pub mod controls;
pub mod dialog;
pub mod effects;
pub mod engine;
pub mod error;
pub mod input;
#[cfg(test)]
mod memory_dom;
pub mod overlay;
pub mod profiles;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod speech;
pub mod store;
pub mod triggers;

// Re-export commonly used types
pub use config::OverlayConfig;
pub use controls::{Action, Binding, ControlDescriptor, ControlState, ControlValue};
pub use dialog::{DialogController, DialogHost, KeyDisposition};
pub use effects::{Effect, EffectSet, EffectSink, RecordingSink};
pub use engine::PreferenceEngine;
pub use error::{ConfigError, MalformedValue, PreferenceError, StoreError};
pub use input::{KeyChord, KeyInput};
pub use overlay::{ClickOutcome, ControlResponse, Overlay};
pub use profiles::{Profile, ProfileCatalog, ProfileTransition, RestoreSource, SwitchPolicy};
pub use registry::{Feature, FeatureKind, Registry};
pub use resolver::{SpeakableNode, SpeakableTextResolver};
pub use settings::{FeatureValue, PanelSide, SettingsState, Snapshot, SpeechRate};
pub use speech::{
    HoverOutcome, HoverToken, NoSpeech, RecordingSpeech, SpeechBackend, SpeechSession,
};
pub use store::{KeyValueStore, MemoryStore, PersistentStore};
pub use triggers::{Activation, ActivationTriggers};

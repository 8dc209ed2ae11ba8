//! Preference engine: settings state plus the effect applier.
//!
//! Every mutation runs to completion synchronously: update the in-memory
//! state, enforce couplings, persist what changed, then emit the full effect
//! set once.
use crate::constants::{
    KEY_ACTIVE_PROFILE, KEY_PANEL_SIDE, KEY_PROFILE_BACKUP, KEY_SPEECH_ACTIVE, KEY_SPEECH_RATE,
    SCALAR_KEYS,
};
use crate::effects::{EffectSet, EffectSink, enforce_couplings};
use crate::error::PreferenceError;
use crate::profiles::{ProfileCatalog, SwitchPolicy};
use crate::registry::{Feature, FeatureKind, Registry};
use crate::settings::{FeatureValue, PanelSide, SettingsState, Snapshot, SpeechRate};
use crate::store::{KeyValueStore, PersistentStore};

/// Owns the settings state for one overlay instance.
pub struct PreferenceEngine<S, E> {
    registry: Registry,
    profiles: ProfileCatalog,
    switch_policy: SwitchPolicy,
    store: PersistentStore<S>,
    sink: E,
    state: SettingsState,
    backup: Option<Snapshot>,
}

impl<S, E> PreferenceEngine<S, E>
where
    S: KeyValueStore,
    E: EffectSink,
{
    /// Create an engine with default settings. Call [`Self::hydrate`] to
    /// load persisted values.
    pub fn new(registry: Registry, profiles: ProfileCatalog, backend: S, sink: E) -> Self {
        let state = SettingsState::defaults(&registry);
        Self {
            registry,
            profiles,
            switch_policy: SwitchPolicy::default(),
            store: PersistentStore::new(backend),
            sink,
            state,
            backup: None,
        }
    }

    #[must_use]
    pub fn with_switch_policy(mut self, policy: SwitchPolicy) -> Self {
        self.switch_policy = policy;
        self
    }

    /// Reload every value from the store. Missing or malformed entries
    /// resolve to defaults; a key whose read fails keeps its in-session
    /// value. Nothing is emitted until [`Self::apply_all`].
    pub fn hydrate(&mut self) {
        let mut state = SettingsState::defaults(&self.registry);
        for feature in self.registry.iter() {
            match self.store.get(&feature.storage_key()) {
                Ok(Some(raw)) => match feature.decode(&raw) {
                    Ok(value) => state.put(feature.key, value),
                    Err(err) => log::debug!("{err}; using default"),
                },
                Ok(None) => {}
                Err(_) => {
                    if let Some(current) = self.state.value(feature.key) {
                        state.put(feature.key, current);
                    }
                }
            }
        }
        state.panel_side = match self.store.get(KEY_PANEL_SIDE) {
            Ok(raw) => raw.and_then(|raw| PanelSide::parse(&raw)).unwrap_or_default(),
            Err(_) => self.state.panel_side,
        };
        state.speech_rate = match self.store.get(KEY_SPEECH_RATE) {
            Ok(raw) => raw.and_then(|raw| SpeechRate::parse(&raw)).unwrap_or_default(),
            Err(_) => self.state.speech_rate,
        };
        state.speech_enabled = match self.store.get(KEY_SPEECH_ACTIVE) {
            Ok(raw) => raw.is_some_and(|raw| raw == "true"),
            Err(_) => self.state.speech_enabled,
        };
        state.active_profile = match self.store.get(KEY_ACTIVE_PROFILE) {
            Ok(raw) => raw.and_then(|raw| self.profiles.get(&raw).map(|profile| profile.id)),
            Err(_) => self.state.active_profile,
        };

        match self.store.get(KEY_PROFILE_BACKUP) {
            Ok(raw) => {
                self.backup = raw.and_then(|raw| {
                    Snapshot::from_json(&raw)
                        .inspect_err(|err| log::debug!("discarding malformed backup: {err}"))
                        .ok()
                });
            }
            Err(_) => log::debug!("profile backup unreadable; keeping the in-memory copy"),
        }
        self.state = state;
        log::debug!(
            "hydrated {} features (profile: {:?})",
            self.registry.len(),
            self.state.active_profile
        );
    }

    /// Recompute and emit effects for the whole state.
    pub fn apply_all(&mut self) {
        self.commit(&[]);
        self.sink.place_panel(self.state.panel_side);
    }

    /// Set a feature to `value`, clamping levels into range.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, values of the wrong kind, or
    /// swatches outside the palette.
    pub fn set(&mut self, key: &str, value: FeatureValue) -> Result<FeatureValue, PreferenceError> {
        let feature = *self.registry.require(key)?;
        let value = feature.coerce(value)?;
        self.state.put(feature.key, value);
        self.commit(&[feature.key]);
        Ok(self.value_of(&feature))
    }

    /// Flip a boolean feature, returning its new value.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or non-boolean features.
    pub fn toggle(&mut self, key: &str) -> Result<bool, PreferenceError> {
        let feature = *self.registry.require(key)?;
        if feature.kind != FeatureKind::Toggle {
            return Err(PreferenceError::KindMismatch {
                key: key.to_string(),
                expected: FeatureKind::Toggle.label(),
            });
        }
        let next = !self.state.is_on(feature.key);
        self.set(feature.key, FeatureValue::Toggle(next))?;
        Ok(self.state.is_on(feature.key))
    }

    /// Advance a leveled feature by one, wrapping from its maximum to zero.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or non-leveled features.
    pub fn cycle_level(&mut self, key: &str) -> Result<u8, PreferenceError> {
        let feature = *self.registry.require(key)?;
        let Some(max_level) = feature.max_level() else {
            return Err(PreferenceError::KindMismatch {
                key: key.to_string(),
                expected: "level",
            });
        };
        let current = self.state.level(feature.key);
        let next = if current >= max_level { 0 } else { current + 1 };
        self.state.put(feature.key, FeatureValue::Level(next));
        self.commit(&[feature.key]);
        Ok(next)
    }

    /// Select a palette swatch; selecting the current swatch clears it.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or non-palette features, or an index
    /// past the end of the palette.
    pub fn select_swatch(&mut self, key: &str, index: u8) -> Result<Option<u8>, PreferenceError> {
        let feature = *self.registry.require(key)?;
        let next = if self.state.swatch(feature.key) == Some(index) {
            None
        } else {
            Some(index)
        };
        self.set(feature.key, FeatureValue::Swatch(next))?;
        Ok(self.state.swatch(feature.key))
    }

    pub fn set_panel_side(&mut self, side: PanelSide) {
        self.state.panel_side = side;
        self.store.set(KEY_PANEL_SIDE, side.as_str());
        self.sink.place_panel(side);
    }

    pub fn toggle_panel_side(&mut self) -> PanelSide {
        let side = self.state.panel_side.flipped();
        self.set_panel_side(side);
        side
    }

    pub fn set_speech_enabled(&mut self, enabled: bool) {
        self.state.speech_enabled = enabled;
        self.store
            .set(KEY_SPEECH_ACTIVE, if enabled { "true" } else { "false" });
    }

    pub fn set_speech_rate(&mut self, rate: SpeechRate) {
        self.state.speech_rate = rate;
        self.store.set(KEY_SPEECH_RATE, rate.as_str());
    }

    /// Return every preference to its default and delete every persisted key.
    pub fn reset(&mut self) {
        let feature_keys = self.registry.storage_keys();
        self.store.remove_all(feature_keys);
        self.store.remove_all(SCALAR_KEYS);
        self.state = SettingsState::defaults(&self.registry);
        self.backup = None;
        let effects = EffectSet::compute(&self.registry, &self.state);
        self.sink.apply(&effects);
        self.sink.place_panel(self.state.panel_side);
        log::debug!("preferences reset");
    }

    /// Write every in-memory value back to the store.
    pub fn flush(&mut self) {
        for feature in self.registry.iter() {
            let value = self.value_of(feature);
            self.store.set(&feature.storage_key(), &feature.encode(value));
        }
        self.store.set(KEY_PANEL_SIDE, self.state.panel_side.as_str());
        self.store.set(KEY_SPEECH_RATE, self.state.speech_rate.as_str());
        self.store.set(
            KEY_SPEECH_ACTIVE,
            if self.state.speech_enabled { "true" } else { "false" },
        );
        self.persist_active_profile();
        self.persist_backup();
    }

    #[must_use]
    pub const fn state(&self) -> &SettingsState {
        &self.state
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn profiles(&self) -> &ProfileCatalog {
        &self.profiles
    }

    #[must_use]
    pub const fn switch_policy(&self) -> SwitchPolicy {
        self.switch_policy
    }

    #[must_use]
    pub const fn backup(&self) -> Option<&Snapshot> {
        self.backup.as_ref()
    }

    #[must_use]
    pub const fn sink(&self) -> &E {
        &self.sink
    }

    #[must_use]
    pub const fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    /// Write several feature values and commit them as one change.
    pub(crate) fn write_values(
        &mut self,
        values: impl IntoIterator<Item = (&'static str, FeatureValue)>,
    ) {
        let mut changed: Vec<&'static str> = Vec::new();
        for (key, value) in values {
            let Some(feature) = self.registry.get(key).copied() else {
                log::warn!("ignoring value for unknown feature `{key}`");
                continue;
            };
            match feature.coerce(value) {
                Ok(value) => {
                    self.state.put(feature.key, value);
                    changed.push(feature.key);
                }
                Err(err) => log::warn!("ignoring value: {err}"),
            }
        }
        self.commit(&changed);
    }

    /// Capture the current values unless a backup already exists.
    pub(crate) fn ensure_backup(&mut self) {
        if self.backup.is_some() {
            return;
        }
        self.backup = Some(self.state.snapshot());
        self.persist_backup();
    }

    pub(crate) fn take_backup(&mut self) -> Option<Snapshot> {
        let backup = self.backup.take();
        self.store.remove(KEY_PROFILE_BACKUP);
        backup
    }

    pub(crate) fn set_active_profile(&mut self, profile: Option<&'static str>) {
        self.state.active_profile = profile;
        self.persist_active_profile();
    }

    fn value_of(&self, feature: &Feature) -> FeatureValue {
        self.state
            .value(feature.key)
            .unwrap_or_else(|| feature.default_value())
    }

    fn persist_active_profile(&mut self) {
        match self.state.active_profile {
            Some(id) => self.store.set(KEY_ACTIVE_PROFILE, id),
            None => self.store.remove(KEY_ACTIVE_PROFILE),
        }
    }

    fn persist_backup(&mut self) {
        let Some(backup) = self.backup.as_ref() else {
            self.store.remove(KEY_PROFILE_BACKUP);
            return;
        };
        match backup.to_json() {
            Ok(json) => self.store.set(KEY_PROFILE_BACKUP, &json),
            Err(err) => log::warn!("profile backup not persisted: {err}"),
        }
    }

    /// Effect applier: enforce couplings, persist, emit.
    fn commit(&mut self, changed: &[&'static str]) {
        let forced = enforce_couplings(&self.registry, &mut self.state);
        for key in changed.iter().chain(forced.iter()) {
            let Some(feature) = self.registry.get(key) else {
                continue;
            };
            let value = self
                .state
                .value(feature.key)
                .unwrap_or_else(|| feature.default_value());
            self.store.set(&feature.storage_key(), &feature.encode(value));
        }
        let effects = EffectSet::compute(&self.registry, &self.state);
        self.sink.apply(&effects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PAUSE_ROTATION, REDUCE_MOTION};
    use crate::effects::{Effect, RecordingSink};
    use crate::store::MemoryStore;

    fn engine(memory: &MemoryStore) -> PreferenceEngine<MemoryStore, RecordingSink> {
        PreferenceEngine::new(
            Registry::standard(),
            ProfileCatalog::standard(),
            memory.clone(),
            RecordingSink::new(),
        )
    }

    #[test]
    fn fresh_load_hydrates_defaults() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory);
        engine.hydrate();
        let registry = Registry::standard();
        assert!(engine.state().features_at_default(&registry));
        assert_eq!(engine.state().panel_side, PanelSide::Right);
        assert!(!engine.state().speech_enabled);
        assert!(engine.backup().is_none());
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let memory = MemoryStore::with_entries([
            ("a11y.zoom", "7"),
            ("a11y.big-cursor", "yes"),
            ("a11y.font-sizing", "2"),
            ("a11y.panel-side", "top"),
            ("a11y.speech-rate", "fast"),
            ("a11y.active-profile", "astronaut"),
            ("a11y.profile-backup", "{not json"),
        ]);
        let mut engine = engine(&memory);
        engine.hydrate();
        assert_eq!(engine.state().level("zoom"), 0);
        assert!(!engine.state().is_on("big-cursor"));
        assert_eq!(engine.state().level("font-sizing"), 2);
        assert_eq!(engine.state().panel_side, PanelSide::Right);
        assert_eq!(engine.state().speech_rate, SpeechRate::Fast);
        assert!(engine.state().active_profile.is_none());
        assert!(engine.backup().is_none());
    }

    #[test]
    fn set_persists_and_emits() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory);
        assert_eq!(
            engine.set("zoom", FeatureValue::Level(9)),
            Ok(FeatureValue::Level(3))
        );
        assert_eq!(memory.read("a11y.zoom").as_deref(), Some("3"));
        assert_eq!(engine.sink().emissions(), 1);
        let last = engine.sink().last().unwrap();
        assert_eq!(last.active_classes(), vec!["a11y-zoom-3".to_string()]);
        assert_eq!(
            engine.set("nope", FeatureValue::Toggle(true)),
            Err(PreferenceError::UnknownFeature("nope".into()))
        );
    }

    #[test]
    fn cycle_level_wraps_through_every_level() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory);
        let seen: Vec<u8> = (0..4).map(|_| engine.cycle_level("zoom").unwrap()).collect();
        assert_eq!(seen, vec![1, 2, 3, 0]);
        assert!(engine.cycle_level("big-cursor").is_err());
    }

    #[test]
    fn coupling_is_written_back_and_survives_reload() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory);
        engine.toggle(REDUCE_MOTION).unwrap();
        assert!(engine.state().is_on(PAUSE_ROTATION));
        assert_eq!(memory.read("a11y.pause-rotation").as_deref(), Some("true"));

        // Turning the forced feature off is overridden while the source is on.
        assert!(engine.toggle(PAUSE_ROTATION).unwrap());

        let mut reloaded = self::engine(&memory);
        reloaded.hydrate();
        reloaded.apply_all();
        let effects = reloaded.sink().last().unwrap();
        assert_eq!(
            effects.get("a11y-pause-rotation"),
            Some(&Effect::Flag {
                name: "a11y-pause-rotation",
                on: true,
            })
        );
    }

    #[test]
    fn swatch_selection_toggles() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory);
        assert_eq!(engine.select_swatch("text-color", 2), Ok(Some(2)));
        assert_eq!(memory.read("a11y.text-color").as_deref(), Some("#e76f51"));
        assert_eq!(engine.select_swatch("text-color", 2), Ok(None));
        assert_eq!(memory.read("a11y.text-color").as_deref(), Some(""));
        assert!(engine.select_swatch("text-color", 99).is_err());
    }

    #[test]
    fn reset_clears_every_key() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory);
        engine.toggle("big-cursor").unwrap();
        engine.toggle_panel_side();
        engine.set_speech_enabled(true);
        engine.set_speech_rate(SpeechRate::Slow);
        engine.ensure_backup();
        engine.set_active_profile(Some("motor"));
        assert!(!memory.is_empty());

        engine.reset();
        assert!(memory.is_empty(), "left behind: {:?}", memory.keys());
        assert!(engine.state().features_at_default(engine.registry()));
        assert!(engine.state().active_profile.is_none());
        assert!(engine.backup().is_none());
        assert_eq!(engine.sink().panel_side(), Some(PanelSide::Right));
    }
}

//! Profiles: named bundles of forced feature values.
//!
//! At most one profile is active. The first activation captures a snapshot
//! of every feature; deactivation restores it in full.
use serde::{Deserialize, Serialize};

use crate::constants::REDUCE_MOTION;
use crate::effects::EffectSink;
use crate::engine::PreferenceEngine;
use crate::error::PreferenceError;
use crate::settings::FeatureValue;
use crate::store::KeyValueStore;

const ON: FeatureValue = FeatureValue::Toggle(true);

/// Static profile descriptor. Only values that differ from defaults are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub id: &'static str,
    pub label: &'static str,
    pub overrides: &'static [(&'static str, FeatureValue)],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: Vec<Profile>,
}

impl ProfileCatalog {
    #[must_use]
    pub const fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Profile {
                id: "motor",
                label: "Motor Impaired",
                overrides: &[("keyboard-nav", ON), ("highlight-focus", ON)],
            },
            Profile {
                id: "blind",
                label: "Blind",
                overrides: &[("keyboard-nav", ON), ("font-sizing", FeatureValue::Level(3))],
            },
            Profile {
                id: "colorblind",
                label: "Color Blind",
                overrides: &[("invert-colors", ON)],
            },
            Profile {
                id: "dyslexia",
                label: "Dyslexia",
                overrides: &[("dyslexic-font", ON), ("letter-spacing", FeatureValue::Level(2))],
            },
            Profile {
                id: "visual",
                label: "Visually-Impaired",
                overrides: &[
                    ("big-cursor", ON),
                    ("highlight-focus", ON),
                    ("font-sizing", FeatureValue::Level(2)),
                ],
            },
            Profile {
                id: "cognitive",
                label: "Cognitive & Learning",
                overrides: &[("highlight-focus", ON), ("reading-mode", ON)],
            },
            Profile {
                id: "seizure",
                label: "Seizure & Epileptic",
                overrides: &[(REDUCE_MOTION, ON)],
            },
            Profile {
                id: "adhd",
                label: "ADHD",
                overrides: &[
                    (REDUCE_MOTION, ON),
                    ("highlight-focus", ON),
                    ("reading-mode", ON),
                ],
            },
        ])
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// Look up a profile, reporting unknown ids as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if no profile has the given id.
    pub fn require(&self, id: &str) -> Result<&Profile, PreferenceError> {
        self.get(id)
            .ok_or_else(|| PreferenceError::UnknownProfile(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// How a second activation resolves while another profile is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchPolicy {
    /// Apply the new profile on top of whatever the previous one left.
    #[default]
    Stack,
    /// Restore the pre-profile snapshot, then apply the new profile.
    RestoreThenApply,
}

/// Where deactivation took its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    Snapshot,
    Defaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTransition {
    Activated(&'static str),
    Switched {
        from: &'static str,
        to: &'static str,
    },
    Deactivated {
        id: &'static str,
        restored: RestoreSource,
    },
    Unchanged,
}

impl<S, E> PreferenceEngine<S, E>
where
    S: KeyValueStore,
    E: EffectSink,
{
    /// Activate profile `id`, capturing the baseline snapshot if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown.
    pub fn activate_profile(&mut self, id: &str) -> Result<ProfileTransition, PreferenceError> {
        let profile = *self.profiles().require(id)?;
        let previous = self.state().active_profile;
        if previous == Some(profile.id) {
            return Ok(ProfileTransition::Unchanged);
        }

        self.ensure_backup();
        let overrides = profile.overrides.iter().copied();
        match (previous, self.switch_policy(), self.backup().cloned()) {
            (Some(_), SwitchPolicy::RestoreThenApply, Some(base)) => {
                let restored: Vec<_> = self
                    .registry()
                    .iter()
                    .map(|feature| (feature.key, base.value_for(feature)))
                    .collect();
                self.write_values(restored.into_iter().chain(overrides));
            }
            _ => self.write_values(overrides),
        }
        self.set_active_profile(Some(profile.id));

        Ok(match previous {
            Some(from) => {
                log::debug!("profile switched {from} -> {}", profile.id);
                ProfileTransition::Switched {
                    from,
                    to: profile.id,
                }
            }
            None => {
                log::debug!("profile {} activated", profile.id);
                ProfileTransition::Activated(profile.id)
            }
        })
    }

    /// Deactivate profile `id`, restoring the snapshot (or defaults if the
    /// snapshot has gone missing).
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown.
    pub fn deactivate_profile(&mut self, id: &str) -> Result<ProfileTransition, PreferenceError> {
        let profile = *self.profiles().require(id)?;
        if self.state().active_profile != Some(profile.id) {
            return Ok(ProfileTransition::Unchanged);
        }

        let (restored, source) = match self.take_backup() {
            Some(base) => (
                self.registry()
                    .iter()
                    .map(|feature| (feature.key, base.value_for(feature)))
                    .collect::<Vec<_>>(),
                RestoreSource::Snapshot,
            ),
            None => {
                log::warn!("profile backup missing; resetting features to defaults");
                (
                    self.registry()
                        .iter()
                        .map(|feature| (feature.key, feature.default_value()))
                        .collect(),
                    RestoreSource::Defaults,
                )
            }
        };
        self.write_values(restored);
        self.set_active_profile(None);
        log::debug!("profile {} deactivated ({source:?})", profile.id);
        Ok(ProfileTransition::Deactivated {
            id: profile.id,
            restored: source,
        })
    }

    /// Profile control behaviour: deactivate when active, activate otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown.
    pub fn toggle_profile(&mut self, id: &str) -> Result<ProfileTransition, PreferenceError> {
        if self.state().active_profile == Some(id) {
            self.deactivate_profile(id)
        } else {
            self.activate_profile(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::RecordingSink;
    use crate::registry::Registry;
    use crate::store::MemoryStore;

    fn engine(
        memory: &MemoryStore,
        policy: SwitchPolicy,
    ) -> PreferenceEngine<MemoryStore, RecordingSink> {
        PreferenceEngine::new(
            Registry::standard(),
            ProfileCatalog::standard(),
            memory.clone(),
            RecordingSink::new(),
        )
        .with_switch_policy(policy)
    }

    #[test]
    fn catalog_only_names_registered_features() {
        let registry = Registry::standard();
        for profile in ProfileCatalog::standard().iter() {
            for (key, value) in profile.overrides {
                let feature = registry.get(key).unwrap_or_else(|| panic!("{key} missing"));
                assert_eq!(feature.coerce(*value), Ok(*value));
                assert_ne!(*value, feature.default_value());
            }
        }
    }

    #[test]
    fn activation_overlays_and_deactivation_restores() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory, SwitchPolicy::default());
        engine.cycle_level("zoom").unwrap();
        let before = engine.state().snapshot();

        assert_eq!(
            engine.activate_profile("visual"),
            Ok(ProfileTransition::Activated("visual"))
        );
        assert!(engine.state().is_on("big-cursor"));
        assert_eq!(engine.state().level("font-sizing"), 2);
        assert_eq!(engine.state().level("zoom"), 1, "untouched keys survive");
        assert!(memory.read("a11y.profile-backup").is_some());
        assert_eq!(memory.read("a11y.active-profile").as_deref(), Some("visual"));

        assert_eq!(
            engine.toggle_profile("visual"),
            Ok(ProfileTransition::Deactivated {
                id: "visual",
                restored: RestoreSource::Snapshot,
            })
        );
        assert_eq!(engine.state().snapshot(), before);
        assert!(engine.backup().is_none());
        assert!(memory.read("a11y.profile-backup").is_none());
        assert!(memory.read("a11y.active-profile").is_none());
    }

    #[test]
    fn restore_then_apply_switch_is_order_independent() {
        let memory_a = MemoryStore::new();
        let mut a = engine(&memory_a, SwitchPolicy::RestoreThenApply);
        a.activate_profile("blind").unwrap();
        a.activate_profile("dyslexia").unwrap();

        let memory_b = MemoryStore::new();
        let mut b = engine(&memory_b, SwitchPolicy::RestoreThenApply);
        b.activate_profile("dyslexia").unwrap();

        assert_eq!(a.state().snapshot(), b.state().snapshot());
        assert!(!a.state().is_on("keyboard-nav"));
    }

    #[test]
    fn default_switch_stacks_on_previous_overlay() {
        assert_eq!(SwitchPolicy::default(), SwitchPolicy::Stack);
        let memory = MemoryStore::new();
        let mut engine = engine(&memory, SwitchPolicy::default());
        engine.activate_profile("blind").unwrap();
        assert_eq!(
            engine.activate_profile("dyslexia"),
            Ok(ProfileTransition::Switched {
                from: "blind",
                to: "dyslexia",
            })
        );
        assert!(engine.state().is_on("keyboard-nav"));
        assert!(engine.state().is_on("dyslexic-font"));
        assert_eq!(engine.state().level("font-sizing"), 3);
    }

    #[test]
    fn missing_backup_falls_back_to_defaults() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory, SwitchPolicy::default());
        engine.toggle("hide-images").unwrap();
        engine.activate_profile("motor").unwrap();

        // The backup vanishes from storage while the profile stays selected.
        memory.delete("a11y.profile-backup");
        engine.hydrate();
        assert_eq!(engine.state().active_profile, Some("motor"));
        assert!(engine.backup().is_none());

        assert_eq!(
            engine.deactivate_profile("motor"),
            Ok(ProfileTransition::Deactivated {
                id: "motor",
                restored: RestoreSource::Defaults,
            })
        );
        assert!(engine.state().features_at_default(engine.registry()));
        assert!(engine.state().active_profile.is_none());
    }

    #[test]
    fn inactive_and_unknown_profiles() {
        let memory = MemoryStore::new();
        let mut engine = engine(&memory, SwitchPolicy::default());
        assert_eq!(
            engine.deactivate_profile("adhd"),
            Ok(ProfileTransition::Unchanged)
        );
        assert_eq!(
            engine.activate_profile("pirate"),
            Err(PreferenceError::UnknownProfile("pirate".into()))
        );
        engine.activate_profile("adhd").unwrap();
        assert_eq!(
            engine.activate_profile("adhd"),
            Ok(ProfileTransition::Unchanged)
        );
    }
}

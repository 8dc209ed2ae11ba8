use ally_engine::{
    EffectSet, FeatureKind, FeatureValue, MemoryStore, PreferenceEngine, ProfileCatalog,
    ProfileTransition, RecordingSink, Registry, RestoreSource, SwitchPolicy,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

type Engine = PreferenceEngine<MemoryStore, RecordingSink>;

const SEEDS: [u64; 6] = [1, 7, 42, 0x5eed, 0x0a11_0000, 9_001];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine_over(memory: &MemoryStore) -> Engine {
    let mut engine = PreferenceEngine::new(
        Registry::standard(),
        ProfileCatalog::standard(),
        memory.clone(),
        RecordingSink::new(),
    );
    engine.hydrate();
    engine.apply_all();
    engine
}

fn randomize(engine: &mut Engine, rng: &mut ChaCha20Rng) {
    let features: Vec<_> = engine.registry().iter().copied().collect();
    for feature in features {
        let value = match feature.kind {
            FeatureKind::Toggle => FeatureValue::Toggle(rng.gen_bool(0.5)),
            FeatureKind::Leveled { max_level } => FeatureValue::Level(rng.gen_range(0..=max_level)),
            FeatureKind::Palette { swatches } => {
                let pick = rng.gen_range(0..=swatches.len());
                FeatureValue::Swatch((pick < swatches.len()).then(|| pick as u8))
            }
        };
        engine.set(feature.key, value).expect("registered feature");
    }
}

#[test]
fn fresh_load_has_defaults_and_no_active_effects() {
    init_logging();
    let memory = MemoryStore::new();
    let engine = engine_over(&memory);
    assert!(engine.state().features_at_default(engine.registry()));
    assert!(engine.state().active_profile.is_none());
    let effects = engine.sink().last().expect("boot emits once");
    assert!(effects.active_classes().is_empty());
    assert!(memory.is_empty(), "booting writes nothing");
}

#[test]
fn reload_reproduces_state_and_effects() {
    init_logging();
    for seed in SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let memory = MemoryStore::new();
        let mut engine = engine_over(&memory);
        randomize(&mut engine, &mut rng);
        let expected = engine.state().snapshot();

        let reloaded = engine_over(&memory);
        assert_eq!(reloaded.state().snapshot(), expected, "seed {seed}");
        assert_eq!(
            reloaded.sink().last(),
            Some(EffectSet::compute(reloaded.registry(), reloaded.state())),
            "seed {seed}"
        );
    }
}

#[test]
fn reduce_motion_always_implies_pause_rotation() {
    init_logging();
    for seed in SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let memory = MemoryStore::new();
        let mut engine = engine_over(&memory);
        randomize(&mut engine, &mut rng);
        engine.set("reduce-motion", FeatureValue::Toggle(true)).unwrap();
        assert!(engine.state().is_on("pause-rotation"));
        assert_eq!(memory.read("a11y.pause-rotation").as_deref(), Some("true"));

        engine.set("pause-rotation", FeatureValue::Toggle(false)).unwrap();
        assert!(engine.state().is_on("pause-rotation"), "coupling wins");
    }
}

#[test]
fn every_profile_round_trips_any_starting_state() {
    init_logging();
    let ids: Vec<_> = ProfileCatalog::standard().iter().map(|p| p.id).collect();
    for seed in SEEDS {
        for id in &ids {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let memory = MemoryStore::new();
            let mut engine = engine_over(&memory);
            randomize(&mut engine, &mut rng);
            let before = engine.state().snapshot();

            engine.toggle_profile(id).unwrap();
            // A reload between activation and deactivation must not lose the
            // baseline.
            let mut engine = engine_over(&memory);
            assert_eq!(engine.state().active_profile, Some(*id));
            assert_eq!(
                engine.toggle_profile(id),
                Ok(ProfileTransition::Deactivated {
                    id: *id,
                    restored: RestoreSource::Snapshot,
                })
            );
            assert_eq!(engine.state().snapshot(), before, "seed {seed}, profile {id}");
        }
    }
}

#[test]
fn switching_never_overwrites_the_baseline() {
    init_logging();
    let ids: Vec<_> = ProfileCatalog::standard().iter().map(|p| p.id).collect();
    for policy in [SwitchPolicy::RestoreThenApply, SwitchPolicy::Stack] {
        for seed in SEEDS {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let memory = MemoryStore::new();
            let mut engine = engine_over(&memory).with_switch_policy(policy);
            randomize(&mut engine, &mut rng);
            let before = engine.state().snapshot();

            let first = ids[rng.gen_range(0..ids.len())];
            let second = ids[rng.gen_range(0..ids.len())];
            engine.activate_profile(first).unwrap();
            engine.activate_profile(second).unwrap();
            assert_eq!(engine.backup(), Some(&before), "{policy:?} seed {seed}");

            engine.deactivate_profile(second).unwrap();
            assert_eq!(engine.state().snapshot(), before, "{policy:?} seed {seed}");
        }
    }
}

#[test]
fn reset_clears_every_persisted_key() {
    init_logging();
    for seed in SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let memory = MemoryStore::new();
        let mut engine = engine_over(&memory);
        randomize(&mut engine, &mut rng);
        engine.activate_profile("adhd").unwrap();
        engine.toggle_panel_side();
        engine.set_speech_enabled(true);

        engine.reset();
        assert!(memory.is_empty(), "seed {seed}: {:?}", memory.keys());
        assert!(engine.state().features_at_default(engine.registry()));
        assert!(engine.sink().last().unwrap().active_classes().is_empty());
    }
}

#[test]
fn level_cycle_wraps_for_every_leveled_feature() {
    init_logging();
    let memory = MemoryStore::new();
    let mut engine = engine_over(&memory);
    let leveled: Vec<_> = engine
        .registry()
        .iter()
        .filter_map(|f| f.max_level().map(|max| (f.key, max)))
        .collect();
    for (key, max) in leveled {
        let seen: Vec<u8> = (0..=max).map(|_| engine.cycle_level(key).unwrap()).collect();
        let mut expected: Vec<u8> = (1..=max).collect();
        expected.push(0);
        assert_eq!(seen, expected, "{key}");
    }
}

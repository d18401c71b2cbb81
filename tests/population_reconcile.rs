use rand::SeedableRng;
use rand::rngs::SmallRng;

use chimefield::core::harmony::HarmonyFamily;
use chimefield::core::palette::resolve;
use chimefield::life::agent::saturation_for;
use chimefield::life::population::{Population, ReconcileConfig, ReconcileSummary};
use chimefield::life::tier::PerformanceTier;

fn config(density: usize) -> ReconcileConfig {
    ReconcileConfig {
        density,
        harmony: HarmonyFamily::MajorPentatonic,
        range: 2,
        filter_frequency: 750.0,
        speed_factor: 1.0,
        sound_enabled: true,
        tier: PerformanceTier::Reduced,
    }
}

fn population(seed: u64) -> Population {
    Population::with_rng(500.0, PerformanceTier::Reduced, SmallRng::seed_from_u64(seed))
}

fn ids(pop: &Population) -> Vec<u64> {
    pop.agents().iter().map(|a| a.id()).collect()
}

#[test]
fn growing_keeps_existing_agents() {
    let mut pop = population(1);
    pop.reconcile(&config(5));
    let before = ids(&pop);
    let positions: Vec<_> = pop.agents().iter().map(|a| a.position()).collect();

    let summary = pop.reconcile(&config(8));
    assert_eq!(summary, ReconcileSummary { removed: 0, added: 3 });
    assert_eq!(pop.len(), 8);
    assert_eq!(&ids(&pop)[..5], &before[..]);
    // survivors are updated in place, not respawned
    for (agent, pos) in pop.agents().iter().zip(positions) {
        assert_eq!(agent.position(), pos);
    }
}

#[test]
fn shrinking_keeps_the_head_of_the_list() {
    let mut pop = population(2);
    pop.reconcile(&config(8));
    let before = ids(&pop);
    let summary = pop.reconcile(&config(2));
    assert_eq!(summary, ReconcileSummary { removed: 6, added: 0 });
    assert_eq!(ids(&pop), before[..2].to_vec());
}

#[test]
fn same_note_pool_only_recolours() {
    let mut pop = population(3);
    pop.reconcile(&config(6));
    let notes: Vec<_> = pop.agents().iter().map(|a| (a.note(), a.diameter())).collect();

    // filter only moves the light; the note pool is content-equal
    let mut cfg = config(6);
    cfg.filter_frequency = 5_000.0;
    pop.reconcile(&cfg);
    let expected_light = resolve(cfg.harmony, cfg.range, cfg.filter_frequency)
        .color_palette
        .light;
    for (agent, (note, diameter)) in pop.agents().iter().zip(notes.iter()) {
        assert_eq!(agent.note(), *note);
        assert_eq!(agent.diameter(), *diameter);
        assert_eq!(agent.default_light(), expected_light);
        assert_eq!(agent.current_light(), expected_light);
        assert_eq!(agent.saturation(), saturation_for(agent.note_velocity()));
    }

    pop.reconcile(&cfg);
    for (agent, (note, _)) in pop.agents().iter().zip(notes.iter()) {
        assert_eq!(agent.note(), *note);
    }
}

#[test]
fn new_note_pool_redraws_notes_from_it() {
    let mut pop = population(4);
    pop.reconcile(&config(7));
    let mut cfg = config(7);
    cfg.harmony = HarmonyFamily::StackedFourths;
    cfg.range = 6;
    pop.reconcile(&cfg);
    let pool = resolve(cfg.harmony, cfg.range, cfg.filter_frequency).possible_notes;
    for agent in pop.agents() {
        assert!(pool.contains(&agent.note()));
        assert_eq!(agent.possible_notes(), &pool[..]);
    }
}

#[test]
fn speed_and_sound_apply_to_survivors() {
    let mut pop = population(5);
    pop.reconcile(&config(3));
    let mut cfg = config(3);
    cfg.speed_factor = 10.0;
    cfg.sound_enabled = false;
    pop.reconcile(&cfg);
    for agent in pop.agents() {
        assert!(!agent.sound_enabled());
        assert_eq!(agent.speed_factor(), 10.0);
        let (sx, sy) = agent.speed();
        assert!((10.0..12.0).contains(&sx));
        assert!((10.0..12.0).contains(&sy));
    }
}

#[test]
fn hues_stay_near_the_family_base() {
    let mut pop = population(6);
    let mut cfg = config(9);
    cfg.harmony = HarmonyFamily::Octatonic;
    pop.reconcile(&cfg);
    let base = cfg.harmony.base_palette();
    for agent in pop.agents() {
        let hue = agent.hue();
        assert!(hue >= (base.hue - base.color_variance / 2.0).floor());
        assert!(hue < base.hue + base.color_variance / 2.0);
    }
}

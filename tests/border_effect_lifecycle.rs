use rand::SeedableRng;
use rand::rngs::SmallRng;

use chimefield::core::harmony::HarmonyFamily;
use chimefield::core::palette::resolve;
use chimefield::life::agent::{Agent, AgentSeed};
use chimefield::life::border_effect::{ALPHA_STEP, Axis, BorderEffect, EffectSeed, START_ALPHA};
use chimefield::life::tier::PerformanceTier;
use chimefield::life::voice_pool::VoicePool;
use chimefield::render::RecordingSurface;

fn wall_hit(position: (f32, f32), axis: Axis, diameter: f32) -> EffectSeed {
    EffectSeed {
        position,
        axis,
        hit_high: false,
        border_length: 500.0,
        diameter,
        hue: 120.0,
        saturation: 95.0,
        light: 30.0,
    }
}

#[test]
fn alpha_drops_by_five_until_dead_on_41st_run() {
    let mut fx = BorderEffect::spawn(wall_hit((250.0, 10.0), Axis::Y, 30.0));
    let mut surface = RecordingSurface::new();
    assert_eq!(fx.color_alpha(), START_ALPHA);
    for run in 1..=41 {
        let before = fx.color_alpha();
        assert!(!fx.is_dead(), "dead before run {run}");
        fx.run(&mut surface);
        assert_eq!(fx.color_alpha(), before - ALPHA_STEP);
    }
    assert_eq!(fx.color_alpha(), -5);
    assert!(fx.is_dead());
}

#[test]
fn agent_prunes_effects_before_running_them() {
    let palette = resolve(HarmonyFamily::MajorPentatonic, 0, 750.0);
    let mut rng = SmallRng::seed_from_u64(21);
    let mut agent = Agent::spawn(
        AgentSeed {
            id: 0,
            border_length: 500.0,
            frame_rate: 30,
            speed_factor: 0.0,
            palette: &palette,
            sound_enabled: false,
            voice: VoicePool::handle_for(PerformanceTier::Reduced, 0),
        },
        &mut rng,
    );
    // a huge tick rate shrinks the per-tick step to a crawl, so no real
    // bounce happens during the test
    agent.set_speed_and_frame_rate(0.0, 30_000, &mut rng);
    let mut voices = VoicePool::muted();
    agent.border_event(Axis::X, true, &mut voices, &mut rng);
    assert_eq!(agent.border_effects().len(), 1);

    let mut surface = RecordingSurface::new();
    for tick in 1..=41 {
        agent.advance(&mut surface, &mut voices, &mut rng);
        assert_eq!(agent.border_effects().len(), 1, "tick {tick}");
        assert_eq!(
            agent.border_effects()[0].color_alpha(),
            START_ALPHA - ALPHA_STEP * tick
        );
    }
    // dead after its 41st run, but only dropped at the start of the next tick
    assert!(agent.border_effects()[0].is_dead());
    agent.advance(&mut surface, &mut voices, &mut rng);
    assert!(agent.border_effects().is_empty());
    assert_eq!(agent.border_event_count(), 1);
}

#[test]
fn two_wall_corner_hit_leaves_two_effects() {
    let fx_x = BorderEffect::spawn(wall_hit((2.0, 3.0), Axis::X, 20.0));
    let fx_y = BorderEffect::spawn(wall_hit((2.0, 3.0), Axis::Y, 20.0));
    assert_eq!(fx_x.position(), (0.0, 3.0));
    assert_eq!(fx_y.position(), (2.0, 0.0));
}

use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use chimefield::config::SketchConfig;
use chimefield::core::harmony::HarmonyFamily;
use chimefield::core::pitch::NoteName;
use chimefield::life::border_effect::Axis;
use chimefield::life::population::{Population, ReconcileConfig};
use chimefield::life::tier::PerformanceTier;
use chimefield::life::voice_pool::{
    FILTER_RAMP_SEC, MASTER_RAMP_SEC, MONO_POOL_SIZE, OutputGraph, SETUP_RAMP_SEC, SynthVoice,
    VoiceError, VoiceHandle, VoiceKind, VoicePool, WET_RAMP_SEC, trail_to_wet,
};
use chimefield::render::RecordingSurface;
use chimefield::sketch::Sketch;
use chimefield::synth::oscillator::Waveform;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Note(&'static str, NoteName),
    Waveform(&'static str, Waveform),
    Dispose(&'static str),
    Master(f32, f32),
    Filter(f32, f32),
    Wet(f32, f32),
}

type Log = Arc<Mutex<Vec<Call>>>;

struct Voice {
    name: &'static str,
    log: Log,
}

impl SynthVoice for Voice {
    fn trigger_note(&mut self, note: NoteName, _: f32, _: f32) -> Result<(), VoiceError> {
        self.log.lock().unwrap().push(Call::Note(self.name, note));
        Ok(())
    }

    fn set_waveform(&mut self, waveform: Waveform) -> Result<(), VoiceError> {
        self.log.lock().unwrap().push(Call::Waveform(self.name, waveform));
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.lock().unwrap().push(Call::Dispose(self.name));
    }
}

struct Graph {
    log: Log,
}

impl OutputGraph for Graph {
    fn ramp_master_gain(&mut self, to: f32, duration_sec: f32) -> Result<(), VoiceError> {
        self.log.lock().unwrap().push(Call::Master(to, duration_sec));
        Ok(())
    }

    fn ramp_filter_frequency(&mut self, to_hz: f32, duration_sec: f32) -> Result<(), VoiceError> {
        self.log.lock().unwrap().push(Call::Filter(to_hz, duration_sec));
        Ok(())
    }

    fn ramp_wet(&mut self, to: f32, duration_sec: f32) -> Result<(), VoiceError> {
        self.log.lock().unwrap().push(Call::Wet(to, duration_sec));
        Ok(())
    }
}

const MONO_NAMES: [&str; MONO_POOL_SIZE] = ["m0", "m1", "m2", "m3", "m4", "m5"];

fn recording_pool(log: &Log) -> VoicePool {
    VoicePool::new(
        Box::new(Voice {
            name: "poly",
            log: log.clone(),
        }),
        MONO_NAMES
            .iter()
            .map(|&name| {
                Box::new(Voice {
                    name,
                    log: log.clone(),
                }) as Box<dyn SynthVoice>
            })
            .collect(),
        Box::new(Graph { log: log.clone() }),
    )
}

fn take(log: &Log) -> Vec<Call> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn config(density: usize, tier: PerformanceTier) -> ReconcileConfig {
    ReconcileConfig {
        density,
        harmony: HarmonyFamily::MajorScale,
        range: 0,
        filter_frequency: 750.0,
        speed_factor: 1.0,
        sound_enabled: true,
        tier,
    }
}

#[test]
fn reduced_tier_round_robins_by_list_position() {
    let mut pop = Population::with_rng(500.0, PerformanceTier::Reduced, SmallRng::seed_from_u64(1));
    pop.reconcile(&config(7, PerformanceTier::Reduced));
    for (index, agent) in pop.agents().iter().enumerate() {
        assert_eq!(agent.voice().kind(), VoiceKind::Pooled);
        assert_eq!(agent.voice().slot(), index % MONO_POOL_SIZE);
    }
}

#[test]
fn high_fidelity_shares_the_polyphonic_voice() {
    let log: Log = Arc::default();
    let mut voices = recording_pool(&log);
    let mut pop =
        Population::with_rng(500.0, PerformanceTier::HighFidelity, SmallRng::seed_from_u64(2));
    pop.reconcile(&config(9, PerformanceTier::HighFidelity));
    assert!(pop.agents().iter().all(|a| a.voice() == VoiceHandle::POLYPHONIC));

    let mut rng = SmallRng::seed_from_u64(3);
    let mut agent = pop.agents()[4].clone();
    agent.border_event(Axis::X, false, &mut voices, &mut rng);
    assert_eq!(take(&log), vec![Call::Note("poly", agent.note())]);
}

#[test]
fn pooled_notes_reach_their_slot() {
    let log: Log = Arc::default();
    let mut voices = recording_pool(&log);
    let note: NoteName = "E4".parse().unwrap();
    for index in 0..8 {
        voices
            .trigger(VoicePool::handle_for(PerformanceTier::Reduced, index), note, 0.65, 0.5)
            .unwrap();
    }
    let slots: Vec<_> = take(&log)
        .into_iter()
        .map(|c| match c {
            Call::Note(name, _) => name,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(slots, ["m0", "m1", "m2", "m3", "m4", "m5", "m0", "m1"]);
}

#[test]
fn graph_ramps_use_fixed_durations() {
    let log: Log = Arc::default();
    let mut voices = recording_pool(&log);
    voices.set_volume(0.65);
    voices.set_filter_frequency(2_000.0);
    voices.set_trail(-36.0);
    voices.setup();
    assert_eq!(
        take(&log),
        vec![
            Call::Master(0.65, MASTER_RAMP_SEC),
            Call::Filter(2_000.0, FILTER_RAMP_SEC),
            Call::Wet(trail_to_wet(-36.0), WET_RAMP_SEC),
            Call::Master(1.0, SETUP_RAMP_SEC),
        ]
    );
    voices.set_waveform(Waveform::Pwm);
    let calls = take(&log);
    assert_eq!(calls.len(), MONO_POOL_SIZE + 1);
    assert!(calls.iter().all(|c| matches!(c, Call::Waveform(_, Waveform::Pwm))));
}

#[test]
fn teardown_is_terminal_only_with_dispose() {
    let log: Log = Arc::default();
    let mut voices = recording_pool(&log);
    let note: NoteName = "G3".parse().unwrap();

    voices.teardown(false);
    assert_eq!(take(&log), vec![Call::Master(0.0, MASTER_RAMP_SEC)]);
    assert!(voices.trigger(VoiceHandle::POLYPHONIC, note, 0.65, 0.5).is_ok());
    take(&log);

    voices.teardown(true);
    let calls = take(&log);
    assert_eq!(calls[0], Call::Master(0.0, MASTER_RAMP_SEC));
    assert_eq!(
        calls.iter().filter(|c| matches!(c, Call::Dispose(_))).count(),
        MONO_POOL_SIZE + 1
    );
    assert_eq!(
        voices.trigger(VoiceHandle::pooled(2), note, 0.65, 0.5),
        Err(VoiceError::Released)
    );
    voices.setup();
    assert!(take(&log).is_empty());
}

#[test]
fn sketch_forwards_only_changed_audio_settings() {
    let log: Log = Arc::default();
    let pop = Population::with_rng(500.0, PerformanceTier::Reduced, SmallRng::seed_from_u64(7));
    let mut sketch = Sketch::new(RecordingSurface::new(), pop, recording_pool(&log));

    let mut cfg = SketchConfig::default();
    sketch.apply(&cfg, PerformanceTier::Reduced, false);
    let first = take(&log);
    assert!(first.contains(&Call::Master(0.4, MASTER_RAMP_SEC)));
    assert!(first.contains(&Call::Filter(750.0, FILTER_RAMP_SEC)));
    assert!(first.contains(&Call::Wet(trail_to_wet(-55.0), WET_RAMP_SEC)));
    assert_eq!(sketch.population().len(), 3);

    cfg.volume = 0.65;
    cfg.density = 5.0;
    sketch.apply(&cfg, PerformanceTier::Reduced, false);
    assert_eq!(take(&log), vec![Call::Master(0.65, MASTER_RAMP_SEC)]);
    assert_eq!(sketch.population().len(), 5);

    // out of range values arrive clamped
    cfg.volume = 3.0;
    sketch.apply(&cfg, PerformanceTier::Reduced, false);
    assert_eq!(take(&log), vec![Call::Master(0.8, MASTER_RAMP_SEC)]);

    sketch.tick();
    let clears = sketch
        .surface()
        .ops
        .iter()
        .filter(|op| matches!(op, chimefield::render::SurfaceOp::Clear(a) if *a == 55.0))
        .count();
    assert_eq!(clears, 1);
}

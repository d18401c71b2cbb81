use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use chimefield::core::harmony::HarmonyFamily;
use chimefield::core::palette::{NotesAndColor, resolve};
use chimefield::core::pitch::NoteName;
use chimefield::life::agent::{
    Agent, AgentSeed, NOTE_CHANGE_INTERVAL, NOTE_DURATION_SEC, diameter_for,
};
use chimefield::life::border_effect::Axis;
use chimefield::life::tier::PerformanceTier;
use chimefield::life::voice_pool::{SilentVoice, SynthVoice, VoiceError, VoicePool};
use chimefield::synth::oscillator::Waveform;

type Log = Arc<Mutex<Vec<(NoteName, f32, f32)>>>;

struct RecordingVoice {
    log: Log,
    fail: Option<VoiceError>,
}

impl SynthVoice for RecordingVoice {
    fn trigger_note(
        &mut self,
        note: NoteName,
        duration_sec: f32,
        velocity: f32,
    ) -> Result<(), VoiceError> {
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        self.log.lock().unwrap().push((note, duration_sec, velocity));
        Ok(())
    }

    fn set_waveform(&mut self, _: Waveform) -> Result<(), VoiceError> {
        Ok(())
    }

    fn dispose(&mut self) {}
}

fn pool(log: &Log, fail: Option<VoiceError>) -> VoicePool {
    VoicePool::new(
        Box::new(RecordingVoice {
            log: log.clone(),
            fail,
        }),
        (0..6).map(|_| Box::new(SilentVoice) as Box<dyn SynthVoice>).collect(),
        Box::new(SilentVoice),
    )
}

fn agent(harmony: HarmonyFamily, range: u8, sound_enabled: bool, rng: &mut SmallRng) -> Agent {
    let palette = resolve(harmony, range, 750.0);
    Agent::spawn(
        AgentSeed {
            id: 7,
            border_length: 500.0,
            frame_rate: 60,
            speed_factor: 1.0,
            palette: &palette,
            sound_enabled,
            voice: VoicePool::handle_for(PerformanceTier::HighFidelity, 0),
        },
        rng,
    )
}

#[test]
fn only_every_seventh_event_changes_the_note() {
    let log: Log = Arc::default();
    let mut voices = pool(&log, None);
    let mut rng = SmallRng::seed_from_u64(42);
    let mut a = agent(HarmonyFamily::Chromatic, 6, false, &mut rng);

    for n in 1..=70u32 {
        let event = a.border_event(Axis::X, n % 2 == 0, &mut voices, &mut rng);
        assert_eq!(event.count, n);
        assert_eq!(
            event.note_changed,
            n % NOTE_CHANGE_INTERVAL == 0,
            "event {n}"
        );
        assert_eq!(a.diameter(), diameter_for(a.note().pitch_index(), 500.0));
    }
    assert_eq!(a.border_event_count(), 70);
}

#[test]
fn note_holds_between_reassignments() {
    let log: Log = Arc::default();
    let mut voices = pool(&log, None);
    let mut rng = SmallRng::seed_from_u64(3);
    let mut a = agent(HarmonyFamily::Chromatic, 6, false, &mut rng);
    let mut distinct_changes = 0;
    for block in 0..10 {
        let held = a.note();
        for _ in 0..NOTE_CHANGE_INTERVAL - 1 {
            a.border_event(Axis::Y, false, &mut voices, &mut rng);
            assert_eq!(a.note(), held, "block {block}");
        }
        a.border_event(Axis::Y, false, &mut voices, &mut rng);
        if a.note() != held {
            distinct_changes += 1;
        }
    }
    // 84 chromatic notes in range; a redraw repeating the note every time is
    // not plausible
    assert!(distinct_changes >= 5);
}

#[test]
fn sound_follows_the_toggle() {
    let log: Log = Arc::default();
    let mut voices = pool(&log, None);
    let mut rng = SmallRng::seed_from_u64(5);
    let mut a = agent(HarmonyFamily::MajorScale, 0, true, &mut rng);

    a.border_event(Axis::X, false, &mut voices, &mut rng);
    a.set_sound_enabled(false);
    a.border_event(Axis::X, true, &mut voices, &mut rng);
    a.set_sound_enabled(true);
    a.set_sound_enabled(true);
    a.border_event(Axis::Y, true, &mut voices, &mut rng);

    let played = log.lock().unwrap().clone();
    assert_eq!(played.len(), 2);
    for (note, duration, velocity) in played {
        assert_eq!(note, a.note());
        assert_eq!(duration, NOTE_DURATION_SEC);
        assert_eq!(velocity, a.note_velocity());
        assert!((0.3..0.7).contains(&velocity));
    }
}

#[test]
fn failing_voice_does_not_stop_the_agent() {
    let log: Log = Arc::default();
    let mut voices = pool(&log, Some(VoiceError::Busy));
    let mut rng = SmallRng::seed_from_u64(9);
    let mut a = agent(HarmonyFamily::Dorian, 2, true, &mut rng);
    for n in 1..=14 {
        let event = a.border_event(Axis::X, false, &mut voices, &mut rng);
        assert_eq!(event.count, n);
    }
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(a.border_effects().len(), 14);
}

#[test]
fn released_pool_is_silent_but_harmless() {
    let log: Log = Arc::default();
    let mut voices = pool(&log, None);
    let mut rng = SmallRng::seed_from_u64(10);
    let mut a = agent(HarmonyFamily::WholeTone, 1, true, &mut rng);
    voices.teardown(true);
    assert!(voices.is_released());
    a.border_event(Axis::X, false, &mut voices, &mut rng);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(a.border_event_count(), 1);
}

#[test]
fn empty_note_pool_never_leaves_an_agent_without_a_note() {
    let log: Log = Arc::default();
    let mut voices = pool(&log, None);
    let mut rng = SmallRng::seed_from_u64(11);
    let empty = NotesAndColor {
        possible_notes: vec![],
        color_palette: HarmonyFamily::Dorian.base_palette(),
    };
    let c4: NoteName = "C4".parse().unwrap();

    let mut a = Agent::spawn(
        AgentSeed {
            id: 3,
            border_length: 500.0,
            frame_rate: 30,
            speed_factor: 1.0,
            palette: &empty,
            sound_enabled: false,
            voice: VoicePool::handle_for(PerformanceTier::Reduced, 0),
        },
        &mut rng,
    );
    assert_eq!(a.note(), c4);
    assert_eq!(a.diameter(), diameter_for(48, 500.0));
    for _ in 0..NOTE_CHANGE_INTERVAL {
        a.border_event(Axis::X, false, &mut voices, &mut rng);
    }
    assert_eq!(a.note(), c4);

    // a real pool redraws, going back to an empty one keeps that note
    a.set_new_note_and_color_properties(&resolve(HarmonyFamily::Dorian, 2, 750.0), &mut rng);
    let held = a.note();
    let diameter = a.diameter();
    a.set_new_note_and_color_properties(&empty, &mut rng);
    assert!(a.possible_notes().is_empty());
    assert_eq!(a.note(), held);
    assert_eq!(a.diameter(), diameter);
    for _ in 0..NOTE_CHANGE_INTERVAL {
        a.border_event(Axis::Y, true, &mut voices, &mut rng);
    }
    assert_eq!(a.note(), held);
    assert_eq!(a.border_event_count(), 2 * NOTE_CHANGE_INTERVAL);
}

#[test]
fn content_equal_pool_in_another_order_keeps_the_note() {
    let mut rng = SmallRng::seed_from_u64(12);
    let mut a = agent(HarmonyFamily::Chromatic, 6, false, &mut rng);
    let (note, diameter) = (a.note(), a.diameter());
    let mut reversed = resolve(HarmonyFamily::Chromatic, 6, 750.0);
    reversed.possible_notes.reverse();
    for _ in 0..20 {
        a.set_new_note_and_color_properties(&reversed, &mut rng);
        assert_eq!(a.note(), note);
        assert_eq!(a.diameter(), diameter);
    }
}

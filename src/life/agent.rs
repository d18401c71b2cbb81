//! A single bouncing, sounding dot.
//!
//! Each tick the agent runs its wall effects, draws itself, reflects off the
//! walls it is about to cross (each reflection is a border event that may
//! play a note) and then moves. The canvas is assumed square.

use rand::Rng;
use tracing::{debug, warn};

use crate::core::color::Hsla;
use crate::core::palette::NotesAndColor;
use crate::core::pitch::NoteName;
use crate::life::border_effect::{Axis, BorderEffect, EffectSeed};
use crate::life::voice_pool::{VoiceHandle, VoicePool};
use crate::render::RenderSurface;

pub const NOTE_DURATION_SEC: f32 = 0.65;
/// Every this many border events the agent picks a new note.
pub const NOTE_CHANGE_INTERVAL: u32 = 7;
pub const BORDER_LIGHT_BOOST: f32 = 20.0;
pub const HUE_FLOOR: f32 = 5.0;
/// Variance divisor for the slow hue drift used when no base hue is given.
pub const HUE_DRIFT_DIVISOR: f32 = 50.0;
const REFERENCE_BORDER_LENGTH: f32 = 500.0;
const MIN_DIAMETER: f32 = 1.0;
const FALLBACK_NOTE: NoteName = match NoteName::new(0, 4) {
    Some(n) => n,
    None => panic!("C4 is a valid note"),
};

/// Dot size for a pitch: 70px at the bottom of the table down to ~10px at
/// the top on a 500px canvas, scaled with the canvas.
pub fn diameter_for(pitch_index: u16, border_length: f32) -> f32 {
    ((-0.46 * pitch_index as f32 + 70.0) * (border_length / REFERENCE_BORDER_LENGTH))
        .ceil()
        .max(MIN_DIAMETER)
}

/// Saturation derived from the note velocity. Not clamped here.
pub fn saturation_for(note_velocity: f32) -> f32 {
    (8.125 * note_velocity + 171.25).floor()
}

/// Per-axis speed for a speed factor at a tick rate.
pub fn random_speed<R: Rng + ?Sized>(speed_factor: f32, frame_rate: u32, rng: &mut R) -> f32 {
    (rng.random::<f32>() * 2.0 + speed_factor) * 30.0 / frame_rate.max(1) as f32
}

/// Content equality of two note pools, ignoring order.
pub fn same_note_pool(a: &[NoteName], b: &[NoteName]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

fn pick_note<R: Rng + ?Sized>(pool: &[NoteName], rng: &mut R) -> Option<NoteName> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[rng.random_range(0..pool.len())])
    }
}

/// What a single wall hit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderEvent {
    pub axis: Axis,
    /// Lifetime border events including this one.
    pub count: u32,
    pub note_changed: bool,
}

/// Creation parameters for a fresh agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentSeed<'a> {
    pub id: u64,
    pub border_length: f32,
    pub frame_rate: u32,
    pub speed_factor: f32,
    pub palette: &'a NotesAndColor,
    pub sound_enabled: bool,
    pub voice: VoiceHandle,
}

#[derive(Debug, Clone)]
pub struct Agent {
    id: u64,
    x: f32,
    y: f32,
    speed_x: f32,
    speed_y: f32,
    increasing_x: bool,
    increasing_y: bool,
    border_length: f32,
    speed_factor: f32,
    frame_rate: u32,
    diameter: f32,
    possible_notes: Vec<NoteName>,
    note: NoteName,
    note_velocity: f32,
    hue: f32,
    saturation: f32,
    color_variance: f32,
    default_light: f32,
    current_light: f32,
    border_event_count: u32,
    border_effects: Vec<BorderEffect>,
    voice: VoiceHandle,
    sound_enabled: bool,
}

impl Agent {
    pub fn spawn<R: Rng + ?Sized>(seed: AgentSeed<'_>, rng: &mut R) -> Self {
        let AgentSeed {
            id,
            border_length,
            frame_rate,
            speed_factor,
            palette,
            sound_enabled,
            voice,
        } = seed;
        let frame_rate = frame_rate.max(1);
        let note = pick_note(&palette.possible_notes, rng).unwrap_or_else(|| {
            warn!(agent = id, "empty note pool at spawn, falling back to {FALLBACK_NOTE}");
            FALLBACK_NOTE
        });
        let diameter = diameter_for(note.pitch_index(), border_length);
        // random in [0.3, 0.7), gives the chimes some depth
        let note_velocity = (rng.random::<f32>() * 4.0 + 3.0) / 10.0;
        let speed_scale = speed_factor * 30.0 / frame_rate as f32;

        let mut agent = Self {
            id,
            x: 0.0,
            y: 0.0,
            speed_x: rng.random::<f32>() * 2.0 + speed_scale,
            speed_y: rng.random::<f32>() * 2.0 + speed_scale,
            increasing_x: rng.random_bool(0.5),
            increasing_y: rng.random_bool(0.5),
            border_length,
            speed_factor,
            frame_rate,
            diameter,
            possible_notes: palette.possible_notes.clone(),
            note,
            note_velocity,
            hue: palette.color_palette.hue,
            saturation: saturation_for(note_velocity),
            color_variance: palette.color_palette.color_variance,
            default_light: palette.color_palette.light,
            current_light: palette.color_palette.light,
            border_event_count: 0,
            border_effects: Vec::new(),
            voice,
            sound_enabled,
        };
        let (lo, hi) = agent.bounds();
        agent.x = lo + rng.random::<f32>() * (hi - lo);
        agent.y = lo + rng.random::<f32>() * (hi - lo);
        agent.set_hue(Some(palette.color_palette.hue), rng);
        agent
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn speed(&self) -> (f32, f32) {
        (self.speed_x, self.speed_y)
    }

    pub fn direction(&self) -> (bool, bool) {
        (self.increasing_x, self.increasing_y)
    }

    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    pub fn radius(&self) -> f32 {
        self.diameter * 0.5
    }

    pub fn border_length(&self) -> f32 {
        self.border_length
    }

    pub fn note(&self) -> NoteName {
        self.note
    }

    pub fn possible_notes(&self) -> &[NoteName] {
        &self.possible_notes
    }

    pub fn note_velocity(&self) -> f32 {
        self.note_velocity
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn color_variance(&self) -> f32 {
        self.color_variance
    }

    pub fn default_light(&self) -> f32 {
        self.default_light
    }

    pub fn current_light(&self) -> f32 {
        self.current_light
    }

    pub fn border_event_count(&self) -> u32 {
        self.border_event_count
    }

    pub fn border_effects(&self) -> &[BorderEffect] {
        &self.border_effects
    }

    pub fn voice(&self) -> VoiceHandle {
        self.voice
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Allowed centre range on either axis. Degenerates to the midpoint when
    /// the dot is wider than the canvas.
    fn bounds(&self) -> (f32, f32) {
        let r = self.radius();
        let half = self.border_length * 0.5;
        (r.min(half), (self.border_length - r).max(half))
    }

    fn clamp_into_bounds(&mut self) {
        let (lo, hi) = self.bounds();
        self.x = self.x.clamp(lo, hi);
        self.y = self.y.clamp(lo, hi);
    }

    /// Relight step per tick; faster dots fade back quicker.
    pub fn delightening_speed(&self) -> f32 {
        ((0.11 * (self.speed_x + self.speed_y)) / 2.0 + 0.18) * 2.0
    }

    /// One tick. Returns the number of border events it produced.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        surface: &mut dyn RenderSurface,
        voices: &mut VoicePool,
        rng: &mut R,
    ) -> usize {
        self.run_border_effects(surface);
        let color = self.determine_color();
        surface.fill(color);
        surface.draw_ellipse(self.x, self.y, self.diameter);

        let mut events = 0;
        for axis in [Axis::X, Axis::Y] {
            if let Some(hit_high) = self.reflect(axis) {
                self.border_event(axis, hit_high, voices, rng);
                events += 1;
            }
        }
        self.apply_velocity();
        events
    }

    /// Drop dead effects, then run the survivors. An effect that went dead
    /// on its last run is never drawn again.
    fn run_border_effects(&mut self, surface: &mut dyn RenderSurface) {
        self.border_effects.retain(|fx| !fx.is_dead());
        for fx in self.border_effects.iter_mut() {
            fx.run(surface);
        }
    }

    fn determine_color(&mut self) -> Hsla {
        if self.current_light > self.default_light {
            self.current_light -= self.delightening_speed();
        }
        Hsla::new(self.hue, self.saturation, self.current_light, 1.0)
    }

    /// Flip the direction on `axis` if the next step would leave the bounds.
    /// Returns `Some(hit_high)` on a flip.
    fn reflect(&mut self, axis: Axis) -> Option<bool> {
        let (lo, hi) = self.bounds();
        let (pos, speed, increasing) = match axis {
            Axis::X => (self.x, self.speed_x, &mut self.increasing_x),
            Axis::Y => (self.y, self.speed_y, &mut self.increasing_y),
        };
        let will_increase = if *increasing {
            pos + speed <= hi
        } else {
            pos - speed < lo
        };
        if will_increase == *increasing {
            return None;
        }
        let hit_high = *increasing;
        *increasing = will_increase;
        Some(hit_high)
    }

    fn apply_velocity(&mut self) {
        self.x += if self.increasing_x {
            self.speed_x
        } else {
            -self.speed_x
        };
        self.y += if self.increasing_y {
            self.speed_y
        } else {
            -self.speed_y
        };
        self.clamp_into_bounds();
    }

    /// Wall hit on `axis`: leave an effect, brighten, maybe change note and
    /// play.
    pub fn border_event<R: Rng + ?Sized>(
        &mut self,
        axis: Axis,
        hit_high: bool,
        voices: &mut VoicePool,
        rng: &mut R,
    ) -> BorderEvent {
        self.border_effects.push(BorderEffect::spawn(EffectSeed {
            position: (self.x, self.y),
            axis,
            hit_high,
            border_length: self.border_length,
            diameter: self.diameter,
            hue: self.hue,
            saturation: self.saturation,
            light: (self.default_light - 10.0).max(10.0),
        }));
        self.border_event_count += 1;
        self.current_light += BORDER_LIGHT_BOOST;

        let count = self.border_event_count;
        let note_changed = count != 0 && count % NOTE_CHANGE_INTERVAL == 0;
        if note_changed {
            self.set_random_note(rng);
            debug!(agent = self.id, note = %self.note, count, "note changed");
        }
        if self.sound_enabled {
            self.play(voices);
        }
        BorderEvent {
            axis,
            count,
            note_changed,
        }
    }

    /// Fire-and-forget; a failing voice only costs this one note.
    pub fn play(&self, voices: &mut VoicePool) {
        if let Err(err) = voices.trigger(self.voice, self.note, NOTE_DURATION_SEC, self.note_velocity)
        {
            warn!(agent = self.id, note = %self.note, %err, "playback failed");
        }
    }

    /// With a base hue, re-roll around it using the full variance; without
    /// one, drift slightly around the current hue.
    pub fn set_hue<R: Rng + ?Sized>(&mut self, base_hue: Option<f32>, rng: &mut R) {
        let variance = match base_hue {
            Some(_) => self.color_variance,
            None => self.color_variance / HUE_DRIFT_DIVISOR,
        };
        let centre = base_hue.unwrap_or(self.hue);
        let random_hue = (centre + rng.random::<f32>() * variance - variance / 2.0).floor();
        self.hue = random_hue.max(HUE_FLOOR);
    }

    fn set_diameter(&mut self) {
        self.diameter = diameter_for(self.note.pitch_index(), self.border_length);
        self.clamp_into_bounds();
    }

    fn set_random_note<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(note) = pick_note(&self.possible_notes, rng) {
            self.note = note;
        }
        self.set_diameter();
        self.set_hue(None, rng);
    }

    pub fn set_sound_enabled(&mut self, sound_enabled: bool) {
        self.sound_enabled = sound_enabled;
    }

    /// Keep on-screen speed across tick-rate changes; re-roll both speeds
    /// when the speed factor itself changes. Directions are kept.
    pub fn set_speed_and_frame_rate<R: Rng + ?Sized>(
        &mut self,
        speed_factor: f32,
        frame_rate: u32,
        rng: &mut R,
    ) {
        let frame_rate = frame_rate.max(1);
        if frame_rate != self.frame_rate {
            let scale = self.frame_rate as f32 / frame_rate as f32;
            self.speed_x *= scale;
            self.speed_y *= scale;
            self.frame_rate = frame_rate;
        }
        if speed_factor != self.speed_factor {
            self.speed_factor = speed_factor;
            self.speed_x = random_speed(speed_factor, frame_rate, rng);
            self.speed_y = random_speed(speed_factor, frame_rate, rng);
        }
    }

    /// Swap voices only when moving between polyphonic and pooled.
    pub fn set_voice(&mut self, voice: VoiceHandle) {
        if voice.kind() == self.voice.kind() {
            return;
        }
        self.voice = voice;
    }

    pub fn set_new_note_and_color_properties<R: Rng + ?Sized>(
        &mut self,
        palette: &NotesAndColor,
        rng: &mut R,
    ) {
        if !same_note_pool(&self.possible_notes, &palette.possible_notes) {
            self.possible_notes = palette.possible_notes.clone();
            if let Some(note) = pick_note(&self.possible_notes, rng) {
                self.note = note;
            }
            self.set_diameter();
        }
        let colors = palette.color_palette;
        self.color_variance = colors.color_variance;
        self.saturation = saturation_for(self.note_velocity);
        self.default_light = colors.light;
        self.current_light = colors.light;
        self.set_hue(Some(colors.hue), rng);
    }
}

//! Audio-thread side of the voice pool: every pooled voice plus the shared
//! bus (reverb, low-pass, dynamics, master gain).

use tracing::debug;

use crate::audio::output_guard::{OutputGuard, OutputGuardMode, OutputGuardStats};
use crate::synth::events::{SynthCommand, VoiceSlot};
use crate::synth::filter::Lowpass24;
use crate::synth::oscillator::Waveform;
use crate::synth::ramp::LinearRamp;
use crate::synth::reverb::Reverb;
use crate::synth::util::db_to_gain;
use crate::synth::voice::ChimeVoice;

pub const MONO_VOICE_COUNT: usize = 6;
pub const POLY_VOICE_COUNT: usize = 32;
pub const MONO_VOLUME_DB: f32 = -4.5;
pub const DEFAULT_MASTER_GAIN: f32 = 0.4;
pub const DEFAULT_FILTER_HZ: f32 = 1_000.0;
pub const DEFAULT_WET: f32 = 0.5;
pub const REVERB_DECAY_SEC: f32 = 11.0;
const BUS_FILTER_Q: f32 = 0.707;
const BUS_FILTER_UPDATE_INTERVAL: usize = 64;

#[derive(Clone, Debug)]
pub struct SynthConfig {
    pub fs: f32,
    pub waveform: Waveform,
    pub guard: OutputGuardMode,
}

#[derive(Debug)]
struct Bank {
    voices: Vec<ChimeVoice>,
    disposed: bool,
}

impl Bank {
    fn new(count: usize, fs: f32, waveform: Waveform, gain: f32) -> Self {
        Self {
            voices: (0..count).map(|_| ChimeVoice::new(fs, waveform, gain)).collect(),
            disposed: false,
        }
    }

    /// A free voice, or the one that has been sounding longest.
    fn allocate(&mut self) -> Option<&mut ChimeVoice> {
        let idx = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, v)| v.age())
                    .map(|(i, _)| i)
            })?;
        self.voices.get_mut(idx)
    }
}

pub struct SynthEngine {
    cfg: SynthConfig,
    poly: Bank,
    mono: Vec<Bank>,
    reverb: Reverb,
    wet: LinearRamp,
    bus_filter: Lowpass24,
    cutoff: LinearRamp,
    guard: OutputGuard,
    master: LinearRamp,
    dry: Vec<f32>,
}

impl SynthEngine {
    pub fn new(cfg: SynthConfig) -> Self {
        let fs = cfg.fs;
        let mono_gain = db_to_gain(MONO_VOLUME_DB);
        Self {
            poly: Bank::new(POLY_VOICE_COUNT, fs, cfg.waveform, 1.0),
            mono: (0..MONO_VOICE_COUNT)
                .map(|_| Bank::new(1, fs, cfg.waveform, mono_gain))
                .collect(),
            reverb: Reverb::new(fs, REVERB_DECAY_SEC),
            wet: LinearRamp::new(DEFAULT_WET),
            bus_filter: Lowpass24::new(fs, DEFAULT_FILTER_HZ, BUS_FILTER_Q),
            cutoff: LinearRamp::new(DEFAULT_FILTER_HZ),
            guard: OutputGuard::new(cfg.guard, fs as u32),
            master: LinearRamp::new(DEFAULT_MASTER_GAIN),
            dry: Vec::new(),
            cfg,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.cfg.fs
    }

    pub fn master_gain(&self) -> f32 {
        self.master.value()
    }

    pub fn active_voices(&self) -> usize {
        self.banks().map(|b| b.voices.iter().filter(|v| v.is_active()).count()).sum()
    }

    /// Bus dynamics of the last rendered block.
    pub fn guard_stats(&self) -> OutputGuardStats {
        self.guard.stats()
    }

    fn banks(&self) -> impl Iterator<Item = &Bank> {
        std::iter::once(&self.poly).chain(self.mono.iter())
    }

    fn bank_mut(&mut self, slot: VoiceSlot) -> Option<&mut Bank> {
        match slot {
            VoiceSlot::Poly => Some(&mut self.poly),
            VoiceSlot::Mono(i) => self.mono.get_mut(i),
        }
    }

    pub fn handle(&mut self, cmd: SynthCommand) {
        let fs = self.cfg.fs;
        match cmd {
            SynthCommand::NoteOn {
                slot,
                freq_hz,
                duration_sec,
                velocity,
            } => {
                let Some(bank) = self.bank_mut(slot) else {
                    debug!(?slot, "note for unknown voice slot dropped");
                    return;
                };
                if bank.disposed {
                    return;
                }
                if let Some(voice) = bank.allocate() {
                    voice.note_on(freq_hz, duration_sec, velocity);
                }
            }
            SynthCommand::SetWaveform { slot, waveform } => {
                if let Some(bank) = self.bank_mut(slot) {
                    for v in bank.voices.iter_mut() {
                        v.set_waveform(waveform);
                    }
                }
            }
            SynthCommand::Dispose { slot } => {
                if let Some(bank) = self.bank_mut(slot) {
                    bank.disposed = true;
                    bank.voices.clear();
                }
            }
            SynthCommand::RampMasterGain { to, duration_sec } => {
                self.master.ramp_to(to.max(0.0), duration_sec, fs);
            }
            SynthCommand::RampFilterFrequency {
                to_hz,
                duration_sec,
            } => {
                self.cutoff.ramp_to(to_hz.max(10.0), duration_sec, fs);
            }
            SynthCommand::RampWet { to, duration_sec } => {
                self.wet.ramp_to(to.clamp(0.0, 1.0), duration_sec, fs);
            }
        }
    }

    /// Render one mono block, overwriting `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        let fs = self.cfg.fs;
        self.dry.clear();
        self.dry.resize(out.len(), 0.0);
        for v in self.poly.voices.iter_mut() {
            v.render_add(&mut self.dry);
        }
        for bank in self.mono.iter_mut() {
            for v in bank.voices.iter_mut() {
                v.render_add(&mut self.dry);
            }
        }
        for (i, (o, &x)) in out.iter_mut().zip(self.dry.iter()).enumerate() {
            let wet = self.wet.next_value();
            let mixed = x * (1.0 - wet) + self.reverb.process(x) * wet;
            let cutoff = self.cutoff.next_value();
            if i % BUS_FILTER_UPDATE_INTERVAL == 0 {
                self.bus_filter.set_cutoff(fs, cutoff, BUS_FILTER_Q);
            }
            *o = self.bus_filter.process(mixed);
        }
        self.guard.process(out);
        for o in out.iter_mut() {
            *o *= self.master.next_value();
        }
    }
}

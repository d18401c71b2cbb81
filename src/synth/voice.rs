use crate::synth::envelope::{Envelope, EnvelopeParams};
use crate::synth::filter::Lowpass24;
use crate::synth::oscillator::{Oscillator, Waveform};

const FILTER_BASE_HZ: f32 = 300.0;
const FILTER_OCTAVES: f32 = 4.0;
const FILTER_Q: f32 = 1.0;
/// Filter coefficients are refreshed every this many samples.
const FILTER_UPDATE_INTERVAL: u32 = 32;

/// One monophonic chime: oscillator, amplitude envelope and an
/// envelope-swept low-pass. A new note retriggers and cuts the old one.
#[derive(Debug, Clone)]
pub struct ChimeVoice {
    fs: f32,
    osc: Oscillator,
    amp_env: Envelope,
    filter_env: Envelope,
    filter: Lowpass24,
    freq_hz: f32,
    velocity: f32,
    hold_samples: u32,
    filter_countdown: u32,
    /// Samples since the last note-on; used to pick a voice to steal.
    age: u64,
    gain: f32,
}

impl ChimeVoice {
    pub fn new(fs: f32, waveform: Waveform, gain: f32) -> Self {
        Self {
            fs,
            osc: Oscillator::new(waveform),
            amp_env: Envelope::new(EnvelopeParams::AMP, fs),
            filter_env: Envelope::new(EnvelopeParams::FILTER, fs),
            filter: Lowpass24::new(fs, FILTER_BASE_HZ, FILTER_Q),
            freq_hz: 440.0,
            velocity: 0.0,
            hold_samples: 0,
            filter_countdown: 0,
            age: 0,
            gain,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.amp_env.is_idle()
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.osc.set_waveform(waveform);
    }

    /// Attack now, release after `duration_sec`.
    pub fn note_on(&mut self, freq_hz: f32, duration_sec: f32, velocity: f32) {
        if !freq_hz.is_finite() || freq_hz <= 0.0 {
            return;
        }
        if !self.is_active() {
            self.osc.reset();
            self.filter.reset();
        }
        self.freq_hz = freq_hz;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.hold_samples = (duration_sec.max(0.0) * self.fs) as u32;
        self.age = 0;
        self.filter_countdown = 0;
        self.amp_env.trigger();
        self.filter_env.trigger();
    }

    /// Mix this voice into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        for s in out.iter_mut() {
            if self.hold_samples > 0 {
                self.hold_samples -= 1;
                if self.hold_samples == 0 {
                    self.amp_env.release();
                    self.filter_env.release();
                }
            }
            let fenv = self.filter_env.next_level();
            if self.filter_countdown == 0 {
                let cutoff = FILTER_BASE_HZ * 2f32.powf(FILTER_OCTAVES * fenv);
                self.filter.set_cutoff(self.fs, cutoff, FILTER_Q);
                self.filter_countdown = FILTER_UPDATE_INTERVAL;
            }
            self.filter_countdown -= 1;
            let amp = self.amp_env.next_level();
            let x = self.osc.next_sample(self.freq_hz, self.fs);
            *s += self.filter.process(x) * amp * self.velocity * self.gain;
            self.age = self.age.saturating_add(1);
            if !self.is_active() {
                break;
            }
        }
    }
}

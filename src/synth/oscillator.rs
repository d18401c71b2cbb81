use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Oscillator shapes selectable for every pooled voice at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Pulse,
    Pwm,
    FmSawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 7] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
        Waveform::Pulse,
        Waveform::Pwm,
        Waveform::FmSawtooth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Square => "Square",
            Waveform::Sawtooth => "Sawtooth",
            Waveform::Triangle => "Triangle",
            Waveform::Pulse => "Pulse",
            Waveform::Pwm => "PWM",
            Waveform::FmSawtooth => "FM Sawtooth",
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Self::Square
    }
}

const PULSE_WIDTH: f32 = 0.2;
const PWM_RATE_HZ: f32 = 0.4;
const PWM_DEPTH: f32 = 0.4;
const FM_HARMONICITY: f32 = 1.0;
const FM_INDEX: f32 = 2.0;

/// Band-limited step correction around a discontinuity at phase 0.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[inline]
fn wrap01(x: f32) -> f32 {
    x - x.floor()
}

fn pulse(phase: f32, width: f32, dt: f32) -> f32 {
    let mut y = if phase < width { 1.0 } else { -1.0 };
    y += poly_blep(phase, dt);
    y -= poly_blep(wrap01(phase - width + 1.0), dt);
    y
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    mod_phase: f32,
    lfo_phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            mod_phase: 0.0,
            lfo_phase: 0.0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.mod_phase = 0.0;
    }

    pub fn next_sample(&mut self, freq_hz: f32, fs: f32) -> f32 {
        let dt = (freq_hz / fs).clamp(0.0, 0.5);
        let p = self.phase;
        let y = match self.waveform {
            Waveform::Sine => (TAU * p).sin(),
            Waveform::Square => pulse(p, 0.5, dt),
            Waveform::Sawtooth => 2.0 * p - 1.0 - poly_blep(p, dt),
            Waveform::Triangle => 4.0 * (p - 0.5).abs() - 1.0,
            Waveform::Pulse => pulse(p, PULSE_WIDTH, dt),
            Waveform::Pwm => {
                let width = 0.5 + PWM_DEPTH * (TAU * self.lfo_phase).sin();
                self.lfo_phase = wrap01(self.lfo_phase + PWM_RATE_HZ / fs);
                pulse(p, width, dt)
            }
            Waveform::FmSawtooth => {
                let m = (TAU * self.mod_phase).sin() * FM_INDEX / TAU;
                self.mod_phase = wrap01(self.mod_phase + dt * FM_HARMONICITY);
                let q = wrap01(p + m);
                2.0 * q - 1.0 - poly_blep(q, dt)
            }
        };
        self.phase = wrap01(p + dt);
        y
    }
}

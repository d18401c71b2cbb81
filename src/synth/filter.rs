use std::f32::consts::PI;

use crate::synth::util::flush_denorm;

/// RBJ low-pass biquad, transposed direct form II.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl Biquad {
    pub fn lowpass(fs: f32, cutoff_hz: f32, q: f32) -> Self {
        let mut f = Self::default();
        f.set_lowpass(fs, cutoff_hz, q);
        f
    }

    pub fn set_lowpass(&mut self, fs: f32, cutoff_hz: f32, q: f32) {
        let nyquist = fs * 0.5;
        let fc = cutoff_hz.clamp(10.0, nyquist * 0.95);
        let w0 = 2.0 * PI * fc / fs;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q.max(1e-3));
        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cos_w0) * 0.5 / a0;
        self.b1 = (1.0 - cos_w0) / a0;
        self.b2 = self.b0;
        self.a1 = -2.0 * cos_w0 / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = flush_denorm(self.b1 * x - self.a1 * y + self.z2);
        self.z2 = flush_denorm(self.b2 * x - self.a2 * y);
        y
    }
}

/// Two cascaded biquads: a 24 dB/octave low-pass.
#[derive(Debug, Clone, Default)]
pub struct Lowpass24 {
    stages: [Biquad; 2],
}

impl Lowpass24 {
    pub fn new(fs: f32, cutoff_hz: f32, q: f32) -> Self {
        Self {
            stages: [Biquad::lowpass(fs, cutoff_hz, q), Biquad::lowpass(fs, cutoff_hz, q)],
        }
    }

    pub fn set_cutoff(&mut self, fs: f32, cutoff_hz: f32, q: f32) {
        for s in self.stages.iter_mut() {
            s.set_lowpass(fs, cutoff_hz, q);
        }
    }

    pub fn reset(&mut self) {
        for s in self.stages.iter_mut() {
            s.reset();
        }
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.stages[0].process(x);
        self.stages[1].process(y)
    }
}

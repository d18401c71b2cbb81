//! Bus dynamics: a gentle compressor followed by the configurable output
//! guard (soft clip or peak limiter) protecting the device from overs.

use crate::config::OutputGuardSetting;
use crate::synth::util::{db_to_gain, gain_to_db, time_to_coeff};

#[derive(Clone, Copy, Debug)]
pub struct CompressorParams {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            ratio: 2.0,
            attack_ms: 3.0,
            release_ms: 250.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SoftClipParams {
    pub ceiling: f32,
    pub drive: f32,
}

impl Default for SoftClipParams {
    fn default() -> Self {
        Self {
            ceiling: 0.98,
            drive: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PeakLimiterParams {
    pub ceiling: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for PeakLimiterParams {
    fn default() -> Self {
        Self {
            ceiling: 0.98,
            attack_ms: 0.5,
            release_ms: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum OutputGuardMode {
    None,
    SoftClip(SoftClipParams),
    PeakLimiter(PeakLimiterParams),
}

impl Default for OutputGuardMode {
    fn default() -> Self {
        Self::PeakLimiter(PeakLimiterParams::default())
    }
}

impl From<&OutputGuardSetting> for OutputGuardMode {
    fn from(setting: &OutputGuardSetting) -> Self {
        match setting {
            OutputGuardSetting::None => OutputGuardMode::None,
            OutputGuardSetting::SoftClip => OutputGuardMode::SoftClip(SoftClipParams::default()),
            OutputGuardSetting::PeakLimiter => {
                OutputGuardMode::PeakLimiter(PeakLimiterParams::default())
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OutputGuardStats {
    pub max_abs_in: f32,
    pub max_abs_out: f32,
    pub num_over: u64,
}

impl OutputGuardStats {
    /// Fold a later block into a running window.
    pub fn merge(&mut self, other: OutputGuardStats) {
        self.max_abs_in = self.max_abs_in.max(other.max_abs_in);
        self.max_abs_out = self.max_abs_out.max(other.max_abs_out);
        self.num_over += other.num_over;
    }
}

#[derive(Debug)]
struct Compressor {
    params: CompressorParams,
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl Compressor {
    fn new(params: CompressorParams, fs: f32) -> Self {
        Self {
            params,
            envelope: 0.0,
            attack_coeff: time_to_coeff(params.attack_ms, fs),
            release_coeff: time_to_coeff(params.release_ms, fs),
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let level = x.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * level;
        let env_db = gain_to_db(self.envelope);
        let over = env_db - self.params.threshold_db;
        if over <= 0.0 {
            return x;
        }
        let ratio = self.params.ratio.max(1.0);
        let reduction_db = over - over / ratio;
        x * db_to_gain(-reduction_db)
    }
}

#[derive(Debug)]
pub struct OutputGuard {
    mode: OutputGuardMode,
    compressor: Compressor,
    limiter_gain: f32,
    limiter_attack: f32,
    limiter_release: f32,
    stats: OutputGuardStats,
}

impl OutputGuard {
    pub fn new(mode: OutputGuardMode, sample_rate: u32) -> Self {
        Self::with_compressor(mode, CompressorParams::default(), sample_rate)
    }

    pub fn with_compressor(
        mode: OutputGuardMode,
        compressor: CompressorParams,
        sample_rate: u32,
    ) -> Self {
        let fs = (sample_rate as f32).max(1.0);
        let (limiter_attack, limiter_release) = match mode {
            OutputGuardMode::PeakLimiter(p) => (
                time_to_coeff(p.attack_ms, fs),
                time_to_coeff(p.release_ms, fs),
            ),
            _ => (0.0, 0.0),
        };
        Self {
            mode,
            compressor: Compressor::new(compressor, fs),
            limiter_gain: 1.0,
            limiter_attack,
            limiter_release,
            stats: OutputGuardStats::default(),
        }
    }

    /// Stats for the most recent `process` call.
    pub fn stats(&self) -> OutputGuardStats {
        self.stats
    }

    /// Mono, in place.
    pub fn process(&mut self, samples: &mut [f32]) {
        self.stats = OutputGuardStats::default();
        for s in samples.iter_mut() {
            let x = if s.is_finite() { *s } else { 0.0 };
            let x = self.compressor.process(x);
            let abs_in = x.abs();
            self.stats.max_abs_in = self.stats.max_abs_in.max(abs_in);
            let y = match self.mode {
                OutputGuardMode::None => x,
                OutputGuardMode::SoftClip(p) => {
                    let ceiling = p.ceiling.abs().max(1e-6);
                    if abs_in > ceiling {
                        self.stats.num_over += 1;
                    }
                    (x * p.drive.max(0.0)).tanh() * ceiling
                }
                OutputGuardMode::PeakLimiter(p) => {
                    let ceiling = p.ceiling.abs().max(1e-6);
                    if abs_in > ceiling {
                        self.stats.num_over += 1;
                    }
                    let target = if abs_in > ceiling { ceiling / abs_in } else { 1.0 };
                    let coeff = if target < self.limiter_gain {
                        self.limiter_attack
                    } else {
                        self.limiter_release
                    };
                    self.limiter_gain = coeff * self.limiter_gain + (1.0 - coeff) * target;
                    (x * self.limiter_gain).clamp(-ceiling, ceiling)
                }
            };
            self.stats.max_abs_out = self.stats.max_abs_out.max(y.abs());
            *s = y;
        }
    }
}

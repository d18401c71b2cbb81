/// Level that counts as silence for exponential segments (-60 dB).
const SILENCE: f32 = 1.0e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack_sec: f32,
    pub decay_sec: f32,
    pub sustain: f32,
    pub release_sec: f32,
}

impl EnvelopeParams {
    /// Amplitude shape of a chime: quick linear rise, long exponential ring.
    pub const AMP: Self = Self {
        attack_sec: 0.1,
        decay_sec: 5.0,
        sustain: 0.0,
        release_sec: 0.1,
    };

    /// Filter sweep: near-instant open, settles on a low plateau.
    pub const FILTER: Self = Self {
        attack_sec: 0.001,
        decay_sec: 0.7,
        sustain: 0.1,
        release_sec: 0.8,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR with a linear attack and exponential decay/release.
#[derive(Debug, Clone)]
pub struct Envelope {
    params: EnvelopeParams,
    stage: Stage,
    level: f32,
    attack_step: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

fn exp_coeff(time_sec: f32, fs: f32) -> f32 {
    let n = (time_sec * fs).max(1.0);
    (SILENCE.ln() / n).exp()
}

impl Envelope {
    pub fn new(params: EnvelopeParams, fs: f32) -> Self {
        let fs = fs.max(1.0);
        Self {
            params,
            stage: Stage::Idle,
            level: 0.0,
            attack_step: 1.0 / (params.attack_sec * fs).max(1.0),
            decay_coeff: exp_coeff(params.decay_sec, fs),
            release_coeff: exp_coeff(params.release_sec, fs),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }

    /// Restart the attack from the current level (no click on retrigger).
    pub fn trigger(&mut self) {
        self.stage = Stage::Attack;
    }

    pub fn release(&mut self) {
        if self.stage != Stage::Idle {
            self.stage = Stage::Release;
        }
    }

    pub fn next_level(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => {
                self.level = 0.0;
            }
            Stage::Attack => {
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                let sustain = self.params.sustain;
                self.level = sustain + (self.level - sustain) * self.decay_coeff;
                if (self.level - sustain).abs() < SILENCE {
                    self.level = sustain;
                    self.stage = if sustain > 0.0 {
                        Stage::Sustain
                    } else {
                        Stage::Idle
                    };
                }
            }
            Stage::Sustain => {
                self.level = self.params.sustain;
            }
            Stage::Release => {
                self.level *= self.release_coeff;
                if self.level < SILENCE {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f32 = 1_000.0;

    #[test]
    fn attack_is_linear_and_peaks_at_one() {
        let mut env = Envelope::new(EnvelopeParams::AMP, FS);
        env.trigger();
        let first = env.next_level();
        assert!((first - 0.01).abs() < 1e-6);
        let mut steps = 1;
        while env.stage() == Stage::Attack && steps < 200 {
            env.next_level();
            steps += 1;
        }
        assert!((100..=101).contains(&steps), "attack took {steps} samples");
        assert_eq!(env.level(), 1.0);
        assert_eq!(env.stage(), Stage::Decay);
    }

    #[test]
    fn release_reaches_idle() {
        let mut env = Envelope::new(EnvelopeParams::AMP, FS);
        env.trigger();
        for _ in 0..200 {
            env.next_level();
        }
        env.release();
        for _ in 0..200 {
            env.next_level();
        }
        assert!(env.is_idle());
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn filter_envelope_holds_sustain() {
        let mut env = Envelope::new(EnvelopeParams::FILTER, FS);
        env.trigger();
        for _ in 0..5_000 {
            env.next_level();
        }
        assert_eq!(env.stage(), Stage::Sustain);
        assert!((env.level() - 0.1).abs() < 1e-6);
    }
}

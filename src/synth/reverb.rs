//! Small Schroeder-style reverb used as the shared trail effect.

use crate::synth::util::flush_denorm;

const COMB_TUNING: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNING: [usize; 2] = [556, 441];
const TUNING_FS: f32 = 44_100.0;
const ALLPASS_FEEDBACK: f32 = 0.5;
const DAMPING: f32 = 0.2;
const INPUT_GAIN: f32 = 0.25;

#[derive(Debug, Clone)]
struct Comb {
    buf: Vec<f32>,
    idx: usize,
    feedback: f32,
    store: f32,
}

impl Comb {
    fn new(len: usize, feedback: f32) -> Self {
        Self {
            buf: vec![0.0; len.max(1)],
            idx: 0,
            feedback,
            store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let out = self.buf[self.idx];
        self.store = flush_denorm(out * (1.0 - DAMPING) + self.store * DAMPING);
        self.buf[self.idx] = x + self.store * self.feedback;
        self.idx = (self.idx + 1) % self.buf.len();
        out
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    buf: Vec<f32>,
    idx: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Self {
            buf: vec![0.0; len.max(1)],
            idx: 0,
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let delayed = self.buf[self.idx];
        let out = delayed - x;
        self.buf[self.idx] = flush_denorm(x + delayed * ALLPASS_FEEDBACK);
        self.idx = (self.idx + 1) % self.buf.len();
        out
    }
}

#[derive(Debug, Clone)]
pub struct Reverb {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl Reverb {
    /// `decay_sec` is the time for the tail to fall by 60 dB.
    pub fn new(fs: f32, decay_sec: f32) -> Self {
        let scale = fs / TUNING_FS;
        let decay = decay_sec.max(0.01);
        let combs = COMB_TUNING
            .iter()
            .map(|&len| {
                let len = ((len as f32) * scale).round() as usize;
                let delay_sec = len as f32 / fs;
                let feedback = 10f32.powf(-3.0 * delay_sec / decay).min(0.98);
                Comb::new(len, feedback)
            })
            .collect();
        let allpasses = ALLPASS_TUNING
            .iter()
            .map(|&len| Allpass::new(((len as f32) * scale).round() as usize))
            .collect();
        Self { combs, allpasses }
    }

    /// Fully wet output for one input sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let input = x * INPUT_GAIN;
        let mut y = 0.0;
        for comb in self.combs.iter_mut() {
            y += comb.process(input);
        }
        for ap in self.allpasses.iter_mut() {
            y = ap.process(y);
        }
        y
    }
}

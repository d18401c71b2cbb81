//! Voice allocation for agents and the shared output controls.
//!
//! The pool owns every synthesis voice for the lifetime of the process.
//! Agents only hold a [`VoiceHandle`], a copyable index into this table, so
//! several agents can address the same voice without shared ownership.

use thiserror::Error;
use tracing::{info, warn};

use crate::core::pitch::NoteName;
use crate::life::tier::PerformanceTier;
use crate::synth::oscillator::Waveform;

pub const MONO_POOL_SIZE: usize = 6;

pub const MASTER_RAMP_SEC: f32 = 0.1;
pub const SETUP_RAMP_SEC: f32 = 0.5;
pub const FILTER_RAMP_SEC: f32 = 0.75;
pub const WET_RAMP_SEC: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("voice is busy")]
    Busy,
    #[error("synthesis engine is gone")]
    Disconnected,
    #[error("voice has been released")]
    Released,
    #[error("no voice in pool slot {0}")]
    MissingSlot(usize),
}

/// A sound source an agent can ask for a note.
pub trait SynthVoice: Send {
    fn trigger_note(
        &mut self,
        note: NoteName,
        duration_sec: f32,
        velocity: f32,
    ) -> Result<(), VoiceError>;
    fn set_waveform(&mut self, waveform: Waveform) -> Result<(), VoiceError>;
    /// Free the voice for good. Later triggers fail with `Released`.
    fn dispose(&mut self);
}

/// Parameters shared by every voice downstream of the pool.
pub trait OutputGraph: Send {
    fn ramp_master_gain(&mut self, to: f32, duration_sec: f32) -> Result<(), VoiceError>;
    fn ramp_filter_frequency(&mut self, to_hz: f32, duration_sec: f32) -> Result<(), VoiceError>;
    fn ramp_wet(&mut self, to: f32, duration_sec: f32) -> Result<(), VoiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    /// The single high-polyphony voice shared by every agent.
    Polyphonic,
    /// One of the small round-robin pool of single-note voices.
    Pooled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle {
    kind: VoiceKind,
    slot: usize,
}

impl VoiceHandle {
    pub const POLYPHONIC: VoiceHandle = VoiceHandle {
        kind: VoiceKind::Polyphonic,
        slot: 0,
    };

    pub fn pooled(slot: usize) -> Self {
        Self {
            kind: VoiceKind::Pooled,
            slot: slot % MONO_POOL_SIZE,
        }
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Accepts every request and makes no sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentVoice;

impl SynthVoice for SilentVoice {
    fn trigger_note(&mut self, _: NoteName, _: f32, _: f32) -> Result<(), VoiceError> {
        Ok(())
    }

    fn set_waveform(&mut self, _: Waveform) -> Result<(), VoiceError> {
        Ok(())
    }

    fn dispose(&mut self) {}
}

impl OutputGraph for SilentVoice {
    fn ramp_master_gain(&mut self, _: f32, _: f32) -> Result<(), VoiceError> {
        Ok(())
    }

    fn ramp_filter_frequency(&mut self, _: f32, _: f32) -> Result<(), VoiceError> {
        Ok(())
    }

    fn ramp_wet(&mut self, _: f32, _: f32) -> Result<(), VoiceError> {
        Ok(())
    }
}

/// Reverb wet level for a trail setting: `-0.0085 * |trail| + 0.95`.
pub fn trail_to_wet(trail: f32) -> f32 {
    -0.0085 * trail.abs() + 0.95
}

pub struct VoicePool {
    poly: Box<dyn SynthVoice>,
    pooled: Vec<Box<dyn SynthVoice>>,
    graph: Box<dyn OutputGraph>,
    released: bool,
}

impl VoicePool {
    pub fn new(
        poly: Box<dyn SynthVoice>,
        pooled: Vec<Box<dyn SynthVoice>>,
        graph: Box<dyn OutputGraph>,
    ) -> Self {
        if pooled.len() != MONO_POOL_SIZE {
            warn!(
                "voice pool built with {} pooled voices, expected {MONO_POOL_SIZE}",
                pooled.len()
            );
        }
        Self {
            poly,
            pooled,
            graph,
            released: false,
        }
    }

    /// A full-size pool of [`SilentVoice`]s.
    pub fn muted() -> Self {
        Self::new(
            Box::new(SilentVoice),
            (0..MONO_POOL_SIZE)
                .map(|_| Box::new(SilentVoice) as Box<dyn SynthVoice>)
                .collect(),
            Box::new(SilentVoice),
        )
    }

    /// Voice for the agent at `index` in the live list under `tier`.
    pub fn handle_for(tier: PerformanceTier, index: usize) -> VoiceHandle {
        match tier {
            PerformanceTier::HighFidelity => VoiceHandle::POLYPHONIC,
            PerformanceTier::Reduced => VoiceHandle::pooled(index),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn trigger(
        &mut self,
        handle: VoiceHandle,
        note: NoteName,
        duration_sec: f32,
        velocity: f32,
    ) -> Result<(), VoiceError> {
        if self.released {
            return Err(VoiceError::Released);
        }
        let voice = match handle.kind {
            VoiceKind::Polyphonic => &mut self.poly,
            VoiceKind::Pooled => self
                .pooled
                .get_mut(handle.slot)
                .ok_or(VoiceError::MissingSlot(handle.slot))?,
        };
        voice.trigger_note(note, duration_sec, velocity)
    }

    fn voices_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn SynthVoice>> {
        std::iter::once(&mut self.poly).chain(self.pooled.iter_mut())
    }

    /// Switch the oscillator of every voice at once.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in self.voices_mut() {
            if let Err(err) = voice.set_waveform(waveform) {
                warn!(%err, ?waveform, "waveform change not delivered");
            }
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let Err(err) = self.graph.ramp_master_gain(volume, MASTER_RAMP_SEC) {
            warn!(%err, "master gain ramp not delivered");
        }
    }

    pub fn set_filter_frequency(&mut self, hz: f32) {
        if let Err(err) = self.graph.ramp_filter_frequency(hz, FILTER_RAMP_SEC) {
            warn!(%err, "filter ramp not delivered");
        }
    }

    pub fn set_trail(&mut self, trail: f32) {
        if let Err(err) = self.graph.ramp_wet(trail_to_wet(trail), WET_RAMP_SEC) {
            warn!(%err, "wet ramp not delivered");
        }
    }

    /// Bring the output back up, e.g. when the window is visible again.
    pub fn setup(&mut self) {
        if self.released {
            warn!("setup requested after voices were released");
            return;
        }
        if let Err(err) = self.graph.ramp_master_gain(1.0, SETUP_RAMP_SEC) {
            warn!(%err, "setup ramp not delivered");
        }
    }

    /// Fade the output to silence. With `dispose`, every voice is released
    /// and the pool cannot sound again.
    pub fn teardown(&mut self, dispose: bool) {
        if let Err(err) = self.graph.ramp_master_gain(0.0, MASTER_RAMP_SEC) {
            warn!(%err, "teardown ramp not delivered");
        }
        if dispose && !self.released {
            for voice in self.voices_mut() {
                voice.dispose();
            }
            self.released = true;
            info!("voice pool released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wet_follows_trail_magnitude() {
        assert!((trail_to_wet(-1.0) - 0.9415).abs() < 1e-6);
        assert!((trail_to_wet(-110.0) - 0.015).abs() < 1e-5);
        assert_eq!(trail_to_wet(-55.0), trail_to_wet(55.0));
    }

    #[test]
    fn handles_follow_tier() {
        assert_eq!(
            VoicePool::handle_for(PerformanceTier::HighFidelity, 11),
            VoiceHandle::POLYPHONIC
        );
        let h = VoicePool::handle_for(PerformanceTier::Reduced, 8);
        assert_eq!(h.kind(), VoiceKind::Pooled);
        assert_eq!(h.slot(), 2);
    }
}

//! Simulation-side handles that forward voice calls to the audio worker.

use crossbeam_channel::{Sender, TrySendError};
use tracing::debug;

use crate::core::pitch::NoteName;
use crate::life::voice_pool::{MONO_POOL_SIZE, OutputGraph, SynthVoice, VoiceError, VoicePool};
use crate::synth::events::{SynthCommand, VoiceSlot};
use crate::synth::oscillator::Waveform;

fn send(tx: &Sender<SynthCommand>, cmd: SynthCommand) -> Result<(), VoiceError> {
    tx.try_send(cmd).map_err(|err| match err {
        TrySendError::Full(_) => VoiceError::Busy,
        TrySendError::Disconnected(_) => VoiceError::Disconnected,
    })
}

pub struct EngineVoice {
    slot: VoiceSlot,
    tx: Sender<SynthCommand>,
    disposed: bool,
}

impl EngineVoice {
    pub fn new(slot: VoiceSlot, tx: Sender<SynthCommand>) -> Self {
        Self {
            slot,
            tx,
            disposed: false,
        }
    }
}

impl SynthVoice for EngineVoice {
    fn trigger_note(
        &mut self,
        note: NoteName,
        duration_sec: f32,
        velocity: f32,
    ) -> Result<(), VoiceError> {
        if self.disposed {
            return Err(VoiceError::Released);
        }
        send(
            &self.tx,
            SynthCommand::NoteOn {
                slot: self.slot,
                freq_hz: note.freq_hz(),
                duration_sec,
                velocity,
            },
        )
    }

    fn set_waveform(&mut self, waveform: Waveform) -> Result<(), VoiceError> {
        if self.disposed {
            return Err(VoiceError::Released);
        }
        send(
            &self.tx,
            SynthCommand::SetWaveform {
                slot: self.slot,
                waveform,
            },
        )
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        // the handle is unusable from here on even if the engine misses this
        if let Err(err) = send(&self.tx, SynthCommand::Dispose { slot: self.slot }) {
            debug!(slot = ?self.slot, %err, "dispose not delivered");
        }
    }
}

pub struct EngineGraph {
    tx: Sender<SynthCommand>,
}

impl EngineGraph {
    pub fn new(tx: Sender<SynthCommand>) -> Self {
        Self { tx }
    }
}

impl OutputGraph for EngineGraph {
    fn ramp_master_gain(&mut self, to: f32, duration_sec: f32) -> Result<(), VoiceError> {
        send(&self.tx, SynthCommand::RampMasterGain { to, duration_sec })
    }

    fn ramp_filter_frequency(&mut self, to_hz: f32, duration_sec: f32) -> Result<(), VoiceError> {
        send(
            &self.tx,
            SynthCommand::RampFilterFrequency {
                to_hz,
                duration_sec,
            },
        )
    }

    fn ramp_wet(&mut self, to: f32, duration_sec: f32) -> Result<(), VoiceError> {
        send(&self.tx, SynthCommand::RampWet { to, duration_sec })
    }
}

/// A pool whose voices all live in the engine behind `tx`.
pub fn engine_voice_pool(tx: &Sender<SynthCommand>) -> VoicePool {
    let pooled = (0..MONO_POOL_SIZE)
        .map(|i| Box::new(EngineVoice::new(VoiceSlot::Mono(i), tx.clone())) as Box<dyn SynthVoice>)
        .collect();
    VoicePool::new(
        Box::new(EngineVoice::new(VoiceSlot::Poly, tx.clone())),
        pooled,
        Box::new(EngineGraph::new(tx.clone())),
    )
}

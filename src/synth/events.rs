use crate::synth::oscillator::Waveform;

/// Which engine-side voice a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceSlot {
    /// The shared high-polyphony voice.
    Poly,
    /// One of the single-note pooled voices.
    Mono(usize),
}

/// Messages from the simulation thread to the audio worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthCommand {
    NoteOn {
        slot: VoiceSlot,
        freq_hz: f32,
        duration_sec: f32,
        velocity: f32,
    },
    SetWaveform {
        slot: VoiceSlot,
        waveform: Waveform,
    },
    Dispose {
        slot: VoiceSlot,
    },
    RampMasterGain {
        to: f32,
        duration_sec: f32,
    },
    RampFilterFrequency {
        to_hz: f32,
        duration_sec: f32,
    },
    RampWet {
        to: f32,
        duration_sec: f32,
    },
}

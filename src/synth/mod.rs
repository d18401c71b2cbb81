//! Synthesis primitives (Hz, sec) and the engine that mixes every voice.

pub mod engine;
pub mod envelope;
pub mod events;
pub mod filter;
pub mod oscillator;
pub mod ramp;
pub mod remote;
pub mod reverb;
pub mod util;
pub mod voice;

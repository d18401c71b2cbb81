use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use ringbuf::HeapProd;
use tracing::{debug, info, trace};

use crate::audio::AudioError;
use crate::audio::output::AudioOutput;
use crate::audio::output_guard::OutputGuardStats;
use crate::synth::engine::SynthEngine;
use crate::synth::events::SynthCommand;

pub const HOP: usize = 512;

/// Where rendered hops go.
pub struct AudioSinks {
    pub device: Option<HeapProd<f32>>,
    pub wav: Option<Sender<Vec<f32>>>,
}

/// Renders the engine in fixed hops on its own thread until stopped.
pub struct AudioWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AudioWorker {
    pub fn spawn(
        engine: SynthEngine,
        commands: Receiver<SynthCommand>,
        sinks: AudioSinks,
        stop: Arc<AtomicBool>,
    ) -> Result<Self, AudioError> {
        let stop_worker = stop.clone();
        let handle = thread::Builder::new()
            .name("audio-worker".into())
            .spawn(move || worker_loop(engine, commands, sinks, stop_worker))
            .map_err(AudioError::Thread)?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn join(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        self.join();
    }
}

fn worker_loop(
    mut engine: SynthEngine,
    commands: Receiver<SynthCommand>,
    mut sinks: AudioSinks,
    exiting: Arc<AtomicBool>,
) {
    let fs = engine.sample_rate();
    let hop_duration = Duration::from_secs_f32(HOP as f32 / fs);
    let mut next_deadline = Instant::now();
    let mut chunk = vec![0.0f32; HOP];
    let mut hops: u64 = 0;
    let mut guard = OutputGuardStats::default();
    info!(fs, hop = HOP, "audio worker started");

    loop {
        if exiting.load(Ordering::SeqCst) {
            break;
        }
        next_deadline += hop_duration;

        for cmd in commands.try_iter() {
            engine.handle(cmd);
        }
        engine.render(&mut chunk);
        guard.merge(engine.guard_stats());
        hops += 1;

        if let Some(tx) = &sinks.wav {
            let _ = tx.try_send(chunk.clone());
        }

        match sinks.device.as_mut() {
            // the ring buffer applies backpressure at device rate
            Some(prod) => {
                AudioOutput::push_samples(prod, &chunk, || !exiting.load(Ordering::SeqCst));
            }
            None => {
                let now = Instant::now();
                if now < next_deadline {
                    thread::sleep(next_deadline - now);
                } else {
                    next_deadline = now;
                    trace!("worker overrun");
                }
            }
        }
        if hops % 1_000 == 0 {
            debug!(
                hops,
                active_voices = engine.active_voices(),
                peak_in = guard.max_abs_in,
                peak_out = guard.max_abs_out,
                over = guard.num_over,
                "audio worker"
            );
            guard = OutputGuardStats::default();
        }
    }
    info!(hops, "audio worker stopped");
}

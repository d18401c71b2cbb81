//! Process-wide audio plumbing shared by the window and the headless runner.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::bounded;
use tracing::{info, warn};

use chimefield::audio::AudioError;
use chimefield::audio::output::AudioOutput;
use chimefield::audio::output_guard::OutputGuardMode;
use chimefield::audio::worker::{AudioSinks, AudioWorker};
use chimefield::audio::writer::WavOutput;
use chimefield::config::AppConfig;
use chimefield::life::voice_pool::VoicePool;
use chimefield::synth::engine::{SynthConfig, SynthEngine};
use chimefield::synth::remote::engine_voice_pool;

use crate::cli::Args;

const COMMAND_QUEUE: usize = 256;
const WAV_QUEUE: usize = 64;
/// Long enough for the teardown ramp to reach silence.
const FADE_OUT: Duration = Duration::from_millis(150);

pub struct Runtime {
    audio: Option<AudioOutput>,
    worker: AudioWorker,
    wav_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    pub fn start(
        args: &Args,
        cfg: &AppConfig,
    ) -> Result<(Self, VoicePool), AudioError> {
        let (audio, device) = if args.play {
            match AudioOutput::new(cfg.audio.latency_ms) {
                Ok((out, prod)) => (Some(out), Some(prod)),
                Err(err) => {
                    warn!(%err, "realtime output unavailable, continuing silently");
                    (None, None)
                }
            }
        } else {
            (None, None)
        };
        let sample_rate = audio
            .as_ref()
            .map_or(cfg.audio.sample_rate, |out| out.sample_rate());

        let (wav_tx, wav_handle) = match &args.wav {
            Some(path) => {
                let (tx, rx) = bounded::<Vec<f32>>(WAV_QUEUE);
                let handle = WavOutput::run(rx, PathBuf::from(path), sample_rate)
                    .map_err(AudioError::Thread)?;
                info!(%path, "capturing wav");
                (Some(tx), Some(handle))
            }
            None => (None, None),
        };

        let engine = SynthEngine::new(SynthConfig {
            fs: sample_rate as f32,
            waveform: cfg.sketch.waveform,
            guard: OutputGuardMode::from(&cfg.audio.output_guard),
        });
        let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE);
        let worker = AudioWorker::spawn(
            engine,
            cmd_rx,
            AudioSinks {
                device,
                wav: wav_tx,
            },
            Arc::new(AtomicBool::new(false)),
        )?;
        let voices = engine_voice_pool(&cmd_tx);

        Ok((
            Self {
                audio,
                worker,
                wav_handle,
            },
            voices,
        ))
    }

    /// Let the fade finish, then stop the worker and flush the wav file.
    pub fn finish(mut self) {
        std::thread::sleep(FADE_OUT);
        self.worker.join();
        if let Some(handle) = self.wav_handle.take() {
            let _ = handle.join();
        }
        if let Some(mut out) = self.audio.take() {
            out.stop();
        }
    }
}

use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{info, warn};

use crate::audio::AudioError;

/// Writes mono 16-bit PCM on its own thread until the sender side is dropped.
pub struct WavOutput;

impl WavOutput {
    pub fn spec(sample_rate: u32) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    fn write_all(
        rx: Receiver<Vec<f32>>,
        path: &PathBuf,
        sample_rate: u32,
    ) -> Result<u64, AudioError> {
        let mut writer = WavWriter::create(path, Self::spec(sample_rate))?;
        let mut written = 0u64;
        while let Ok(samples) = rx.recv() {
            for &s in samples.iter() {
                let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(v)?;
            }
            written += samples.len() as u64;
        }
        writer.finalize()?;
        Ok(written)
    }

    pub fn run(
        rx: Receiver<Vec<f32>>,
        path: PathBuf,
        sample_rate: u32,
    ) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("wav-writer".into())
            .spawn(move || match Self::write_all(rx, &path, sample_rate) {
                Ok(samples) => info!(path = %path.display(), samples, "wav written"),
                Err(err) => warn!(path = %path.display(), %err, "wav capture failed"),
            })
    }
}

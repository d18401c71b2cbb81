use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::*;
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{info, warn};

use crate::audio::AudioError;

/// Realtime output device fed from a ring buffer of mono samples.
pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    pub config: cpal::StreamConfig,
}

impl AudioOutput {
    /// Open the default device and return the producer the worker pushes to.
    pub fn new(latency_ms: f32) -> Result<(Self, HeapProd<f32>), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let supported_config = device.default_output_config()?;
        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;

        let config = cpal::StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let latency_frames = (sample_rate as f32 * latency_ms / 1000.0) as usize;
        let rb = HeapRb::<f32>::new(latency_frames.max(256) * 4);
        let (prod, mut cons): (HeapProd<f32>, HeapCons<f32>) = rb.split();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let s = cons.try_pop().unwrap_or(0.0);
                    frame.fill(s);
                }
            },
            |err| warn!("output stream error: {err}"),
            None,
        )?;
        stream.play()?;
        info!(sample_rate, channels, latency_ms, "audio output started");

        Ok((
            Self {
                stream: Some(stream),
                config,
            },
            prod,
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn stop(&mut self) {
        self.stream.take();
    }

    /// Push all of `samples`, waiting for the device to drain when full.
    /// Gives up when `keep_going` turns false.
    pub fn push_samples(
        prod: &mut HeapProd<f32>,
        samples: &[f32],
        keep_going: impl Fn() -> bool,
    ) {
        let mut offset = 0;
        while offset < samples.len() {
            offset += prod.push_slice(&samples[offset..]);
            if offset < samples.len() {
                if !keep_going() {
                    return;
                }
                std::thread::sleep(std::time::Duration::from_micros(200));
            }
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        if self.stream.take().is_some() {
            info!("audio output stopped");
        }
    }
}

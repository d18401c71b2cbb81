pub mod output;
pub mod output_guard;
pub mod worker;
pub mod writer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,
    #[error("output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("building output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("starting output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("spawning audio thread: {0}")]
    Thread(std::io::Error),
}

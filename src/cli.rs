use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Play audio in realtime
    #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub play: bool,

    /// Write audio to wav file
    #[arg(long)]
    pub wav: Option<String>,

    /// Path to config TOML
    #[arg(long, default_value = "chimefield.toml")]
    pub config: String,

    /// Start from a named favourite (e.g. "Ocean")
    #[arg(long)]
    pub preset: Option<String>,

    /// One polyphonic voice and 60 fps (overrides config)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub high_fidelity: Option<bool>,

    /// Canvas edge in pixels (overrides config)
    #[arg(long)]
    pub size: Option<u32>,

    /// Run without GUI (headless)
    #[arg(long, default_value_t = false)]
    pub nogui: bool,

    /// Ticks to run headless before exiting
    #[arg(long, default_value_t = 600)]
    pub frames: u64,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

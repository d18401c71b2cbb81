// Entry point: loads config, starts the audio runtime, then runs the window
// or a headless loop.
mod app;
mod cli;
mod runtime;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chimefield::config::AppConfig;
use chimefield::life::population::Population;
use chimefield::life::presets::{FAVORITES, Preset};
use chimefield::life::voice_pool::VoicePool;
use chimefield::render::PixelCanvas;
use chimefield::sketch::Sketch;

use crate::cli::Args;
use crate::runtime::Runtime;

fn build_sketch(
    args: &Args,
    cfg: &AppConfig,
    voices: VoicePool,
) -> (Sketch<PixelCanvas>, &'static str) {
    let tier = cfg.display.tier();
    let size = cfg.display.size.max(1);
    let population = Population::new(size as f32, tier);
    let mut sketch = Sketch::new(PixelCanvas::new(size), population, voices);

    let preset = match args.preset.as_deref() {
        Some(name) => Preset::by_name(name).or_else(|| {
            warn!(name, "unknown favourite, using config settings");
            None
        }),
        None => None,
    };
    match preset {
        Some(preset) => {
            sketch.apply_preset(preset, tier);
            (sketch, preset.name)
        }
        None => {
            sketch.apply(&cfg.sketch, tier, false);
            (sketch, FAVORITES[0].name)
        }
    }
}

fn run_headless(
    mut sketch: Sketch<PixelCanvas>,
    runtime: Option<Runtime>,
    frames: u64,
    stop: &AtomicBool,
) {
    let period = Duration::from_secs_f32(1.0 / sketch.tier().frame_rate() as f32);
    let started = Instant::now();
    let mut next_deadline = started;
    let mut events = 0usize;
    while sketch.frames() < frames && !stop.load(Ordering::SeqCst) {
        next_deadline += period;
        events += sketch.tick();
        let now = Instant::now();
        if now < next_deadline {
            std::thread::sleep(next_deadline - now);
        } else {
            next_deadline = now;
        }
    }
    info!(
        frames = sketch.frames(),
        border_events = events,
        dots = sketch.population().len(),
        mean_luma = sketch.surface().mean_luma(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "headless run finished"
    );
    sketch.shutdown();
    if let Some(runtime) = runtime {
        runtime.finish();
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let mut cfg = AppConfig::load_or_default(&args.config);
    if let Some(high_fidelity) = args.high_fidelity {
        cfg.display.high_fidelity = high_fidelity;
    }
    if let Some(size) = args.size {
        cfg.display.size = size;
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_for_ctrlc = stop_flag.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        stop_flag_for_ctrlc.store(true, Ordering::SeqCst);
    }) {
        warn!(%err, "Ctrl-C handler not installed");
    }

    let (runtime, voices) = match Runtime::start(&args, &cfg) {
        Ok((runtime, voices)) => (Some(runtime), voices),
        Err(err) => {
            warn!(%err, "audio runtime failed to start, running muted");
            (None, VoicePool::muted())
        }
    };
    let (sketch, preset) = build_sketch(&args, &cfg, voices);

    if args.nogui {
        run_headless(sketch, runtime, args.frames, &stop_flag);
        return Ok(());
    }

    let side = cfg.display.size as f32;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([side + 260.0, side + 40.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Chimefield",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(app::App::new(
                cc, sketch, runtime, preset, stop_flag,
            )))
        }),
    )
}

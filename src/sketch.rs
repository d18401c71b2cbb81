//! One running piece: the population, its voices and the surface it draws on.
//!
//! Every settings change goes through [`Sketch::apply`], which validates,
//! forwards the audio-only settings to the output graph and reconciles the
//! population before the next tick runs.

use tracing::{debug, info};

use crate::config::SketchConfig;
use crate::life::population::{Population, ReconcileSummary};
use crate::life::presets::Preset;
use crate::life::tier::PerformanceTier;
use crate::life::voice_pool::VoicePool;
use crate::render::RenderSurface;

pub struct Sketch<S: RenderSurface> {
    surface: S,
    population: Population,
    voices: VoicePool,
    config: Option<SketchConfig>,
    frames: u64,
}

impl<S: RenderSurface> Sketch<S> {
    pub fn new(mut surface: S, population: Population, voices: VoicePool) -> Self {
        surface.create_canvas(population.border_length().round() as u32);
        surface.set_frame_rate(population.frame_rate());
        Self {
            surface,
            population,
            voices,
            config: None,
            frames: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn voices(&self) -> &VoicePool {
        &self.voices
    }

    /// The validated settings currently in effect.
    pub fn config(&self) -> Option<&SketchConfig> {
        self.config.as_ref()
    }

    pub fn tier(&self) -> PerformanceTier {
        self.population.tier()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Validate `requested` for `tier` and bring everything in line with it.
    pub fn apply(
        &mut self,
        requested: &SketchConfig,
        tier: PerformanceTier,
        speed_limit_exempt: bool,
    ) -> ReconcileSummary {
        let cfg = requested.validated(tier, speed_limit_exempt);
        let previous = self.config.take();
        let changed = |f: fn(&SketchConfig) -> f32| previous.as_ref().is_none_or(|p| f(p) != f(&cfg));

        if changed(|c| c.volume) {
            self.voices.set_volume(cfg.volume);
        }
        if changed(|c| c.filter_frequency) {
            self.voices.set_filter_frequency(cfg.filter_frequency);
        }
        if changed(|c| c.trail) {
            self.voices.set_trail(cfg.trail);
        }
        if previous.as_ref().is_none_or(|p| p.waveform != cfg.waveform) {
            self.voices.set_waveform(cfg.waveform);
        }

        if tier != self.population.tier() {
            info!(?tier, "performance tier changed");
            self.surface.set_frame_rate(tier.frame_rate());
        }
        let summary = self.population.reconcile(&cfg.reconcile_config(tier));
        self.config = Some(cfg);
        summary
    }

    pub fn apply_preset(&mut self, preset: &Preset, tier: PerformanceTier) -> ReconcileSummary {
        debug!(preset = preset.name, "applying favourite");
        self.apply(&preset.config(), tier, preset.speed_limit_exempt)
    }

    /// One draw tick. Returns the number of border events.
    pub fn tick(&mut self) -> usize {
        let trail = self
            .config
            .as_ref()
            .map_or(SketchConfig::default().trail, |c| c.trail);
        self.surface.clear_with_alpha(trail.abs());
        self.frames += 1;
        self.population.advance_all(&mut self.surface, &mut self.voices)
    }

    /// Fade out while hidden, fade back in when shown again.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.voices.setup();
            // setup ramps to unity; come back at the user's volume instead
            if let Some(cfg) = &self.config {
                self.voices.set_volume(cfg.volume);
            }
        } else {
            self.voices.teardown(false);
        }
    }

    /// Fade out and release every voice for good.
    pub fn shutdown(&mut self) {
        self.voices.teardown(true);
    }
}

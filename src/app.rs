use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use egui::{ColorImage, TextureHandle, TextureOptions};
use tracing::info;

use chimefield::config::{MAX_FILTER_HZ, MAX_TRAIL, MAX_VOLUME, MIN_FILTER_HZ, SketchConfig};
use chimefield::core::harmony::HarmonyFamily;
use chimefield::core::palette::MAX_RANGE;
use chimefield::life::presets::{FAVORITES, Preset};
use chimefield::life::tier::PerformanceTier;
use chimefield::render::PixelCanvas;
use chimefield::sketch::Sketch;
use chimefield::synth::oscillator::Waveform;

use crate::runtime::Runtime;

/// Ticks run per repaint at most; a stalled window skips ahead instead.
const MAX_CATCH_UP: u32 = 4;

pub struct App {
    sketch: Sketch<PixelCanvas>,
    runtime: Option<Runtime>,
    texture: Option<TextureHandle>,
    /// What the controls show; validated on apply.
    requested: SketchConfig,
    tier: PerformanceTier,
    speed_limit_exempt: bool,
    preset: &'static str,
    next_tick: Instant,
    visible: bool,
    exiting: Arc<AtomicBool>,
}

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        sketch: Sketch<PixelCanvas>,
        runtime: Option<Runtime>,
        preset: &'static str,
        exiting: Arc<AtomicBool>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let requested = sketch.config().cloned().unwrap_or_default();
        let tier = sketch.tier();
        Self {
            sketch,
            runtime,
            texture: None,
            requested,
            tier,
            speed_limit_exempt: false,
            preset,
            next_tick: Instant::now(),
            visible: true,
            exiting,
        }
    }

    fn tick_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tier.frame_rate() as f32)
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;
        let mut picked: Option<&'static Preset> = None;

        egui::ComboBox::from_label("Favorites")
            .selected_text(self.preset)
            .show_ui(ui, |ui| {
                for preset in FAVORITES.iter() {
                    if ui.selectable_label(self.preset == preset.name, preset.name).clicked() {
                        picked = Some(preset);
                    }
                }
            });
        ui.separator();

        let cfg = &mut self.requested;
        let max_density = self.tier.max_density() as f32;
        let max_speed = self.tier.max_speed();
        changed |= ui
            .add(egui::Slider::new(&mut cfg.density, 1.0..=max_density).step_by(1.0).text("Density"))
            .changed();
        egui::ComboBox::from_label("Harmony")
            .selected_text(cfg.harmony.label())
            .show_ui(ui, |ui| {
                for family in HarmonyFamily::ALL {
                    changed |= ui
                        .selectable_value(&mut cfg.harmony, family, family.label())
                        .changed();
                }
            });
        changed |= ui
            .add(egui::Slider::new(&mut cfg.range, 0.0..=MAX_RANGE as f32).step_by(1.0).text("Range"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut cfg.speed, 0.0..=max_speed).step_by(1.0).text("Speed"))
            .changed();
        changed |= ui
            .add(
                egui::Slider::new(&mut cfg.filter_frequency, MIN_FILTER_HZ..=MAX_FILTER_HZ)
                    .logarithmic(true)
                    .text("Filter"),
            )
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut cfg.trail, -MAX_TRAIL..=-1.0).text("Trail"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut cfg.volume, 0.0..=MAX_VOLUME).text("Volume"))
            .changed();
        egui::ComboBox::from_label("Waveform")
            .selected_text(cfg.waveform.label())
            .show_ui(ui, |ui| {
                for waveform in Waveform::ALL {
                    changed |= ui
                        .selectable_value(&mut cfg.waveform, waveform, waveform.label())
                        .changed();
                }
            });
        changed |= ui.checkbox(&mut cfg.sound_enabled, "Sound").changed();

        let mut high_fidelity = self.tier.is_high_fidelity();
        if ui.checkbox(&mut high_fidelity, "High performance").changed() {
            self.tier = PerformanceTier::from_high_fidelity(high_fidelity);
            changed = true;
        }

        if let Some(preset) = picked {
            self.preset = preset.name;
            self.speed_limit_exempt = preset.speed_limit_exempt;
            self.sketch.apply_preset(preset, self.tier);
            if let Some(cfg) = self.sketch.config() {
                self.requested = cfg.clone();
            }
        } else if changed {
            self.speed_limit_exempt = false;
            self.sketch.apply(&self.requested, self.tier, false);
            if let Some(cfg) = self.sketch.config() {
                self.requested = cfg.clone();
            }
        }

        ui.separator();
        ui.label(format!(
            "{} dots, {} fps",
            self.sketch.population().len(),
            self.tier.frame_rate()
        ));
    }

    fn upload(&mut self, ctx: &egui::Context) {
        let canvas = self.sketch.surface();
        let size = canvas.size() as usize;
        let image = ColorImage::from_rgba_unmultiplied([size, size], &canvas.to_rgba8());
        match &mut self.texture {
            Some(tex) => tex.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("sketch", image, TextureOptions::LINEAR));
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.exiting.load(Ordering::SeqCst) {
            info!("SIGINT received: closing window.");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let visible = !ctx.input(|i| i.viewport().minimized.unwrap_or(false));
        if visible != self.visible {
            self.visible = visible;
            self.sketch.set_visible(visible);
        }

        let period = self.tick_period();
        let now = Instant::now();
        let mut ran = 0;
        while self.visible && now >= self.next_tick && ran < MAX_CATCH_UP {
            self.sketch.tick();
            self.next_tick += period;
            ran += 1;
        }
        if now >= self.next_tick {
            self.next_tick = now + period;
        }
        if ran > 0 {
            self.upload(ctx);
        }

        egui::SidePanel::left("controls")
            .resizable(false)
            .show(ctx, |ui| self.controls(ui));
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(tex) = &self.texture {
                    let side = ui.available_size().min_elem();
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                            tex.id(),
                            egui::vec2(side, side),
                        )));
                    });
                }
            });

        ctx.request_repaint_after(self.next_tick.saturating_duration_since(Instant::now()));
    }
}

impl Drop for App {
    fn drop(&mut self) {
        info!("App drop. Finalizing..");
        self.sketch.shutdown();
        if let Some(runtime) = self.runtime.take() {
            runtime.finish();
        }
    }
}

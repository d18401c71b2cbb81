use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::harmony::HarmonyFamily;
use crate::core::palette::MAX_RANGE;
use crate::life::population::ReconcileConfig;
use crate::life::tier::PerformanceTier;
use crate::synth::oscillator::Waveform;

pub const MIN_FILTER_HZ: f32 = 20.0;
pub const MAX_FILTER_HZ: f32 = 20_000.0;
pub const MAX_TRAIL: f32 = 110.0;
pub const MAX_VOLUME: f32 = 0.8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_latency_ms")]
    pub latency_ms: f32,
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default)]
    pub output_guard: OutputGuardSetting,
}

impl AudioConfig {
    fn default_latency_ms() -> f32 {
        50.0
    }
    fn default_sample_rate() -> u32 {
        48_000
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            latency_ms: Self::default_latency_ms(),
            sample_rate: Self::default_sample_rate(),
            output_guard: OutputGuardSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputGuardSetting {
    None,
    SoftClip,
    #[default]
    PeakLimiter,
}

/// The user-facing sketch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SketchConfig {
    #[serde(default = "SketchConfig::default_density")]
    pub density: f32,
    #[serde(default)]
    pub harmony: HarmonyFamily,
    #[serde(default)]
    pub range: f32,
    #[serde(default = "SketchConfig::default_filter_frequency")]
    pub filter_frequency: f32,
    #[serde(default = "SketchConfig::default_speed")]
    pub speed: f32,
    #[serde(default = "SketchConfig::default_sound_enabled")]
    pub sound_enabled: bool,
    /// Negative; closer to zero leaves longer trails.
    #[serde(default = "SketchConfig::default_trail")]
    pub trail: f32,
    #[serde(default = "SketchConfig::default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub waveform: Waveform,
}

impl SketchConfig {
    fn default_density() -> f32 {
        3.0
    }
    fn default_filter_frequency() -> f32 {
        750.0
    }
    fn default_speed() -> f32 {
        1.0
    }
    fn default_sound_enabled() -> bool {
        true
    }
    fn default_trail() -> f32 {
        -55.0
    }
    fn default_volume() -> f32 {
        0.4
    }

    /// Clamp every field into what `tier` supports. Nothing downstream
    /// validates again.
    pub fn validated(&self, tier: PerformanceTier, speed_limit_exempt: bool) -> Self {
        let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };

        let density = finite_or(self.density, Self::default_density())
            .ceil()
            .clamp(1.0, tier.max_density() as f32);
        let range = finite_or(self.range, 0.0).ceil().clamp(0.0, MAX_RANGE as f32);
        let mut speed = finite_or(self.speed, Self::default_speed()).ceil().max(0.0);
        if !speed_limit_exempt {
            speed = speed.min(tier.max_speed());
        }
        let filter_frequency = finite_or(self.filter_frequency, Self::default_filter_frequency())
            .clamp(MIN_FILTER_HZ, MAX_FILTER_HZ);
        let trail = finite_or(self.trail, Self::default_trail()).clamp(-MAX_TRAIL, -1.0);
        let volume = finite_or(self.volume, Self::default_volume()).clamp(0.0, MAX_VOLUME);

        Self {
            density,
            harmony: self.harmony,
            range,
            filter_frequency,
            speed,
            sound_enabled: self.sound_enabled,
            trail,
            volume,
            waveform: self.waveform,
        }
    }

    /// Reconcile request for an already validated config.
    pub fn reconcile_config(&self, tier: PerformanceTier) -> ReconcileConfig {
        ReconcileConfig {
            density: self.density.max(0.0) as usize,
            harmony: self.harmony,
            range: self.range.clamp(0.0, MAX_RANGE as f32) as u8,
            filter_frequency: self.filter_frequency,
            speed_factor: self.speed,
            sound_enabled: self.sound_enabled,
            tier,
        }
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            density: Self::default_density(),
            harmony: HarmonyFamily::default(),
            range: 0.0,
            filter_frequency: Self::default_filter_frequency(),
            speed: Self::default_speed(),
            sound_enabled: Self::default_sound_enabled(),
            trail: Self::default_trail(),
            volume: Self::default_volume(),
            waveform: Waveform::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Canvas edge in pixels.
    #[serde(default = "DisplayConfig::default_size")]
    pub size: u32,
    #[serde(default)]
    pub high_fidelity: bool,
}

impl DisplayConfig {
    fn default_size() -> u32 {
        500
    }

    pub fn tier(&self) -> PerformanceTier {
        PerformanceTier::from_high_fidelity(self.high_fidelity)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            high_fidelity: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub sketch: SketchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn format_f32_compact(x: f32) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() { "0".to_string() } else { s }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every key of `self`, commented out, under its section headers.
    fn commented_toml(&self) -> Option<String> {
        let text = toml::to_string_pretty(self).ok()?;
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                let mut out_line = line.to_string();
                if let Some((lhs, rhs)) = line.split_once('=') {
                    let rhs_trim = rhs.trim();
                    let has_decimal = rhs_trim.contains('.');
                    if has_decimal && !rhs_trim.contains('"') {
                        if let Ok(val) = rhs_trim.parse::<f32>() {
                            let mut formatted = Self::format_f32_compact(val);
                            if !formatted.contains('.') {
                                formatted.push_str(".0");
                            }
                            out_line = format!("{} = {}", lhs.trim(), formatted);
                        }
                    }
                }
                commented.push_str("# ");
                commented.push_str(&out_line);
                commented.push('\n');
            }
        }
        Some(commented)
    }

    /// Load `path`, falling back to defaults on any error. A missing file is
    /// created with the defaults written out commented.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            return match Self::load(path_obj) {
                Ok(cfg) => {
                    info!(path, "config loaded");
                    cfg
                }
                Err(err) => {
                    warn!("{err}. Using defaults.");
                    Self::default()
                }
            };
        }

        let default_cfg = Self::default();
        match default_cfg.commented_toml() {
            Some(text) => {
                if let Err(err) = fs::write(path_obj, text) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            None => warn!("Failed to serialize default config; continuing with defaults"),
        }
        default_cfg
    }
}

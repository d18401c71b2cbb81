//! Named favourite settings, each a complete [`SketchConfig`].

use crate::config::SketchConfig;
use crate::core::harmony::HarmonyFamily;
use crate::core::harmony::HarmonyFamily as H;
use crate::synth::oscillator::Waveform;
use crate::synth::oscillator::Waveform as W;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub density: f32,
    pub harmony: HarmonyFamily,
    pub range: f32,
    pub filter_frequency: f32,
    pub speed: f32,
    pub trail: f32,
    pub volume: f32,
    pub waveform: Waveform,
    /// Allowed to go past the tier's speed limit.
    pub speed_limit_exempt: bool,
}

#[allow(clippy::too_many_arguments)]
const fn preset(
    name: &'static str,
    density: f32,
    harmony: HarmonyFamily,
    range: f32,
    filter_frequency: f32,
    speed: f32,
    trail: f32,
    volume: f32,
    waveform: Waveform,
) -> Preset {
    Preset {
        name,
        density,
        harmony,
        range,
        filter_frequency,
        speed,
        trail,
        volume,
        waveform,
        speed_limit_exempt: false,
    }
}

pub static FAVORITES: [Preset; 10] = [
    preset("Default", 3.0, H::MajorPentatonic, 0.0, 750.0, 1.0, -55.0, 0.4, W::Square),
    Preset {
        speed_limit_exempt: true,
        ..preset(
            "Blaze's Two Brain Cells",
            2.0,
            H::Chromatic,
            3.0,
            7_500.0,
            45.0,
            -109.0,
            0.5,
            W::FmSawtooth,
        )
    },
    preset("Kaleidoscope", 10.0, H::WholeTone, 6.0, 7_728.523_5, 20.0, -5.0, 0.5, W::Triangle),
    preset("Krista", 8.0, H::LydianDominant, 0.0, 500.0, 12.0, -60.0, 0.4, W::Sine),
    preset("Ocean", 12.0, H::MajorScale, 6.0, 424.0, 0.1, -5.0, 0.65, W::Pwm),
    preset(
        "Rough in the Diamond",
        7.0,
        H::HarmonicMinor,
        3.0,
        2_095.024_8,
        4.0,
        -36.0,
        0.5,
        W::FmSawtooth,
    ),
    preset("Rust Cohle", 6.0, H::MinorScale, 0.0, 489.206_67, 16.0, -36.0, 0.8, W::Sawtooth),
    preset("Shorty", 7.0, H::HarmonicMinor, 2.0, 500.0, 3.0, -55.0, 0.65, W::Triangle),
    preset("True Neutral", 6.0, H::Chromatic, 1.0, 10_415.386, 2.0, -83.0, 0.8, W::Sine),
    preset("Waimea Canyon", 8.0, H::MinorPentatonic, 6.0, 6_657.438, 19.0, -13.0, 0.25, W::Pwm),
];

impl Preset {
    pub fn by_name(name: &str) -> Option<&'static Preset> {
        FAVORITES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The settings this favourite stands for. Picking a favourite always
    /// turns sound on.
    pub fn config(&self) -> SketchConfig {
        SketchConfig {
            density: self.density,
            harmony: self.harmony,
            range: self.range,
            filter_frequency: self.filter_frequency,
            speed: self.speed,
            sound_enabled: true,
            trail: self.trail,
            volume: self.volume,
            waveform: self.waveform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::life::tier::PerformanceTier;

    #[test]
    fn default_favourite_matches_default_config() {
        assert_eq!(FAVORITES[0].config(), SketchConfig::default());
    }

    #[test]
    fn favourites_turn_sound_on() {
        let ocean = Preset::by_name("ocean").expect("ocean");
        let cfg = ocean.config();
        assert!(cfg.sound_enabled);
        assert_eq!(cfg.harmony, HarmonyFamily::MajorScale);
        assert_eq!(cfg.waveform, Waveform::Pwm);
        assert!(FAVORITES.iter().all(|p| p.config().sound_enabled));
    }

    #[test]
    fn only_one_favourite_escapes_the_speed_limit() {
        let exempt: Vec<_> = FAVORITES.iter().filter(|p| p.speed_limit_exempt).collect();
        assert_eq!(exempt.len(), 1);
        let blaze = exempt[0]
            .config()
            .validated(PerformanceTier::Reduced, exempt[0].speed_limit_exempt);
        assert_eq!(blaze.speed, 45.0);
        let waimea = Preset::by_name("Waimea Canyon").expect("waimea");
        let cfg = waimea
            .config()
            .validated(PerformanceTier::Reduced, waimea.speed_limit_exempt);
        assert_eq!(cfg.speed, 13.0);
        let ocean = Preset::by_name("Ocean").expect("ocean");
        let cfg = ocean
            .config()
            .validated(PerformanceTier::HighFidelity, ocean.speed_limit_exempt);
        assert_eq!(cfg.density, 9.0);
    }
}

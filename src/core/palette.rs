//! Harmonic palette resolution: which notes an agent may play and the base
//! colour it is painted with, given the harmony, range and filter settings.

use crate::core::harmony::HarmonyFamily;
use crate::core::pitch::NoteName;

pub const CENTER_OCTAVE: i32 = 4;
pub const MAX_RANGE: u8 = 6;

/// Base colour of a harmony, in HSL units (hue degrees, light percent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    pub hue: f32,
    pub light: f32,
    pub color_variance: f32,
}

/// Everything an agent needs to (re)derive its note and colour.
#[derive(Debug, Clone, PartialEq)]
pub struct NotesAndColor {
    pub possible_notes: Vec<NoteName>,
    pub color_palette: ColorPalette,
}

/// Octaves fanning out from the centre: `4, 3, 5, 2, 6, 1, 7` for range 6.
///
/// Step `i` moves `ceil(i / 2)` away from the centre, up on even steps and
/// down on odd ones, so the result is order-sensitive.
pub fn create_octaves(range: u8) -> Vec<i32> {
    (0..=range as i32)
        .map(|i| {
            let offset = (i + 1) / 2;
            if i % 2 == 0 {
                CENTER_OCTAVE + offset
            } else {
                CENTER_OCTAVE - offset
            }
        })
        .collect()
}

/// Light offset contributed by the filter cutoff, roughly -15..+22 over the
/// usable cutoff range. Not guarded: a non-positive frequency yields a
/// non-finite value, so callers validate first.
pub fn light_adjustment(filter_frequency: f32) -> f32 {
    (filter_frequency.ln() * 10.0 - 70.0).floor()
}

/// Octaves are compared as numbers, so octave `1` never admits `10`.
pub fn resolve(harmony: HarmonyFamily, range: u8, filter_frequency: f32) -> NotesAndColor {
    let octaves = create_octaves(range);
    let possible_notes = harmony
        .notes()
        .into_iter()
        .filter(|note| octaves.contains(&(note.octave() as i32)))
        .collect();
    let mut color_palette = harmony.base_palette();
    color_palette.light += light_adjustment(filter_frequency);
    NotesAndColor {
        possible_notes,
        color_palette,
    }
}

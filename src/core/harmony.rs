use serde::{Deserialize, Serialize};

use crate::core::palette::ColorPalette;
use crate::core::pitch::{NoteName, chromatic_table};

/// The named scales and modes an agent can draw notes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarmonyFamily {
    Chromatic,
    Dorian,
    HarmonicMinor,
    LydianDominant,
    MajorScale,
    MajorPentatonic,
    MinorScale,
    MinorPentatonic,
    Octatonic,
    StackedFifths,
    StackedFourths,
    WholeTone,
}

enum NoteSource {
    /// Pitch classes repeated in every octave.
    Mode(&'static [u8]),
    /// A chain of fixed intervals climbing from `C0`.
    Stack(u16),
}

impl HarmonyFamily {
    pub const ALL: [HarmonyFamily; 12] = [
        HarmonyFamily::Chromatic,
        HarmonyFamily::Dorian,
        HarmonyFamily::HarmonicMinor,
        HarmonyFamily::LydianDominant,
        HarmonyFamily::MajorScale,
        HarmonyFamily::MajorPentatonic,
        HarmonyFamily::MinorScale,
        HarmonyFamily::MinorPentatonic,
        HarmonyFamily::Octatonic,
        HarmonyFamily::StackedFifths,
        HarmonyFamily::StackedFourths,
        HarmonyFamily::WholeTone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HarmonyFamily::Chromatic => "Chromatic",
            HarmonyFamily::Dorian => "Dorian",
            HarmonyFamily::HarmonicMinor => "Harmonic Minor",
            HarmonyFamily::LydianDominant => "Lydian Dominant",
            HarmonyFamily::MajorScale => "Major Scale",
            HarmonyFamily::MajorPentatonic => "Major Pentatonic",
            HarmonyFamily::MinorScale => "Minor Scale",
            HarmonyFamily::MinorPentatonic => "Minor Pentatonic",
            HarmonyFamily::Octatonic => "Octatonic",
            HarmonyFamily::StackedFifths => "Stacked Fifths",
            HarmonyFamily::StackedFourths => "Stacked Fourths",
            HarmonyFamily::WholeTone => "Whole Tone",
        }
    }

    fn source(self) -> NoteSource {
        match self {
            HarmonyFamily::Chromatic => {
                NoteSource::Mode(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11])
            }
            HarmonyFamily::Dorian => NoteSource::Mode(&[0, 2, 3, 5, 7, 9, 10]),
            HarmonyFamily::HarmonicMinor => NoteSource::Mode(&[0, 2, 3, 5, 7, 8, 11]),
            HarmonyFamily::LydianDominant => NoteSource::Mode(&[0, 2, 4, 6, 7, 9, 10]),
            HarmonyFamily::MajorScale => NoteSource::Mode(&[0, 2, 4, 5, 7, 9, 11]),
            HarmonyFamily::MajorPentatonic => NoteSource::Mode(&[0, 2, 4, 7, 9]),
            HarmonyFamily::MinorScale => NoteSource::Mode(&[0, 2, 3, 5, 7, 8, 10]),
            HarmonyFamily::MinorPentatonic => NoteSource::Mode(&[0, 3, 5, 7, 10]),
            HarmonyFamily::Octatonic => NoteSource::Mode(&[0, 1, 3, 4, 6, 7, 9, 10]),
            HarmonyFamily::StackedFifths => NoteSource::Stack(7),
            HarmonyFamily::StackedFourths => NoteSource::Stack(5),
            HarmonyFamily::WholeTone => NoteSource::Mode(&[0, 2, 4, 6, 8, 10]),
        }
    }

    /// Every note of the family across the full chromatic table, ascending.
    pub fn notes(self) -> Vec<NoteName> {
        match self.source() {
            NoteSource::Mode(classes) => chromatic_table()
                .filter(|n| classes.contains(&n.pitch_class()))
                .collect(),
            NoteSource::Stack(step) => (0..)
                .map(|k: u16| k * step)
                .map_while(NoteName::from_index)
                .collect(),
        }
    }

    /// Canonical base colour of the family. Callers get a copy.
    pub fn base_palette(self) -> ColorPalette {
        let (hue, light, color_variance) = match self {
            HarmonyFamily::Dorian => (252.0, 40.0, 25.0),
            HarmonyFamily::MinorPentatonic => (345.0, 25.0, 10.0),
            HarmonyFamily::MajorPentatonic => (184.0, 35.0, 10.0),
            HarmonyFamily::MajorScale => (184.0, 40.0, 20.0),
            HarmonyFamily::MinorScale => (345.0, 30.0, 20.0),
            HarmonyFamily::HarmonicMinor => (16.0, 27.0, 25.0),
            HarmonyFamily::Octatonic => (58.0, 37.0, 40.0),
            HarmonyFamily::Chromatic => (165.0, 31.0, 200.0),
            HarmonyFamily::LydianDominant => (270.0, 45.0, 100.0),
            HarmonyFamily::WholeTone => (200.0, 25.0, 50.0),
            HarmonyFamily::StackedFifths => (100.0, 45.0, 10.0),
            HarmonyFamily::StackedFourths => (20.0, 25.0, 10.0),
        };
        ColorPalette {
            hue,
            light,
            color_variance,
        }
    }
}

impl Default for HarmonyFamily {
    fn default() -> Self {
        Self::MajorPentatonic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(notes: &[NoteName]) -> Vec<String> {
        notes.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn chromatic_covers_whole_table() {
        assert_eq!(HarmonyFamily::Chromatic.notes().len(), 132);
    }

    #[test]
    fn major_pentatonic_in_octave_four() {
        let notes: Vec<_> = HarmonyFamily::MajorPentatonic
            .notes()
            .into_iter()
            .filter(|n| n.octave() == 4)
            .collect();
        assert_eq!(names(&notes), ["C4", "D4", "E4", "G4", "A4"]);
    }

    #[test]
    fn stacked_fifths_climb_by_seven_semitones() {
        let notes = HarmonyFamily::StackedFifths.notes();
        assert_eq!(names(&notes[..4]), ["C0", "G0", "D1", "A1"]);
        for pair in notes.windows(2) {
            assert_eq!(pair[1].pitch_index() - pair[0].pitch_index(), 7);
        }
    }

    #[test]
    fn every_family_has_a_centre_octave_note() {
        for family in HarmonyFamily::ALL {
            assert!(
                family.notes().iter().any(|n| n.octave() == 4),
                "{family:?} has no note in octave 4"
            );
        }
    }

    #[test]
    fn serde_names_are_kebab_case() {
        #[derive(Deserialize)]
        struct Wrap {
            harmony: HarmonyFamily,
        }
        let w: Wrap = toml::from_str("harmony = \"lydian-dominant\"").unwrap();
        assert_eq!(w.harmony, HarmonyFamily::LydianDominant);
    }
}

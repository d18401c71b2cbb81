//! Note names and pitch indices.
//!
//! Pitches are spelled with sharps (`C`, `C#`, ... `B`) followed by an octave
//! number. The chromatic table runs from `C0` (index 0) to `B10` (index 131).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub const MIN_OCTAVE: u8 = 0;
pub const MAX_OCTAVE: u8 = 10;
/// Highest pitch index in the chromatic table (`B10`).
pub const MAX_PITCH_INDEX: u16 = (MAX_OCTAVE as u16) * 12 + 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteParseError {
    #[error("empty note name")]
    Empty,
    #[error("unknown pitch class in {0:?}")]
    PitchClass(String),
    #[error("octave out of range in {0:?}")]
    Octave(String),
}

/// A playable pitch such as `A4` or `F#2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteName {
    octave: u8,
    pitch_class: u8,
}

impl NoteName {
    pub const fn new(pitch_class: u8, octave: u8) -> Option<Self> {
        if pitch_class >= 12 || octave > MAX_OCTAVE {
            return None;
        }
        Some(Self {
            octave,
            pitch_class,
        })
    }

    pub const fn from_index(index: u16) -> Option<Self> {
        if index > MAX_PITCH_INDEX {
            return None;
        }
        Some(Self {
            octave: (index / 12) as u8,
            pitch_class: (index % 12) as u8,
        })
    }

    pub const fn octave(self) -> u8 {
        self.octave
    }

    pub const fn pitch_class(self) -> u8 {
        self.pitch_class
    }

    /// Position in the chromatic table, `C0 = 0` through `B10 = 131`.
    pub const fn pitch_index(self) -> u16 {
        self.octave as u16 * 12 + self.pitch_class as u16
    }

    pub fn midi(self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.pitch_class as i32
    }

    /// Equal-tempered frequency with A4 = 440 Hz.
    pub fn freq_hz(self) -> f32 {
        440.0 * 2.0f32.powf((self.midi() - 69) as f32 / 12.0)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            PITCH_CLASS_NAMES[self.pitch_class as usize],
            self.octave
        )
    }
}

impl FromStr for NoteName {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NoteParseError::Empty);
        }
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| NoteParseError::Octave(s.to_string()))?;
        let (class, octave) = s.split_at(split);
        let pitch_class = PITCH_CLASS_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(class))
            .ok_or_else(|| NoteParseError::PitchClass(s.to_string()))?;
        let octave: u8 = octave
            .parse()
            .map_err(|_| NoteParseError::Octave(s.to_string()))?;
        NoteName::new(pitch_class as u8, octave).ok_or_else(|| NoteParseError::Octave(s.to_string()))
    }
}

/// Every note from `C0` to `B10`, in pitch-index order.
pub fn chromatic_table() -> impl Iterator<Item = NoteName> {
    (0..=MAX_PITCH_INDEX).filter_map(NoteName::from_index)
}

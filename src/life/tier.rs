use serde::{Deserialize, Serialize};

/// Quality/performance trade-off for the whole piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceTier {
    /// One polyphonic voice and a 60 Hz tick.
    HighFidelity,
    /// Six round-robin single-note voices and a 30 Hz tick.
    #[default]
    Reduced,
}

impl PerformanceTier {
    pub fn from_high_fidelity(high_fidelity: bool) -> Self {
        if high_fidelity {
            Self::HighFidelity
        } else {
            Self::Reduced
        }
    }

    pub fn is_high_fidelity(self) -> bool {
        self == Self::HighFidelity
    }

    pub fn frame_rate(self) -> u32 {
        match self {
            Self::HighFidelity => 60,
            Self::Reduced => 30,
        }
    }

    pub fn max_density(self) -> u32 {
        match self {
            Self::HighFidelity => 9,
            Self::Reduced => 7,
        }
    }

    pub fn max_speed(self) -> f32 {
        match self {
            Self::HighFidelity => 14.0,
            Self::Reduced => 13.0,
        }
    }
}

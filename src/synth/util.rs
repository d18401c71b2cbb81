//! Small DSP helpers shared by the voice and bus stages.

const DENORM_THRESH: f32 = 1.0e-20;

/// Flush denormals and non-finite values to zero.
#[inline(always)]
pub fn flush_denorm(x: f32) -> f32 {
    if !x.is_finite() || x.abs() < DENORM_THRESH {
        0.0
    } else {
        x
    }
}

/// Amplitude ratio for a level in dB (20*log10 convention).
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Level in dB for an amplitude ratio, floored to avoid log10(0).
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.abs().max(1.0e-10).log10()
}

/// One-pole smoothing coefficient for a time constant in milliseconds.
pub fn time_to_coeff(time_ms: f32, fs: f32) -> f32 {
    let time_s = time_ms.max(0.0) * 0.001;
    if time_s <= 0.0 {
        0.0
    } else {
        (-1.0 / (time_s * fs.max(1.0))).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip_points() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
        assert!((gain_to_db(0.5) + 6.0206).abs() < 1e-3);
    }

    #[test]
    fn flush_clears_tiny_and_nan() {
        assert_eq!(flush_denorm(1.0e-30), 0.0);
        assert_eq!(flush_denorm(f32::NAN), 0.0);
        assert_eq!(flush_denorm(0.25), 0.25);
    }
}

/// HSL colour with alpha, in the units the simulation computes with:
/// hue in degrees, saturation and light in percent, alpha in `0..=1`.
///
/// Values are kept raw (saturation can exceed 100, light can go negative) and
/// are only clamped when converted for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub hue: f32,
    pub saturation: f32,
    pub light: f32,
    pub alpha: f32,
}

impl Hsla {
    pub const fn new(hue: f32, saturation: f32, light: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            light,
            alpha,
        }
    }

    pub fn clamped_alpha(&self) -> f32 {
        if self.alpha.is_finite() {
            self.alpha.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Linear RGB in `0..=1`, after clamping to displayable HSL.
    pub fn to_rgb(&self) -> [f32; 3] {
        let h = if self.hue.is_finite() {
            self.hue.rem_euclid(360.0) / 360.0
        } else {
            0.0
        };
        let s = clamp_percent(self.saturation);
        let l = clamp_percent(self.light);
        if s <= 0.0 {
            return [l, l, l];
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        [
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        ]
    }
}

fn clamp_percent(v: f32) -> f32 {
    if v.is_finite() {
        (v / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

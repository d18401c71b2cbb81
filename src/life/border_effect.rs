use crate::core::color::Hsla;
use crate::render::RenderSurface;

pub const RING_COUNT: usize = 20;
pub const START_ALPHA: i32 = 200;
pub const ALPHA_STEP: i32 = 5;
/// Per-ring alpha falloff, in the same thousandths as `color_alpha`.
const RING_ALPHA_FALLOFF: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Fading ring burst left on the wall where an agent bounced.
///
/// `color_alpha` is in thousandths of full opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderEffect {
    x: f32,
    y: f32,
    color_alpha: i32,
    hue: f32,
    saturation: f32,
    light: f32,
    diameter: f32,
}

/// Where and how a wall hit happened, as seen by the agent that hit it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSeed {
    /// Agent centre at the moment of the hit.
    pub position: (f32, f32),
    pub axis: Axis,
    /// The `border_length` wall rather than the `0` wall.
    pub hit_high: bool,
    pub border_length: f32,
    pub diameter: f32,
    pub hue: f32,
    pub saturation: f32,
    pub light: f32,
}

impl BorderEffect {
    /// Spawn snapped onto the wall that was hit on `seed.axis`.
    pub fn spawn(seed: EffectSeed) -> Self {
        let wall = if seed.hit_high { seed.border_length } else { 0.0 };
        let (x, y) = seed.position;
        let (x, y) = match seed.axis {
            Axis::X => (wall, y),
            Axis::Y => (x, wall),
        };
        Self {
            x,
            y,
            color_alpha: START_ALPHA,
            hue: seed.hue,
            saturation: seed.saturation,
            light: seed.light,
            diameter: seed.diameter,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn color_alpha(&self) -> i32 {
        self.color_alpha
    }

    pub fn light(&self) -> f32 {
        self.light
    }

    pub fn is_dead(&self) -> bool {
        self.color_alpha < 0
    }

    /// Draw the rings, growing from 1px to the agent's diameter while fading,
    /// then fade the whole effect one step.
    pub fn run(&mut self, surface: &mut dyn RenderSurface) {
        let increment = self.diameter / RING_COUNT as f32;
        let mut ring_diameter = 1.0;
        for i in 0..RING_COUNT {
            let current_alpha = self.color_alpha as f32 - i as f32 * RING_ALPHA_FALLOFF;
            if current_alpha > 0.0 {
                surface.fill(Hsla::new(
                    self.hue,
                    self.saturation,
                    self.light,
                    current_alpha / 1000.0,
                ));
                surface.draw_ellipse(self.x, self.y, ring_diameter);
            }
            ring_diameter += increment;
        }
        self.color_alpha -= ALPHA_STEP;
    }
}

//! Drawing capability consumed by the simulation core.

pub mod canvas;
pub mod recording;

pub use canvas::PixelCanvas;
pub use recording::{RecordingSurface, SurfaceOp};

use crate::core::color::Hsla;

/// A square drawing target driven once per simulation tick.
///
/// Mirrors a minimal immediate-mode sketch API: set a fill colour, then draw
/// filled ellipses with it. Coordinates are in canvas pixels.
pub trait RenderSurface {
    fn create_canvas(&mut self, size: u32);
    fn set_frame_rate(&mut self, fps: u32);
    /// Paint black over the whole canvas with opacity `alpha / 255`.
    fn clear_with_alpha(&mut self, alpha: f32);
    fn fill(&mut self, color: Hsla);
    fn draw_ellipse(&mut self, x: f32, y: f32, diameter: f32);
}

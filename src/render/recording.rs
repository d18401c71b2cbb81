use crate::core::color::Hsla;
use crate::render::RenderSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    CreateCanvas(u32),
    SetFrameRate(u32),
    Clear(f32),
    Fill(Hsla),
    Ellipse { x: f32, y: f32, diameter: f32 },
}

/// Surface that keeps a log of every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_log(&mut self) {
        self.ops.clear();
    }

    pub fn ellipses(&self) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::Ellipse { x, y, diameter } => Some((*x, *y, *diameter)),
            _ => None,
        })
    }

    pub fn ellipse_count(&self) -> usize {
        self.ellipses().count()
    }

    pub fn fills(&self) -> impl Iterator<Item = &Hsla> + '_ {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::Fill(c) => Some(c),
            _ => None,
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn create_canvas(&mut self, size: u32) {
        self.ops.push(SurfaceOp::CreateCanvas(size));
    }

    fn set_frame_rate(&mut self, fps: u32) {
        self.ops.push(SurfaceOp::SetFrameRate(fps));
    }

    fn clear_with_alpha(&mut self, alpha: f32) {
        self.ops.push(SurfaceOp::Clear(alpha));
    }

    fn fill(&mut self, color: Hsla) {
        self.ops.push(SurfaceOp::Fill(color));
    }

    fn draw_ellipse(&mut self, x: f32, y: f32, diameter: f32) {
        self.ops.push(SurfaceOp::Ellipse { x, y, diameter });
    }
}

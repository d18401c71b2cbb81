use crate::core::color::Hsla;
use crate::render::RenderSurface;

/// Software raster backing the sketch window.
///
/// Pixels are opaque RGB in `0..=1`; transparency only exists in the fill
/// colour and in `clear_with_alpha`, which is what leaves motion trails.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    size: u32,
    frame_rate: u32,
    pixels: Vec<[f32; 3]>,
    fill_rgb: [f32; 3],
    fill_alpha: f32,
}

impl PixelCanvas {
    pub fn new(size: u32) -> Self {
        let mut canvas = Self {
            size: 0,
            frame_rate: 30,
            pixels: Vec::new(),
            fill_rgb: [1.0, 1.0, 1.0],
            fill_alpha: 1.0,
        };
        canvas.create_canvas(size);
        canvas
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.pixels.get((y * self.size + x) as usize).copied()
    }

    /// Mean brightness over the whole canvas, handy for headless summaries.
    pub fn mean_luma(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let sum: f32 = self
            .pixels
            .iter()
            .map(|[r, g, b]| 0.2126 * r + 0.7152 * g + 0.0722 * b)
            .sum();
        sum / self.pixels.len() as f32
    }

    /// Row-major RGBA8, ready for texture upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            for c in px {
                out.push((c.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
            out.push(255);
        }
        out
    }
}

impl RenderSurface for PixelCanvas {
    fn create_canvas(&mut self, size: u32) {
        self.size = size;
        self.pixels = vec![[0.0; 3]; (size as usize) * (size as usize)];
    }

    fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.max(1);
    }

    fn clear_with_alpha(&mut self, alpha: f32) {
        let a = if alpha.is_finite() {
            (alpha / 255.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let keep = 1.0 - a;
        for px in self.pixels.iter_mut() {
            for c in px.iter_mut() {
                *c *= keep;
            }
        }
    }

    fn fill(&mut self, color: Hsla) {
        self.fill_rgb = color.to_rgb();
        self.fill_alpha = color.clamped_alpha();
    }

    fn draw_ellipse(&mut self, x: f32, y: f32, diameter: f32) {
        if self.size == 0 || self.fill_alpha <= 0.0 || !(diameter > 0.0) {
            return;
        }
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let r = diameter * 0.5;
        let r2 = r * r;
        let max = self.size as f32 - 1.0;
        let x0 = (x - r).floor().clamp(0.0, max) as u32;
        let x1 = (x + r).ceil().clamp(0.0, max) as u32;
        let y0 = (y - r).floor().clamp(0.0, max) as u32;
        let y1 = (y + r).ceil().clamp(0.0, max) as u32;
        let a = self.fill_alpha;
        let src = self.fill_rgb;
        for py in y0..=y1 {
            let dy = py as f32 + 0.5 - y;
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - x;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let dst = &mut self.pixels[(py * self.size + px) as usize];
                for (d, s) in dst.iter_mut().zip(src.iter()) {
                    *d = *d * (1.0 - a) + *s * a;
                }
            }
        }
    }
}

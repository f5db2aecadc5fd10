//! Pixel-based spectrum renderer
//!
//! Bars and labels render into an owned RGB pixel buffer (`Canvas`). Output
//! backends convert the canvas to their native format at presentation time.

pub mod bars;
pub mod labels;

use crate::color::ColorScheme;

/// Owned RGB pixel buffer, 3 bytes per pixel in row-major order.
///
/// Allocated once and fully overwritten every frame; never resized while
/// the session runs.
pub struct Canvas {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0u8; width * height * 3],
            width,
            height,
        }
    }

    /// Clear the canvas to black.
    #[inline]
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Write a pixel at (x, y). Out-of-bounds writes are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y * self.width + x) * 3;
        self.data[idx] = r;
        self.data[idx + 1] = g;
        self.data[idx + 2] = b;
    }

    /// Read the RGB values at (x, y). Out-of-bounds reads are black.
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0);
        }
        let idx = (y * self.width + x) * 3;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}

/// Parameters controlling how a frame is rendered.
pub struct RenderParams<'a> {
    pub color_scheme: &'a ColorScheme,
    pub labels: bool,
    pub label_step_hz: f32,
    /// Frequency of the first displayed bin.
    pub freq_lo: f32,
    /// Frequency of the last displayed bin.
    pub freq_hi: f32,
}

/// Main entry point: render one magnitude sequence to the canvas.
pub fn render_frame(canvas: &mut Canvas, magnitudes: &[f32], params: &RenderParams) {
    canvas.clear();
    bars::render_bars(canvas, magnitudes, params);
    if params.labels {
        labels::render_labels(canvas, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_pixel_out_of_bounds_is_ignored() {
        let mut canvas = Canvas::new(4, 4);
        canvas.put_pixel(100, 100, 255, 255, 255);
        assert!(canvas.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_resets_every_pixel() {
        let mut canvas = Canvas::new(8, 8);
        canvas.put_pixel(3, 3, 10, 20, 30);
        assert_eq!(canvas.get_pixel(3, 3), (10, 20, 30));
        canvas.clear();
        assert_eq!(canvas.get_pixel(3, 3), (0, 0, 0));
    }
}

//! Vertical bar rendering for the magnitude sequence.

use super::{Canvas, RenderParams};

/// Width in pixels of one bar slot for `bins` magnitudes on a canvas
/// `canvas_width` pixels wide. Never zero.
pub fn slot_width(canvas_width: usize, bins: usize) -> usize {
    (canvas_width / bins.max(1)).max(1)
}

/// Draw one filled bar per magnitude, bottom-anchored. Bars that would start
/// past the right edge are skipped, so drawn slots never exceed the canvas.
pub fn render_bars(canvas: &mut Canvas, magnitudes: &[f32], params: &RenderParams) {
    if magnitudes.is_empty() {
        return;
    }

    let slot = slot_width(canvas.width, magnitudes.len());

    for (i, &value) in magnitudes.iter().enumerate() {
        let x_start = i * slot;
        if x_start >= canvas.width {
            break;
        }

        let bar_height = (value.clamp(0.0, 1.0) * canvas.height as f32).round() as usize;
        let position = i as f32 / magnitudes.len() as f32;

        for y_offset in 0..bar_height.min(canvas.height) {
            let y = canvas.height - 1 - y_offset;
            let intensity = y_offset as f32 / canvas.height as f32;
            let (r, g, b) = params.color_scheme.get_color(position, intensity);

            for bx in 0..slot {
                canvas.put_pixel(x_start + bx, y, r, g, b);
            }
        }
    }
}

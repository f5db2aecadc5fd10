//! Frequency-axis labels.
//!
//! Each round-number marker inside the displayed span gets its frequency
//! drawn as rotated 8x8 bitmap text rising from the bottom edge. Only set
//! glyph bits are composited, so labels overlay bars without erasing them,
//! and everything is clipped to the canvas bounds.

use super::{Canvas, RenderParams};

const LABEL_COLOR: (u8, u8, u8) = (180, 180, 180);
const GLYPH_SIZE: usize = 8;
/// Gap between the bottom edge and the first glyph.
const BOTTOM_MARGIN: usize = 4;

pub fn render_labels(canvas: &mut Canvas, params: &RenderParams) {
    let span = params.freq_hi - params.freq_lo;
    if span <= 0.0 || canvas.width == 0 || canvas.height == 0 {
        return;
    }

    for freq in markers(params.freq_lo, params.freq_hi, params.label_step_hz) {
        let x = marker_x(freq, params.freq_lo, params.freq_hi, canvas.width);
        let text = format!("{}", freq.round() as u32);
        let y = canvas.height.saturating_sub(BOTTOM_MARGIN + 1);
        draw_rotated_text(canvas, x as isize, y as isize, &text);
    }
}

/// Round-number marker frequencies inside [freq_lo, freq_hi].
pub fn markers(freq_lo: f32, freq_hi: f32, step: f32) -> Vec<f32> {
    let mut out = Vec::new();
    if step <= 0.0 {
        return out;
    }
    let mut f = (freq_lo / step).ceil() * step;
    while f <= freq_hi {
        out.push(f);
        f += step;
    }
    out
}

/// X position of a marker by linear interpolation over the displayed span.
pub fn marker_x(freq: f32, freq_lo: f32, freq_hi: f32, width: usize) -> usize {
    let t = (freq - freq_lo) / (freq_hi - freq_lo);
    (t * (width.saturating_sub(1)) as f32).round() as usize
}

/// Draw `text` rotated 90 degrees counter-clockwise, reading bottom-to-top,
/// with the first glyph anchored at (x, y). Partially or fully off-canvas
/// positions are clipped pixel by pixel.
fn draw_rotated_text(canvas: &mut Canvas, x: isize, y: isize, text: &str) {
    for (ci, ch) in text.chars().enumerate() {
        let Some(bitmap) = digit_bitmap(ch) else {
            continue;
        };
        let base_y = y - (ci * GLYPH_SIZE) as isize;

        for (row, &bits) in bitmap.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (bits >> (7 - col)) & 1 == 1 {
                    let px = x + row as isize;
                    let py = base_y - col as isize;
                    if px >= 0 && py >= 0 {
                        canvas.put_pixel(px as usize, py as usize, LABEL_COLOR.0, LABEL_COLOR.1, LABEL_COLOR.2);
                    }
                }
            }
        }
    }
}

/// 8x8 bitmap glyphs, one byte per row, MSB leftmost.
fn digit_bitmap(ch: char) -> Option<[u8; 8]> {
    Some(match ch {
        '0' => [0x3C, 0x42, 0x46, 0x5A, 0x62, 0x42, 0x3C, 0x00],
        '1' => [0x08, 0x18, 0x28, 0x08, 0x08, 0x08, 0x3E, 0x00],
        '2' => [0x3C, 0x42, 0x02, 0x0C, 0x30, 0x40, 0x7E, 0x00],
        '3' => [0x3C, 0x42, 0x02, 0x1C, 0x02, 0x42, 0x3C, 0x00],
        '4' => [0x04, 0x0C, 0x14, 0x24, 0x7E, 0x04, 0x04, 0x00],
        '5' => [0x7E, 0x40, 0x7C, 0x02, 0x02, 0x42, 0x3C, 0x00],
        '6' => [0x1C, 0x20, 0x40, 0x7C, 0x42, 0x42, 0x3C, 0x00],
        '7' => [0x7E, 0x02, 0x04, 0x08, 0x10, 0x10, 0x10, 0x00],
        '8' => [0x3C, 0x42, 0x42, 0x3C, 0x42, 0x42, 0x3C, 0x00],
        '9' => [0x3C, 0x42, 0x42, 0x3E, 0x02, 0x04, 0x38, 0x00],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorScheme;

    fn params(labels: bool) -> RenderParams<'static> {
        RenderParams {
            color_scheme: &ColorScheme::Mono,
            labels,
            label_step_hz: 1000.0,
            freq_lo: 60.0,
            freq_hi: 1400.0,
        }
    }

    #[test]
    fn markers_are_round_multiples_inside_the_span() {
        assert_eq!(markers(60.0, 1400.0, 1000.0), vec![1000.0]);
        assert_eq!(markers(20.0, 3500.0, 1000.0), vec![1000.0, 2000.0, 3000.0]);
        assert!(markers(20.0, 500.0, 1000.0).is_empty());
    }

    #[test]
    fn marker_at_span_edges_maps_to_canvas_edges() {
        assert_eq!(marker_x(60.0, 60.0, 1400.0, 1000), 0);
        assert_eq!(marker_x(1400.0, 60.0, 1400.0, 1000), 999);
    }

    #[test]
    fn labels_near_the_edge_are_clipped_without_panic() {
        let mut canvas = Canvas::new(20, 10);
        draw_rotated_text(&mut canvas, 18, 8, "20000");
        draw_rotated_text(&mut canvas, -5, -5, "1000");
        draw_rotated_text(&mut canvas, 1000, 1000, "500");
    }

    #[test]
    fn labels_composite_over_bars_without_erasing_them() {
        let mut canvas = Canvas::new(100, 100);
        // A solid bar column under the label position.
        for y in 0..100 {
            for x in 0..100 {
                canvas.put_pixel(x, y, 10, 10, 10);
            }
        }
        render_labels(&mut canvas, &params(true));
        // Unset glyph bits leave the underlying pixel intact.
        assert!((0..100).any(|x| (0..100).any(|y| canvas.get_pixel(x, y) == (10, 10, 10))));
        // Set glyph bits wrote the label color somewhere.
        assert!((0..100).any(|x| (0..100).any(|y| canvas.get_pixel(x, y) == LABEL_COLOR)));
    }

    #[test]
    fn degenerate_span_draws_nothing() {
        let mut canvas = Canvas::new(50, 50);
        let p = RenderParams {
            freq_lo: 500.0,
            freq_hi: 500.0,
            ..params(true)
        };
        render_labels(&mut canvas, &p);
        assert!(canvas.data.iter().all(|&b| b == 0));
    }
}

//! Heat-map raster of a `ScanMatrix` with a vertical colour bar, encoded as PNG.
//! Colours follow the "hot" map (black → red → yellow → white), auto-scaled to
//! the matrix min/max. The PNG carries the title and the signal range as
//! text chunks.

use std::error::Error;

use plotters::prelude::*;
use png::{BitDepth, ColorType, Encoder};

use crate::config::HeatmapConfig;
use crate::core::scan::ScanMatrix;

pub type RenderError = Box<dyn Error + Send + Sync>;

const MARGIN: u32 = 16;
const BAR_GAP: u32 = 16;
const BAR_WIDTH: u32 = 24;
const BAR_STEPS: u32 = 64;
const TICK: u32 = 6;

/// Smallest canvas that leaves at least one pixel for the grid.
pub const MIN_WIDTH: u32 = 2 * MARGIN + BAR_GAP + BAR_WIDTH + 1;
pub const MIN_HEIGHT: u32 = 2 * MARGIN + 1;
/// Largest accepted side, in pixels.
pub const MAX_SIDE: u32 = 4096;

pub const TITLE: &str = "Ultrasound Image";
pub const RANGE_KEY: &str = "Signal Intensity";

/// "hot" colour map for `v` in [0, 1].
pub fn hot(v: f64) -> [u8; 3] {
    let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    let r = (v / 0.375).min(1.0);
    let g = ((v - 0.375) / 0.375).clamp(0.0, 1.0);
    let b = ((v - 0.75) / 0.25).clamp(0.0, 1.0);
    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}

/// Map every cell into [0, 1] against the matrix range. A flat matrix maps to 0.
pub fn normalize(matrix: &ScanMatrix) -> Vec<f64> {
    let Some((lo, hi)) = matrix.min_max() else {
        return Vec::new();
    };
    let span = hi - lo;
    matrix
        .values()
        .iter()
        .map(|&v| if span > 0.0 { (v - lo) / span } else { 0.0 })
        .collect()
}

#[derive(Clone, Copy, Debug)]
pub struct HeatmapRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for HeatmapRenderer {
    fn default() -> Self {
        Self::from(&HeatmapConfig::default())
    }
}

impl From<&HeatmapConfig> for HeatmapRenderer {
    fn from(cfg: &HeatmapConfig) -> Self {
        Self {
            width: cfg.width,
            height: cfg.height,
        }
    }
}

impl HeatmapRenderer {
    /// Packed RGB8 pixels, `width * height * 3` bytes.
    pub fn render_rgb(&self, matrix: &ScanMatrix) -> Result<Vec<u8>, RenderError> {
        let (w, h) = (self.width, self.height);
        if w < MIN_WIDTH || h < MIN_HEIGHT {
            return Err(format!("heat-map canvas {w}x{h} is too small").into());
        }
        if w > MAX_SIDE || h > MAX_SIDE {
            return Err(format!("heat-map canvas {w}x{h} exceeds {MAX_SIDE} pixels per side").into());
        }
        let len = (w as usize)
            .checked_mul(h as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| format!("heat-map canvas {w}x{h} overflows"))?;
        let mut buf = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            root.fill(&WHITE)?;

            let grid_w = (w - 2 * MARGIN - BAR_GAP - BAR_WIDTH) as i32;
            let grid_h = (h - 2 * MARGIN) as i32;
            let x0 = MARGIN as i32;
            let y0 = MARGIN as i32;

            let (rows, cols) = (matrix.rows(), matrix.cols());
            let norm = normalize(matrix);
            for r in 0..rows {
                for c in 0..cols {
                    let [cr, cg, cb] = hot(norm[r * cols + c]);
                    let left = x0 + grid_w * c as i32 / cols as i32;
                    let right = x0 + grid_w * (c as i32 + 1) / cols as i32;
                    let top = y0 + grid_h * r as i32 / rows as i32;
                    let bottom = y0 + grid_h * (r as i32 + 1) / rows as i32;
                    root.draw(&Rectangle::new(
                        [(left, top), (right, bottom)],
                        RGBColor(cr, cg, cb).filled(),
                    ))?;
                }
            }

            // Colour bar, maximum at the top.
            let bx = x0 + grid_w + BAR_GAP as i32;
            for s in 0..BAR_STEPS as i32 {
                let v = 1.0 - s as f64 / (BAR_STEPS - 1) as f64;
                let [cr, cg, cb] = hot(v);
                let top = y0 + grid_h * s / BAR_STEPS as i32;
                let bottom = y0 + grid_h * (s + 1) / BAR_STEPS as i32;
                root.draw(&Rectangle::new(
                    [(bx, top), (bx + BAR_WIDTH as i32, bottom)],
                    RGBColor(cr, cg, cb).filled(),
                ))?;
            }
            root.draw(&Rectangle::new(
                [(bx, y0), (bx + BAR_WIDTH as i32, y0 + grid_h)],
                BLACK.stroke_width(1),
            ))?;
            // Ticks on the right edge: max at the top, min at the bottom.
            let tx = bx + BAR_WIDTH as i32;
            for y in [y0, y0 + grid_h - 1] {
                root.draw(&PathElement::new(
                    vec![(tx, y), (tx + TICK as i32, y)],
                    BLACK.stroke_width(1),
                ))?;
            }

            root.present()?;
        }
        Ok(buf)
    }

    pub fn render_png(&self, matrix: &ScanMatrix) -> Result<Vec<u8>, RenderError> {
        let rgb = self.render_rgb(matrix)?;
        let (lo, hi) = matrix.min_max().unwrap_or((0.0, 0.0));

        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, self.width, self.height);
        encoder.set_color(ColorType::Rgb);
        encoder.set_depth(BitDepth::Eight);
        encoder.add_text_chunk("Title".to_string(), TITLE.to_string())?;
        encoder.add_text_chunk(RANGE_KEY.to_string(), format!("{lo:.3} .. {hi:.3}"))?;
        encoder.write_header()?.write_image_data(&rgb)?;
        Ok(out)
    }
}

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::raster::RasterImage;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Logical canvas edge, independent of how large the canvas is displayed.
pub const CANVAS_SIZE: u32 = 280;
pub const STROKE_WIDTH: f32 = 12.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    #[error("invalid display size {width}x{height}")]
    InvalidDisplaySize { width: f32, height: f32 },
    #[error("invalid pointer position ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },
}

/// One pointer or touch position as the front end sees it: relative to the
/// canvas element's top-left corner, in device pixels, together with the
/// element's displayed size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub display_width: f32,
    pub display_height: f32,
}

impl PointerSample {
    /// Sample on a canvas displayed at its logical size.
    pub fn logical(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            display_width: CANVAS_SIZE as f32,
            display_height: CANVAS_SIZE as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalPoint {
    pub x: f32,
    pub y: f32,
}

pub struct DrawingSurface {
    pixels: RgbaImage,
    stroke_width: f32,
    last_point: Option<LogicalPoint>,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface {
    pub fn new() -> Self {
        Self::with_size(CANVAS_SIZE, CANVAS_SIZE)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, BACKGROUND),
            stroke_width: STROKE_WIDTH,
            last_point: None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.last_point.is_some()
    }

    /// Maps a device-space sample onto the logical canvas using the ratio
    /// between logical and displayed size.
    pub fn to_logical(&self, sample: PointerSample) -> Result<LogicalPoint, CanvasError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(sample.display_width) || !valid(sample.display_height) {
            return Err(CanvasError::InvalidDisplaySize {
                width: sample.display_width,
                height: sample.display_height,
            });
        }
        if !sample.x.is_finite() || !sample.y.is_finite() {
            return Err(CanvasError::InvalidPosition {
                x: sample.x,
                y: sample.y,
            });
        }

        let scale_x = self.pixels.width() as f32 / sample.display_width;
        let scale_y = self.pixels.height() as f32 / sample.display_height;
        Ok(LogicalPoint {
            x: sample.x * scale_x,
            y: sample.y * scale_y,
        })
    }

    pub fn begin_stroke(&mut self, sample: PointerSample) -> Result<(), CanvasError> {
        let point = self.to_logical(sample)?;
        self.stamp_segment(point, point);
        self.last_point = Some(point);
        log_debug!("stroke began at ({:.1}, {:.1})", point.x, point.y);
        Ok(())
    }

    /// Draws a segment from the previous point. Ignored when no stroke is in
    /// progress (pointer moving over the canvas without a button held).
    pub fn extend_stroke(&mut self, sample: PointerSample) -> Result<(), CanvasError> {
        let point = self.to_logical(sample)?;
        let Some(previous) = self.last_point else {
            return Ok(());
        };
        self.stamp_segment(previous, point);
        self.last_point = Some(point);
        Ok(())
    }

    /// Finishes the current stroke and snapshots the whole canvas, earlier
    /// strokes included. `None` if no stroke was in progress.
    pub fn end_stroke(&mut self) -> Option<RasterImage> {
        self.last_point.take()?;
        log_debug!("stroke ended");
        Some(self.snapshot())
    }

    pub fn snapshot(&self) -> RasterImage {
        RasterImage::new(self.pixels.clone())
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.last_point = None;
    }

    /// Paints a capsule (segment swept by a disc) so consecutive segments
    /// meet with round joins and the stroke ends get round caps. Edge pixels
    /// get partial coverage, and ink only ever darkens a pixel.
    fn stamp_segment(&mut self, from: LogicalPoint, to: LogicalPoint) {
        let radius = self.stroke_width / 2.0;
        let (width, height) = self.pixels.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let min_x = (from.x.min(to.x) - radius - 1.0).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - radius - 1.0).floor().max(0.0) as u32;
        let max_x = (from.x.max(to.x) + radius + 1.0).ceil().min((width - 1) as f32);
        let max_y = (from.y.max(to.y) + radius + 1.0).ceil().min((height - 1) as f32);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let center = LogicalPoint {
                    x: px as f32 + 0.5,
                    y: py as f32 + 0.5,
                };
                let distance = distance_to_segment(center, from, to);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let pixel = self.pixels.get_pixel_mut(px, py);
                for channel in pixel.0.iter_mut().take(3) {
                    *channel = (*channel as f32 * (1.0 - coverage)).round() as u8;
                }
                pixel.0[3] = 255;
            }
        }
    }
}

fn distance_to_segment(p: LogicalPoint, a: LogicalPoint, b: LogicalPoint) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

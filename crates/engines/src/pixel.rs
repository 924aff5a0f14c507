//! CPU rasterization of a [`DrawList`] into an RGBA8 buffer.
//!
//! This is a reference renderer for snapshots and tests, not a match for a
//! browser's antialiased output. Shape coverage comes from `imageproc`,
//! drawn into a scratch mask; colors accumulate in `f64` and are quantized
//! once at the end, so faint additive particles still add up.
//!
//! - points: soft discs, `smoothstep(0.5, 0.05, d)` falloff like a GPU point
//!   sprite, where `d` is the distance from the center in sprite diameters
//! - circles: hard discs
//! - polygons: filled rings, paint sampled per row
//! - polylines: round-jointed strokes, each covered pixel blended once

use std::ops::Range;

use glam::DVec2;
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use vector_field_core::color::{Srgb, BACKGROUND};
use vector_field_core::draw::{BlendMode, DrawCommand, DrawList, Paint};
use vector_field_core::error::EngineError;

const COVERED: Luma<u8> = Luma([255]);
/// Grid coordinates stay inside this band so imageproc's `i32` math cannot
/// overflow. Discs beyond it are skipped; polygon vertices are clamped.
const GUARD: f64 = 65_536.0;
/// Pixels scanned past a shape's bounds to catch grid rounding.
const MARGIN: f64 = 2.0;

/// Floating-point RGB canvas with an opaque background.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    rgb: Vec<[f64; 3]>,
    /// Coverage of the shape being painted; zeroed again after each shape.
    mask: GrayImage,
}

impl Raster {
    /// Creates a raster filled with `background`.
    ///
    /// Returns `EngineError::InvalidDimensions` for a zero or overflowing size.
    pub fn new(width: usize, height: usize, background: Srgb) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let w = u32::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
        let h = u32::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4).map(|_| n))
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            rgb: vec![[background.r, background.g, background.b]; len],
            mask: GrayImage::new(w, h),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Color at `(x, y)` before quantization.
    pub fn pixel(&self, x: usize, y: usize) -> [f64; 3] {
        self.rgb[y * self.width + x]
    }

    /// Paints every command of `list` in order.
    pub fn paint(&mut self, list: &DrawList) {
        for command in list.commands() {
            match command {
                DrawCommand::Point {
                    x,
                    y,
                    size,
                    color,
                    alpha,
                } => self.point(*x, *y, *size, *color, *alpha, list.blend),
                DrawCommand::Circle {
                    x,
                    y,
                    radius,
                    color,
                    alpha,
                } => self.circle(*x, *y, *radius, *color, *alpha, list.blend),
                DrawCommand::Polygon { points, paint } => self.polygon(points, paint, list.blend),
                DrawCommand::Polyline {
                    points,
                    color,
                    alpha,
                    width,
                } => self.polyline(points, *color, *alpha, *width, list.blend),
            }
        }
    }

    /// Quantizes to RGBA8 with opaque alpha.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.rgb
            .iter()
            .flat_map(|&c| {
                let [r, g, b] = Srgb::new(c[0], c[1], c[2]).to_rgb8();
                [r, g, b, 255u8]
            })
            .collect()
    }

    fn blend(&mut self, x: usize, y: usize, color: Srgb, alpha: f64, mode: BlendMode) {
        if alpha <= 0.0 {
            return;
        }
        let a = alpha.min(1.0);
        let dst = &mut self.rgb[y * self.width + x];
        let src = [color.r, color.g, color.b];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = match mode {
                BlendMode::Normal => *d * (1.0 - a) + s * a,
                BlendMode::Additive => (*d + s * a).min(1.0),
            };
        }
    }

    /// Pixel window around `[lo, hi]` plus the rounding margin, clipped to
    /// the canvas. `None` when the shape is entirely offscreen.
    fn window(&self, lo: DVec2, hi: DVec2) -> Option<(Range<u32>, Range<u32>)> {
        let clip = |lo: f64, hi: f64, limit: usize| {
            let start = (lo - MARGIN).floor().max(0.0);
            let end = (hi + MARGIN).ceil().min(limit as f64);
            (start < end).then(|| start as u32..end as u32)
        };
        Some((clip(lo.x, hi.x, self.width)?, clip(lo.y, hi.y, self.height)?))
    }

    /// Blends every masked pixel of `window` with the color and alpha
    /// `shade` picks for it, clearing the mask as it goes.
    fn flush<F>(&mut self, window: (Range<u32>, Range<u32>), mode: BlendMode, mut shade: F)
    where
        F: FnMut(u32, u32) -> (Srgb, f64),
    {
        let (xs, ys) = window;
        for y in ys {
            for x in xs.clone() {
                let cell = self.mask.get_pixel_mut(x, y);
                if cell.0[0] == 0 {
                    continue;
                }
                cell.0[0] = 0;
                let (color, alpha) = shade(x, y);
                self.blend(x as usize, y as usize, color, alpha, mode);
            }
        }
    }

    fn point(&mut self, cx: f64, cy: f64, size: f64, color: Srgb, alpha: f64, mode: BlendMode) {
        if !in_guard(cx, cy, size) || size <= 0.0 {
            return;
        }
        let center = DVec2::new(cx, cy);
        let r = size * 0.5;
        let Some(window) = self.window(center - r, center + r) else {
            return;
        };
        draw_filled_circle_mut(&mut self.mask, (grid(cx), grid(cy)), r.ceil() as i32, COVERED);
        self.flush(window, mode, |x, y| {
            let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5).distance(center) / size;
            let weight = if d > 0.5 { 0.0 } else { smoothstep(0.5, 0.05, d) };
            (color, alpha * weight)
        });
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64, color: Srgb, alpha: f64, mode: BlendMode) {
        if !in_guard(cx, cy, radius) || radius <= 0.0 {
            return;
        }
        let center = DVec2::new(cx, cy);
        let Some(window) = self.window(center - radius, center + radius) else {
            return;
        };
        draw_filled_circle_mut(&mut self.mask, (grid(cx), grid(cy)), radius.round() as i32, COVERED);
        self.flush(window, mode, |_, _| (color, alpha));
    }

    fn polygon(&mut self, points: &[DVec2], paint: &Paint, mode: BlendMode) {
        if points.len() < 3 || !points.iter().all(|p| p.is_finite()) {
            return;
        }
        let (lo, hi) = extent(points);
        let Some(window) = self.window(lo, hi) else {
            return;
        };
        let Some(ring) = ring(points) else {
            return;
        };
        draw_polygon_mut(&mut self.mask, &ring, COVERED);
        self.flush(window, mode, |_, y| paint.sample(y as f64 + 0.5));
    }

    fn polyline(&mut self, points: &[DVec2], color: Srgb, alpha: f64, width: f64, mode: BlendMode) {
        if points.len() < 2 || !width.is_finite() || width <= 0.0 || width >= GUARD {
            return;
        }
        if !points.iter().all(|p| p.is_finite()) {
            return;
        }
        let half = width * 0.5;
        let (lo, hi) = extent(points);
        let Some(window) = self.window(lo - half, hi + half) else {
            return;
        };
        if half < 1.0 {
            for seg in points.windows(2) {
                let (a, b) = (grid_point(seg[0]), grid_point(seg[1]));
                draw_line_segment_mut(
                    &mut self.mask,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    COVERED,
                );
            }
        } else {
            // one quad per segment, a disc on every vertex for round joins
            for seg in points.windows(2) {
                let (a, b) = (seg[0], seg[1]);
                let normal = (b - a).perp().normalize_or_zero() * half;
                if normal == DVec2::ZERO {
                    continue;
                }
                if let Some(quad) = ring(&[a + normal, b + normal, b - normal, a - normal]) {
                    draw_polygon_mut(&mut self.mask, &quad, COVERED);
                }
            }
            let radius = half.round() as i32;
            for &p in points {
                let joint = grid_point(p);
                draw_filled_circle_mut(&mut self.mask, (joint.x, joint.y), radius, COVERED);
            }
        }
        self.flush(window, mode, |_, _| (color, alpha));
    }
}

/// Canvas coordinate to the pixel whose center is nearest, clamped to the
/// guard band.
fn grid(v: f64) -> i32 {
    (v - 0.5).round().clamp(-GUARD, GUARD) as i32
}

fn grid_point(p: DVec2) -> Point<i32> {
    Point::new(grid(p.x), grid(p.y))
}

fn in_guard(cx: f64, cy: f64, extent: f64) -> bool {
    cx.abs() < GUARD && cy.abs() < GUARD && extent < GUARD
}

/// Bounding corners of a non-empty point set.
fn extent(points: &[DVec2]) -> (DVec2, DVec2) {
    points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(lo, hi), &p| (lo.min(p), hi.max(p)),
    )
}

/// Grid vertices for `draw_polygon_mut`, which rejects a ring whose last
/// vertex repeats the first.
fn ring(points: &[DVec2]) -> Option<Vec<Point<i32>>> {
    let mut ring: Vec<Point<i32>> = points.iter().map(|&p| grid_point(p)).collect();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    (ring.len() >= 3).then_some(ring)
}

/// Hermite step from `edge0` to `edge1`; the edges may be reversed.
fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rasterizes `list` onto the page background and returns RGBA8 bytes.
///
/// The buffer length is `width * height * 4`.
pub fn rasterize(list: &DrawList, width: usize, height: usize) -> Result<Vec<u8>, EngineError> {
    let mut raster = Raster::new(width, height, BACKGROUND)?;
    raster.paint(list);
    Ok(raster.to_rgba8())
}

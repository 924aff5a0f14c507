//! Backend-neutral draw commands.
//!
//! Engines describe a frame as a [`DrawList`]; a host (browser canvas, GPU
//! point sprites, or the CPU rasterizer in `vector-field-engines`) turns it
//! into pixels. Commands are stored in paint order.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::color::Srgb;

/// How a draw list composites onto what is already there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over alpha blending.
    #[default]
    Normal,
    /// Color is added, scaled by alpha. Used for glowing particles.
    Additive,
}

/// One stop of a vertical gradient. `offset` is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Srgb,
    pub alpha: f64,
}

/// Fill style of a polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Paint {
    Solid { color: Srgb, alpha: f64 },
    /// Gradient along the y axis from `y0` (offset 0) to `y1` (offset 1).
    VerticalGradient {
        y0: f64,
        y1: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Color and alpha of the paint at height `y`.
    pub fn sample(&self, y: f64) -> (Srgb, f64) {
        match self {
            Paint::Solid { color, alpha } => (*color, *alpha),
            Paint::VerticalGradient { y0, y1, stops } => {
                let span = y1 - y0;
                let t = if span.abs() < f64::EPSILON {
                    0.0
                } else {
                    ((y - y0) / span).clamp(0.0, 1.0)
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn sample_stops(stops: &[GradientStop], t: f64) -> (Srgb, f64) {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return (Srgb::new(0.0, 0.0, 0.0), 0.0),
    };
    if t <= first.offset {
        return (first.color, first.alpha);
    }
    if t >= last.offset {
        return (last.color, last.alpha);
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t == b.offset {
            return (b.color, b.alpha);
        }
        if t < b.offset {
            let span = b.offset - a.offset;
            let local = if span.abs() < f64::EPSILON {
                1.0
            } else {
                (t - a.offset) / span
            };
            return (
                a.color.lerp(b.color, local),
                a.alpha + (b.alpha - a.alpha) * local,
            );
        }
    }
    (last.color, last.alpha)
}

/// A single primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DrawCommand {
    /// Round soft-edged sprite of diameter `size` centred at `(x, y)`.
    Point {
        x: f64,
        y: f64,
        size: f64,
        color: Srgb,
        alpha: f64,
    },
    /// Hard-edged filled disc.
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Srgb,
        alpha: f64,
    },
    /// Closed polygon filled with the even-odd rule.
    Polygon { points: Vec<DVec2>, paint: Paint },
    /// Open polyline stroke.
    Polyline {
        points: Vec<DVec2>,
        color: Srgb,
        alpha: f64,
        width: f64,
    },
}

/// An ordered list of draw commands for one frame of one canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    pub width: f64,
    pub height: f64,
    pub blend: BlendMode,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f64, height: f64, blend: BlendMode) -> Self {
        Self {
            width,
            height,
            blend,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

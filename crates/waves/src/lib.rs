#![deny(unsafe_code)]
//! Layered sine-wave canvases.
//!
//! A [`WaveField`] stacks a few translucent bands whose crests are sums of
//! three harmonically related sines. Bands are drawn back to front as
//! gradient-filled polygons with a stroked crest. The unified preset also
//! breathes, follows a scroll-progress tint, and carries a pool of rising
//! foam; the surfer preset can throw spray off its front crest.
//!
//! Wave time is in seconds; foam and spray age in reference frames.

pub mod layer;
pub mod preset;
pub mod sprite;

use glam::DVec2;
use serde_json::{json, Value};
use tracing::debug;
use vector_field_core::clock::FrameDelta;
use vector_field_core::color::{Srgb, BACKGROUND};
use vector_field_core::draw::{BlendMode, DrawCommand, DrawList, GradientStop, Paint};
use vector_field_core::error::EngineError;
use vector_field_core::params::{param_bool, param_f64_clamped, param_usize_clamped};
use vector_field_core::prng::Xorshift64;
use vector_field_core::Engine;

pub use layer::{crest, wave_y, HarmonicProfile, WaveLayer};
pub use preset::{breathe, scroll_tint, WavePreset};
pub use sprite::{envelope, FoamPool, SprayPool};

/// Crest segments per layer.
pub const DEFAULT_SEGMENTS: usize = 160;
pub const MAX_SEGMENTS: usize = 4_096;
pub const MAX_FOAM_COUNT: usize = 1_000;
/// Gradient starts this many amplitudes (in canvas heights) above the baseline.
const GRADIENT_LEAD: f64 = 1.5;
/// Alpha of the crest stroke and the middle gradient stop, relative to opacity.
const CREST_ALPHA: f64 = 0.6;
const GRADIENT_MID_OFFSET: f64 = 0.35;
/// Alpha of the background-colored last stop, relative to opacity.
const GRADIENT_TAIL_ALPHA: f64 = 0.2;
/// Lift applied to the front layer's color for spray.
const SPRAY_LIFT: u8 = 40;

/// Options read from the JSON params.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveOptions {
    pub progress: f64,
    pub foam: bool,
    pub foam_count: usize,
    pub spray: bool,
    pub spray_rate: f64,
    pub segments: usize,
}

impl WaveOptions {
    pub fn defaults_for(preset: WavePreset) -> Self {
        Self {
            progress: 0.0,
            foam: preset.default_foam(),
            foam_count: sprite::DEFAULT_FOAM_COUNT,
            spray: false,
            spray_rate: sprite::DEFAULT_SPRAY_RATE,
            segments: DEFAULT_SEGMENTS,
        }
    }

    pub fn from_json(preset: WavePreset, params: &Value) -> Self {
        let d = Self::defaults_for(preset);
        Self {
            progress: param_f64_clamped(params, "progress", d.progress, 0.0, 1.0),
            foam: param_bool(params, "foam", d.foam),
            foam_count: param_usize_clamped(params, "foam_count", d.foam_count, 0, MAX_FOAM_COUNT),
            spray: param_bool(params, "spray", d.spray),
            spray_rate: param_f64_clamped(
                params,
                "spray_rate",
                d.spray_rate,
                0.0,
                sprite::DEFAULT_SPRAY_CAP as f64,
            ),
            segments: param_usize_clamped(params, "segments", d.segments, 1, MAX_SEGMENTS),
        }
    }
}

/// One wave canvas.
pub struct WaveField {
    preset: WavePreset,
    layers: Vec<WaveLayer>,
    options: WaveOptions,
    rng: Xorshift64,
    foam: FoamPool,
    spray: SprayPool,
    width: f64,
    height: f64,
    /// Elapsed wave time in seconds.
    time: f64,
    disposed: bool,
}

impl WaveField {
    pub fn new(preset: WavePreset, seed: u64, options: WaveOptions) -> Self {
        Self {
            preset,
            layers: preset.layers(),
            foam: FoamPool::new(if options.foam { options.foam_count } else { 0 }),
            spray: SprayPool::new(options.spray_rate, sprite::DEFAULT_SPRAY_CAP),
            options,
            rng: Xorshift64::new(seed),
            width: 0.0,
            height: 0.0,
            time: 0.0,
            disposed: false,
        }
    }

    pub fn from_json(preset: WavePreset, seed: u64, params: &Value) -> Self {
        Self::new(preset, seed, WaveOptions::from_json(preset, params))
    }

    /// Advances wave time by `dt_seconds` (clamped to 50 ms) and updates
    /// foam and spray.
    ///
    /// Does nothing until the canvas has a valid size.
    pub fn step(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        if !self.is_sized() {
            return Ok(());
        }
        let delta = FrameDelta::from_seconds(dt_seconds);
        self.time += delta.seconds;

        let (w, h) = (self.width, self.height);
        if self.options.foam {
            self.foam.update(&mut self.rng, delta.scale, w, h);
        }
        if self.options.spray {
            let front = self.layers[0];
            let profile = self.preset.profile();
            let base_y = self.layer_base_y(0);
            let breathe = self.breathe();
            let t = self.time;
            self.spray.update(&mut self.rng, delta.scale, w, |nx| {
                wave_y(nx, t, &front, &profile, (w, h), base_y, breathe)
            });
        }
        Ok(())
    }

    /// Sets scroll progress, clamped to [0, 1]. Only tinted presets use it.
    pub fn set_progress(&mut self, progress: f64) {
        if progress.is_finite() {
            self.options.progress = progress.clamp(0.0, 1.0);
        }
    }

    pub fn progress(&self) -> f64 {
        self.options.progress
    }

    /// Records a new canvas size; invalid sizes are ignored.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.disposed || !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0
        {
            return;
        }
        debug!(width, height, preset = self.preset.name(), "wave canvas resized");
        self.width = width;
        self.height = height;
    }

    /// Drops foam and spray. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.foam.clear();
        self.spray.clear();
        self.disposed = true;
        debug!(preset = self.preset.name(), "wave canvas disposed");
    }

    /// Baseline of layer `index` in pixels.
    pub fn layer_base_y(&self, index: usize) -> f64 {
        self.height * self.preset.base_fraction()
            + index as f64 * self.height * self.preset.layer_spacing()
    }

    /// Current amplitude multiplier.
    pub fn breathe(&self) -> f64 {
        if self.preset.breathes() {
            breathe(self.time)
        } else {
            1.0
        }
    }

    /// Color layer `index` is drawn with right now.
    pub fn layer_color(&self, index: usize) -> Srgb {
        if self.preset.scroll_tinted() {
            preset::tint_for_layer(index, scroll_tint(self.options.progress))
        } else {
            self.layers[index].color
        }
    }

    /// Crest points of layer `index` at the current time.
    pub fn crest(&self, index: usize) -> Vec<DVec2> {
        crest(
            &self.layers[index],
            &self.preset.profile(),
            self.time,
            (self.width, self.height),
            self.layer_base_y(index),
            self.breathe(),
            self.options.segments,
        )
    }

    /// Canvas size in pixels, zero until the first valid resize.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn preset(&self) -> WavePreset {
        self.preset
    }

    pub fn layers(&self) -> &[WaveLayer] {
        &self.layers
    }

    pub fn foam(&self) -> &FoamPool {
        &self.foam
    }

    pub fn spray(&self) -> &SprayPool {
        &self.spray
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn is_sized(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    fn draw_layer(&self, index: usize, list: &mut DrawList) {
        let layer = &self.layers[index];
        let color = self.layer_color(index);
        let base_y = self.layer_base_y(index);
        let crest = self.crest(index);

        let mut outline = Vec::with_capacity(crest.len() + 2);
        outline.extend_from_slice(&crest);
        outline.push(DVec2::new(self.width, self.height));
        outline.push(DVec2::new(0.0, self.height));

        let stop = |offset: f64, color: Srgb, alpha: f64| GradientStop {
            offset,
            color,
            alpha: alpha_byte(alpha),
        };
        list.push(DrawCommand::Polygon {
            points: outline,
            paint: Paint::VerticalGradient {
                y0: base_y - layer.amplitude * self.height * GRADIENT_LEAD,
                y1: self.height,
                stops: vec![
                    stop(0.0, color, layer.opacity),
                    stop(GRADIENT_MID_OFFSET, color, layer.opacity * CREST_ALPHA),
                    stop(1.0, BACKGROUND, layer.opacity * GRADIENT_TAIL_ALPHA),
                ],
            },
        });
        list.push(DrawCommand::Polyline {
            points: crest,
            color,
            alpha: alpha_byte(layer.opacity * CREST_ALPHA),
            width: if index == 0 { 2.0 } else { 1.0 },
        });
    }
}

impl Engine for WaveField {
    fn advance(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
        self.step(dt_seconds)
    }

    fn resize(&mut self, width: f64, height: f64) {
        WaveField::resize(self, width, height);
    }

    /// Layers back to front, then foam in the main tint, then spray.
    fn draw(&self, list: &mut DrawList) {
        if self.disposed || !self.is_sized() {
            return;
        }
        list.blend = BlendMode::Normal;
        for index in (0..self.layers.len()).rev() {
            self.draw_layer(index, list);
        }

        let foam_color = self.layer_color(0);
        for dot in self.foam.dots(self.width) {
            list.push(DrawCommand::Circle {
                x: dot.x,
                y: dot.y,
                radius: dot.radius,
                color: foam_color,
                alpha: dot.alpha,
            });
        }
        let spray_color = self.layer_color(0).lighten_rgb8(SPRAY_LIFT);
        for dot in self.spray.dots() {
            list.push(DrawCommand::Circle {
                x: dot.x,
                y: dot.y,
                radius: dot.radius,
                color: spray_color,
                alpha: dot.alpha,
            });
        }
    }

    fn params(&self) -> Value {
        json!({
            "preset": self.preset.name(),
            "progress": self.options.progress,
            "foam": self.options.foam,
            "foam_count": self.options.foam_count,
            "spray": self.options.spray,
            "spray_rate": self.options.spray_rate,
            "segments": self.options.segments,
        })
    }

    fn param_schema(&self) -> Value {
        let d = WaveOptions::defaults_for(self.preset);
        json!({
            "progress": {
                "type": "number",
                "default": d.progress,
                "min": 0.0,
                "max": 1.0,
                "description": "Scroll progress driving the cyan to violet tint"
            },
            "foam": {
                "type": "boolean",
                "default": d.foam,
                "description": "Rising foam bubbles above the water"
            },
            "foam_count": {
                "type": "integer",
                "default": d.foam_count,
                "min": 0,
                "max": MAX_FOAM_COUNT,
                "description": "Foam pool size"
            },
            "spray": {
                "type": "boolean",
                "default": d.spray,
                "description": "Spray thrown off the front crest"
            },
            "spray_rate": {
                "type": "number",
                "default": d.spray_rate,
                "min": 0.0,
                "max": sprite::DEFAULT_SPRAY_CAP,
                "description": "Expected spray droplets per frame"
            },
            "segments": {
                "type": "integer",
                "default": d.segments,
                "min": 1,
                "max": MAX_SEGMENTS,
                "description": "Line segments per crest"
            }
        })
    }

    fn dispose(&mut self) {
        WaveField::dispose(self);
    }

    fn is_ready(&self) -> bool {
        !self.disposed && self.is_sized()
    }
}

/// Quantizes an alpha to the 8 bits a CSS hex color carries.
fn alpha_byte(alpha: f64) -> f64 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() / 255.0
}

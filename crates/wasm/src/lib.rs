#![deny(unsafe_code)]
//! `wasm-bindgen` exports for the vector-field animations.
//!
//! The browser owns the animation frame loop: each `requestAnimationFrame`
//! callback calls `step` with the elapsed seconds, reads the attribute
//! buffers, and draws them with whatever backend it likes. Handles are
//! independent, so several canvases can run side by side.

use glam::DVec2;
use serde_json::Value;
use vector_field_core::error::EngineError;
use vector_field_particles::ParticleSystem;
use vector_field_waves::{WaveField, WavePreset};
use wasm_bindgen::prelude::*;

fn parse_params(params: &str) -> Result<Value, EngineError> {
    if params.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(params).map_err(|e| EngineError::InvalidParam {
        name: "params".into(),
        reason: e.to_string(),
    })
}

fn js_error(e: EngineError) -> JsError {
    JsError::new(&e.to_string())
}

/// Particle field for one canvas.
#[wasm_bindgen]
pub struct VectorFieldHandle {
    inner: ParticleSystem,
    pointer: Option<DVec2>,
}

impl VectorFieldHandle {
    /// Builds a handle from a JSON parameter object. The field stays
    /// deferred until the first `resize`.
    pub fn try_new(seed: u32, params: &str) -> Result<Self, EngineError> {
        let params = parse_params(params)?;
        Ok(Self {
            inner: ParticleSystem::from_json(u64::from(seed), &params),
            pointer: None,
        })
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.inner
    }
}

#[wasm_bindgen]
impl VectorFieldHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, params: &str) -> Result<VectorFieldHandle, JsError> {
        Self::try_new(seed, params).map_err(js_error)
    }

    /// Advances by `dt_seconds` with the last pointer. Returns `false` once
    /// disposed.
    pub fn step(&mut self, dt_seconds: f64) -> bool {
        self.inner.step(dt_seconds, self.pointer).is_ok()
    }

    /// Sizes the canvas; the first valid size places the particles.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner.resize(width, height);
    }

    #[wasm_bindgen(js_name = setPointer)]
    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = (x.is_finite() && y.is_finite()).then(|| DVec2::new(x, y));
    }

    #[wasm_bindgen(js_name = clearPointer)]
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Eased orbit-to-flow phase in `[0, 1]`.
    pub fn phase(&self) -> f64 {
        self.inner.eased_phase()
    }

    /// Interleaved `x, y` positions.
    pub fn positions(&self) -> Vec<f32> {
        let (xs, ys) = self.inner.positions();
        xs.iter().zip(ys).flat_map(|(&x, &y)| [x, y]).collect()
    }

    pub fn sizes(&self) -> Vec<f32> {
        self.inner.sizes().to_vec()
    }

    pub fn alphas(&self) -> Vec<f32> {
        self.inner.alphas().to_vec()
    }

    /// Interleaved `r, g, b` in `[0, 1]`.
    pub fn colors(&self) -> Vec<f32> {
        self.inner.colors().to_vec()
    }

    pub fn dispose(&mut self) {
        self.inner.dispose();
        self.pointer = None;
    }

    #[wasm_bindgen(js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

/// Layered wave canvas, either preset.
#[wasm_bindgen]
pub struct WaveHandle {
    inner: WaveField,
}

impl WaveHandle {
    pub fn try_new(preset: &str, seed: u32, params: &str) -> Result<Self, EngineError> {
        let preset = WavePreset::from_name(preset)?;
        let params = parse_params(params)?;
        Ok(Self {
            inner: WaveField::from_json(preset, u64::from(seed), &params),
        })
    }

    pub fn field(&self) -> &WaveField {
        &self.inner
    }
}

#[wasm_bindgen]
impl WaveHandle {
    /// `preset` is `"surfer"` or `"unified"`.
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str, seed: u32, params: &str) -> Result<WaveHandle, JsError> {
        Self::try_new(preset, seed, params).map_err(js_error)
    }

    pub fn step(&mut self, dt_seconds: f64) -> bool {
        self.inner.step(dt_seconds).is_ok()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner.resize(width, height);
    }

    /// Scroll progress in `[0, 1]`; only the unified preset tints by it.
    #[wasm_bindgen(js_name = setProgress)]
    pub fn set_progress(&mut self, progress: f64) {
        self.inner.set_progress(progress);
    }

    #[wasm_bindgen(js_name = layerCount)]
    pub fn layer_count(&self) -> usize {
        self.inner.layers().len()
    }

    /// Interleaved `x, y` crest points of layer `index`, left to right.
    pub fn crest(&self, index: usize) -> Vec<f32> {
        if index >= self.layer_count() {
            return Vec::new();
        }
        self.inner
            .crest(index)
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32])
            .collect()
    }

    /// Current color of layer `index` as `#rrggbb`.
    #[wasm_bindgen(js_name = layerColor)]
    pub fn layer_color(&self, index: usize) -> Option<String> {
        (index < self.layer_count()).then(|| self.inner.layer_color(index).to_hex())
    }

    /// Interleaved `x, y, radius, alpha` of visible foam bubbles.
    pub fn foam(&self) -> Vec<f32> {
        self.inner
            .foam()
            .dots(self.inner.size().0)
            .flat_map(|d| [d.x as f32, d.y as f32, d.radius as f32, d.alpha as f32])
            .collect()
    }

    /// Interleaved `x, y, radius, alpha` of visible spray droplets.
    pub fn spray(&self) -> Vec<f32> {
        self.inner
            .spray()
            .dots()
            .flat_map(|d| [d.x as f32, d.y as f32, d.radius as f32, d.alpha as f32])
            .collect()
    }

    pub fn dispose(&mut self) {
        self.inner.dispose();
    }

    #[wasm_bindgen(js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

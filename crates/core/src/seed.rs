//! Reproducible description of a rendered frame.
//!
//! A [`Seed`] captures everything needed to recreate a snapshot: engine
//! name, canvas size, parameter overrides, PRNG seed, how many frames to
//! simulate at which rate, and an optional fixed pointer position.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

fn default_fps() -> f64 {
    60.0
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Everything needed to reproduce one snapshot.
///
/// Two identical `Seed` values fed to the same binary produce bit-identical
/// output: all randomness flows from `seed` and all time from `frames / fps`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub engine: String,
    pub width: usize,
    pub height: usize,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Pointer held at this canvas position for every frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<[f64; 2]>,
}

impl Seed {
    /// Creates a seed with empty params, zero frames, 60 fps and no pointer.
    pub fn new(engine: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            engine: engine.to_string(),
            width,
            height,
            params: empty_params(),
            seed,
            frames: 0,
            fps: default_fps(),
            pointer: None,
        }
    }

    /// Seconds of simulated time covered by one frame.
    pub fn frame_seconds(&self) -> f64 {
        1.0 / self.fps
    }

    /// Checks dimensions, frame rate and params shape.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .and_then(|px| px.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(EngineError::InvalidParam {
                name: "fps".into(),
                reason: format!("must be a positive number, got {}", self.fps),
            });
        }
        if !self.params.is_object() {
            return Err(EngineError::InvalidParam {
                name: "params".into(),
                reason: "must be a JSON object".into(),
            });
        }
        if let Some([x, y]) = self.pointer {
            if !x.is_finite() || !y.is_finite() {
                return Err(EngineError::InvalidParam {
                    name: "pointer".into(),
                    reason: "coordinates must be finite".into(),
                });
            }
        }
        Ok(())
    }
}

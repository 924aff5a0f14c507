#![deny(unsafe_code)]
//! Engine registry: maps engine names to implementations, replays seeds, and
//! provides CPU-side rasterization of draw lists.
//!
//! This crate sits between `vector-field-core` (which defines the `Engine`
//! trait) and the engine crates (`vector-field-particles`,
//! `vector-field-waves`). The CLI depends on it to avoid duplicating dispatch
//! logic.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use glam::DVec2;
use serde_json::Value;
use tracing::debug;
use vector_field_core::controller::CanvasController;
use vector_field_core::draw::{BlendMode, DrawList};
use vector_field_core::error::EngineError;
use vector_field_core::scheduler::ManualScheduler;
use vector_field_core::seed::Seed;
use vector_field_core::Engine;
use vector_field_particles::ParticleSystem;
use vector_field_waves::{WaveField, WavePreset};

/// All available engine names.
const ENGINE_NAMES: &[&str] = &["vector-field", "surfer-wave", "unified-wave"];

/// Every animated canvas, behind one `Engine` implementation.
///
/// Use [`EngineKind::from_name`] for string-based construction (CLI, seeds).
pub enum EngineKind {
    /// Orbit-to-flow particle field.
    VectorField(ParticleSystem),
    /// Layered sine waves, either preset.
    Wave(WaveField),
}

impl EngineKind {
    /// Constructs an engine by name.
    ///
    /// Returns `EngineError::UnknownEngine` if the name is not recognized.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, EngineError> {
        match name {
            "vector-field" => Ok(EngineKind::VectorField(ParticleSystem::from_json(
                seed, params,
            ))),
            "surfer-wave" => Ok(EngineKind::Wave(WaveField::from_json(
                WavePreset::Surfer,
                seed,
                params,
            ))),
            "unified-wave" => Ok(EngineKind::Wave(WaveField::from_json(
                WavePreset::Unified,
                seed,
                params,
            ))),
            _ => Err(EngineError::UnknownEngine(name.to_string())),
        }
    }

    /// Returns a slice of all recognized engine names.
    pub fn list_engines() -> &'static [&'static str] {
        ENGINE_NAMES
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::VectorField(_) => "vector-field",
            EngineKind::Wave(w) => match w.preset() {
                WavePreset::Surfer => "surfer-wave",
                WavePreset::Unified => "unified-wave",
            },
        }
    }

    /// Blend mode the engine's draw list composites with.
    pub fn blend(&self) -> BlendMode {
        match self {
            EngineKind::VectorField(_) => BlendMode::Additive,
            EngineKind::Wave(_) => BlendMode::Normal,
        }
    }
}

impl Engine for EngineKind {
    fn advance(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
        match self {
            EngineKind::VectorField(e) => e.advance(dt_seconds),
            EngineKind::Wave(e) => e.advance(dt_seconds),
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        match self {
            EngineKind::VectorField(e) => Engine::resize(e, width, height),
            EngineKind::Wave(e) => Engine::resize(e, width, height),
        }
    }

    fn set_pointer(&mut self, pointer: Option<DVec2>) {
        match self {
            EngineKind::VectorField(e) => e.set_pointer(pointer),
            EngineKind::Wave(e) => e.set_pointer(pointer),
        }
    }

    fn draw(&self, list: &mut DrawList) {
        match self {
            EngineKind::VectorField(e) => e.draw(list),
            EngineKind::Wave(e) => e.draw(list),
        }
    }

    fn params(&self) -> Value {
        match self {
            EngineKind::VectorField(e) => e.params(),
            EngineKind::Wave(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EngineKind::VectorField(e) => e.param_schema(),
            EngineKind::Wave(e) => e.param_schema(),
        }
    }

    fn dispose(&mut self) {
        match self {
            EngineKind::VectorField(e) => Engine::dispose(e),
            EngineKind::Wave(e) => Engine::dispose(e),
        }
    }

    fn is_ready(&self) -> bool {
        match self {
            EngineKind::VectorField(e) => e.is_ready(),
            EngineKind::Wave(e) => e.is_ready(),
        }
    }
}

/// Replays a seed: builds the engine, mounts it on a canvas of the seed's
/// size, and drives `frames` simulation steps at `fps` through a
/// [`CanvasController`].
///
/// The pointer, if any, is held in place for every frame.
pub fn simulate(seed: &Seed) -> Result<EngineKind, EngineError> {
    seed.validate()?;
    let engine = EngineKind::from_name(&seed.engine, seed.seed, &seed.params)?;
    let mut controller = CanvasController::new(engine, ManualScheduler::new());
    controller.mount(seed.width as f64, seed.height as f64);
    if let Some([x, y]) = seed.pointer {
        controller.on_pointer_move(x, y);
    }

    let frame_ms = seed.frame_seconds() * 1000.0;
    // The first callback only primes the clock.
    for frame in 0..=seed.frames {
        for handle in controller.scheduler_mut().fire() {
            controller.on_frame(handle, frame as f64 * frame_ms)?;
        }
    }
    debug!(
        engine = seed.engine.as_str(),
        frames = seed.frames,
        elapsed = controller.clock().elapsed_seconds(),
        "seed replayed"
    );
    Ok(controller.into_engine())
}

/// Collects one frame of `engine` on a canvas of the given size.
pub fn draw_frame(engine: &EngineKind, width: f64, height: f64) -> DrawList {
    let mut list = DrawList::new(width, height, engine.blend());
    engine.draw(&mut list);
    list
}

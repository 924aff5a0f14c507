//! The `Engine` trait every animated canvas implements.
//!
//! The trait is object-safe so hosts can hold `Box<dyn Engine>` and switch
//! between the particle field and the wave canvases at runtime.

use glam::DVec2;
use serde_json::Value;

use crate::draw::DrawList;
use crate::error::EngineError;

/// A per-canvas animation.
///
/// The host calls [`advance`](Engine::advance) once per display frame with
/// the real elapsed time, then [`draw`](Engine::draw) to obtain the frame.
/// Implementations clamp the delta themselves, so an oversized `dt` is
/// never an error.
pub trait Engine {
    /// Advances the simulation by `dt_seconds` of real time.
    ///
    /// Returns `EngineError::Disposed` if called after [`dispose`](Engine::dispose).
    fn advance(&mut self, dt_seconds: f64) -> Result<(), EngineError>;

    /// New canvas size in CSS pixels.
    ///
    /// Non-finite or non-positive sizes are ignored (or defer
    /// initialization, for engines that need a surface to start).
    fn resize(&mut self, width: f64, height: f64);

    /// Pointer position in canvas coordinates, or `None` when it leaves.
    fn set_pointer(&mut self, _pointer: Option<DVec2>) {}

    /// Appends this frame's primitives to `list`.
    fn draw(&self, list: &mut DrawList);

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema of all parameters: type, default, range, description.
    fn param_schema(&self) -> Value;

    /// Releases per-canvas state. Calling it twice is a no-op.
    fn dispose(&mut self) {}

    /// `false` while initialization is deferred for lack of a valid surface.
    fn is_ready(&self) -> bool {
        true
    }
}

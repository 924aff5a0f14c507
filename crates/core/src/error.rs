//! Error types for the vector-field core.

use thiserror::Error;

/// Errors produced by engine construction, raster output, and configuration.
///
/// The simulation paths themselves never fail: bad frame deltas are clamped
/// and bad canvas sizes defer initialization. These variants cover the
/// surfaces around the simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero or non-finite where a concrete surface is required.
    #[error("invalid dimensions: width and height must be finite and non-zero")]
    InvalidDimensions,

    /// The engine name did not match any registered engine.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// The preset name did not match any known wave preset.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A parameter existed but had an unusable value.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The engine was used after `dispose()`.
    #[error("engine has been disposed")]
    Disposed,

    /// Writing a snapshot or reading a seed file failed.
    #[error("io error: {0}")]
    Io(String),
}

//! Per-canvas animation clock with a clamped frame delta.
//!
//! Frame timestamps come from the host in milliseconds. The first timestamp
//! only primes the clock; every later one yields a [`FrameDelta`] whose
//! duration never exceeds [`MAX_FRAME_DT`], so a backgrounded tab cannot
//! inject one huge integration step.

use tracing::{trace, warn};

/// Ceiling on one frame's delta, in seconds.
pub const MAX_FRAME_DT: f64 = 0.05;

/// Reference refresh rate that defines one "frame" of simulation time.
pub const REFERENCE_FPS: f64 = 60.0;

/// A clamped frame delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta {
    /// Real seconds, in `[0, MAX_FRAME_DT]`.
    pub seconds: f64,
    /// The same delta in frames at [`REFERENCE_FPS`] (1.0 at 60 fps).
    pub scale: f64,
}

impl FrameDelta {
    /// Clamps an arbitrary delta into `[0, MAX_FRAME_DT]`.
    ///
    /// NaN and negative inputs become zero; `+inf` clamps like any long gap.
    pub fn from_seconds(seconds: f64) -> Self {
        let clamped = if seconds.is_nan() || seconds <= 0.0 {
            0.0
        } else if seconds > MAX_FRAME_DT {
            warn!(seconds, max = MAX_FRAME_DT, "frame delta clamped");
            MAX_FRAME_DT
        } else {
            seconds
        };
        Self {
            seconds: clamped,
            scale: clamped * REFERENCE_FPS,
        }
    }
}

/// Elapsed time and previous timestamp of one canvas.
#[derive(Debug, Clone, Default)]
pub struct AnimationClock {
    prev_timestamp_ms: Option<f64>,
    elapsed_seconds: f64,
    frames: u64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a host timestamp in milliseconds.
    ///
    /// Returns `None` for the first timestamp (nothing to measure against),
    /// otherwise the clamped delta since the previous one.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<FrameDelta> {
        let prev = self.prev_timestamp_ms.replace(timestamp_ms)?;
        let delta = FrameDelta::from_seconds((timestamp_ms - prev) / 1000.0);
        self.elapsed_seconds += delta.seconds;
        self.frames += 1;
        trace!(
            dt = delta.seconds,
            elapsed = self.elapsed_seconds,
            "clock tick"
        );
        Some(delta)
    }

    /// Sum of clamped deltas, in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Number of measured frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

//! Orbit-to-flow phase.
//!
//! Phase 0 is pure orbit, 1 is free flow. It stays 0 for `hold` frames, then
//! rises linearly over `len` frames and saturates at exactly 1.

/// Linear phase at `time` frames, clamped to [0, 1].
pub fn linear_phase(time: f64, hold: f64, len: f64) -> f64 {
    ((time - hold) / len).clamp(0.0, 1.0)
}

/// Cubic ease-in-out on [0, 1].
///
/// `4p³` below one half, `1 − (2 − 2p)³ / 2` above. Maps 0 to 0 and 1 to 1
/// exactly.
pub fn ease_in_out_cubic(p: f64) -> f64 {
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
    }
}

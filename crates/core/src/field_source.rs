//! Field sources: 2D vector fields sampled in space and time.
//!
//! A [`FieldSource`] produces a `(dx, dy)` vector at any point and time. The
//! particle integrator composes two of them each frame: the curl of the
//! simplex noise field ([`CurlNoiseSource`]) and pointer repulsion
//! ([`PointerRepulsor`]).
//!
//! All implementations are deterministic: same inputs produce the same output.

use noise::NoiseFn;

/// Finite-difference step for [`curl_2d`].
///
/// Fixed for the lifetime of a field: a different step changes the
/// macroscopic character of the flow.
pub const DEFAULT_CURL_EPS: f64 = 1e-4;

/// Distances below this are treated as zero.
const SINGULARITY_EPS: f64 = 1e-10;

/// A source of 2D vector values for field-based simulation.
pub trait FieldSource: Send + Sync {
    /// Sample the field at position (x, y) at the given time.
    fn sample(&self, x: f64, y: f64, time: f64) -> (f64, f64);
}

/// 2D curl of a 3D scalar noise, using `z` as the evolution axis.
///
/// Returns `(dN/dy, -dN/dx)` by central differences with step `eps`. The
/// result is divergence-free in the continuum limit.
pub fn curl_2d<N>(noise: &N, x: f64, y: f64, z: f64, eps: f64) -> (f64, f64)
where
    N: NoiseFn<f64, 3> + ?Sized,
{
    let dn_dy = (noise.get([x, y + eps, z]) - noise.get([x, y - eps, z])) / (2.0 * eps);
    let dn_dx = (noise.get([x + eps, y, z]) - noise.get([x - eps, y, z])) / (2.0 * eps);
    (dn_dy, -dn_dx)
}

/// Curl-noise flow over any 3D noise function.
///
/// Positions are multiplied by `spatial_scale` and time by `temporal_scale`
/// before the curl is taken; the result is multiplied by `strength`.
#[derive(Debug, Clone)]
pub struct CurlNoiseSource<N> {
    noise: N,
    pub spatial_scale: f64,
    pub temporal_scale: f64,
    pub strength: f64,
    eps: f64,
}

impl<N: NoiseFn<f64, 3>> CurlNoiseSource<N> {
    /// Creates a curl source with unit strength and the default step.
    pub fn new(noise: N, spatial_scale: f64, temporal_scale: f64) -> Self {
        Self {
            noise,
            spatial_scale,
            temporal_scale,
            strength: 1.0,
            eps: DEFAULT_CURL_EPS,
        }
    }
}

impl<N: NoiseFn<f64, 3> + Send + Sync> FieldSource for CurlNoiseSource<N> {
    fn sample(&self, x: f64, y: f64, time: f64) -> (f64, f64) {
        let (cx, cy) = curl_2d(
            &self.noise,
            x * self.spatial_scale,
            y * self.spatial_scale,
            time * self.temporal_scale,
            self.eps,
        );
        (cx * self.strength, cy * self.strength)
    }
}

/// Pushes points away from a pointer with linear falloff.
///
/// Inside `radius` the magnitude is `(1 - d / radius) * force`; outside it,
/// and exactly at the pointer, the field is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRepulsor {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub force: f64,
}

impl FieldSource for PointerRepulsor {
    fn sample(&self, x: f64, y: f64, _time: f64) -> (f64, f64) {
        let dx = x - self.x;
        let dy = y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist >= self.radius || dist <= SINGULARITY_EPS {
            return (0.0, 0.0);
        }
        let magnitude = (1.0 - dist / self.radius) * self.force;
        ((dx / dist) * magnitude, (dy / dist) * magnitude)
    }
}

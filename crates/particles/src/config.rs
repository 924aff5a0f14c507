//! Tunable constants of the particle field and the device class.

use serde_json::{json, Value};
use vector_field_core::params::{param_f64, param_f64_clamped};

/// Frames of pure orbit before the transition starts.
pub const DEFAULT_ORBIT_HOLD: f64 = 180.0;
/// Frames over which orbit blends into free flow.
pub const DEFAULT_TRANSITION_LEN: f64 = 180.0;
/// Spring constant pulling a particle toward its orbit target.
pub const DEFAULT_SPRING: f64 = 0.06;
/// Pixel-to-noise-space scale.
pub const DEFAULT_NOISE_SCALE: f64 = 0.0018;
/// Frame-to-noise-time scale.
pub const DEFAULT_NOISE_SPEED: f64 = 0.00012;
/// Multiplier on the curl force.
pub const DEFAULT_BASE_SPEED: f64 = 0.45;
pub const DEFAULT_POINTER_RADIUS: f64 = 150.0;
pub const DEFAULT_POINTER_FORCE: f64 = 80.0;
/// Velocity damping while orbiting.
pub const DEFAULT_DAMPING_ORBIT: f64 = 0.88;
/// Velocity damping in free flow.
pub const DEFAULT_DAMPING_FREE: f64 = 0.92;
/// Off-screen distance at which a particle wraps to the opposite edge.
pub const DEFAULT_WRAP_MARGIN: f64 = 20.0;
/// Seed of the permutation table behind the flow.
pub const DEFAULT_NOISE_SEED: i32 = 42;

pub const DESKTOP_PARTICLE_COUNT: usize = 12_000;
pub const CONSTRAINED_PARTICLE_COUNT: usize = 5_000;
/// Upper bound on a configured particle count.
pub const MAX_PARTICLE_COUNT: usize = 200_000;
/// Viewports narrower than this are treated as constrained devices.
pub const CONSTRAINED_VIEWPORT_WIDTH: f64 = 768.0;

/// Coarse device capability, decided once from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    /// Narrow viewport: fewer and slightly slower particles.
    Constrained,
}

impl DeviceClass {
    pub fn from_viewport_width(width: f64) -> Self {
        if width < CONSTRAINED_VIEWPORT_WIDTH {
            DeviceClass::Constrained
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn default_count(self) -> usize {
        match self {
            DeviceClass::Desktop => DESKTOP_PARTICLE_COUNT,
            DeviceClass::Constrained => CONSTRAINED_PARTICLE_COUNT,
        }
    }

    /// Factor applied to every orbit's angular speed.
    pub fn orbit_speed_factor(self) -> f64 {
        match self {
            DeviceClass::Desktop => 1.0,
            DeviceClass::Constrained => 0.8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Constrained => "constrained",
        }
    }
}

/// All constants of the orbit-to-flow simulation.
///
/// Durations are in reference frames (1/60 s); forces are per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    /// Fixed particle count, or `None` to pick one from the device class.
    pub count: Option<usize>,
    pub orbit_hold: f64,
    pub transition_len: f64,
    pub spring: f64,
    pub noise_scale: f64,
    pub noise_speed: f64,
    pub base_speed: f64,
    pub pointer_radius: f64,
    pub pointer_force: f64,
    pub damping_orbit: f64,
    pub damping_free: f64,
    pub wrap_margin: f64,
    pub noise_seed: i32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: None,
            orbit_hold: DEFAULT_ORBIT_HOLD,
            transition_len: DEFAULT_TRANSITION_LEN,
            spring: DEFAULT_SPRING,
            noise_scale: DEFAULT_NOISE_SCALE,
            noise_speed: DEFAULT_NOISE_SPEED,
            base_speed: DEFAULT_BASE_SPEED,
            pointer_radius: DEFAULT_POINTER_RADIUS,
            pointer_force: DEFAULT_POINTER_FORCE,
            damping_orbit: DEFAULT_DAMPING_ORBIT,
            damping_free: DEFAULT_DAMPING_FREE,
            wrap_margin: DEFAULT_WRAP_MARGIN,
            noise_seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl ParticleConfig {
    /// Extracts the config from a JSON object, falling back to defaults.
    ///
    /// Out-of-range values are clamped; a zero transition length is raised
    /// to one frame so the phase stays well defined.
    pub fn from_json(params: &Value) -> Self {
        let count = params
            .get("count")
            .and_then(Value::as_u64)
            .map(|c| usize::try_from(c).unwrap_or(usize::MAX).min(MAX_PARTICLE_COUNT));
        let noise_seed = params
            .get("noise_seed")
            .and_then(Value::as_i64)
            .map(|s| s.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .unwrap_or(DEFAULT_NOISE_SEED);
        Self {
            count,
            orbit_hold: param_f64_clamped(params, "orbit_hold", DEFAULT_ORBIT_HOLD, 0.0, 1e6),
            transition_len: param_f64_clamped(
                params,
                "transition_len",
                DEFAULT_TRANSITION_LEN,
                1.0,
                1e6,
            ),
            spring: param_f64_clamped(params, "spring", DEFAULT_SPRING, 0.0, 1.0),
            noise_scale: param_f64(params, "noise_scale", DEFAULT_NOISE_SCALE),
            noise_speed: param_f64(params, "noise_speed", DEFAULT_NOISE_SPEED),
            base_speed: param_f64(params, "base_speed", DEFAULT_BASE_SPEED),
            pointer_radius: param_f64_clamped(
                params,
                "pointer_radius",
                DEFAULT_POINTER_RADIUS,
                0.0,
                1e4,
            ),
            pointer_force: param_f64(params, "pointer_force", DEFAULT_POINTER_FORCE),
            damping_orbit: param_f64_clamped(
                params,
                "damping_orbit",
                DEFAULT_DAMPING_ORBIT,
                0.0,
                1.0,
            ),
            damping_free: param_f64_clamped(params, "damping_free", DEFAULT_DAMPING_FREE, 0.0, 1.0),
            wrap_margin: param_f64_clamped(params, "wrap_margin", DEFAULT_WRAP_MARGIN, 0.0, 1e4),
            noise_seed,
        }
    }

    /// Current values as a JSON object; `count` is omitted when automatic.
    pub fn to_json(&self) -> Value {
        let mut v = json!({
            "orbit_hold": self.orbit_hold,
            "transition_len": self.transition_len,
            "spring": self.spring,
            "noise_scale": self.noise_scale,
            "noise_speed": self.noise_speed,
            "base_speed": self.base_speed,
            "pointer_radius": self.pointer_radius,
            "pointer_force": self.pointer_force,
            "damping_orbit": self.damping_orbit,
            "damping_free": self.damping_free,
            "wrap_margin": self.wrap_margin,
            "noise_seed": self.noise_seed,
        });
        if let (Some(count), Some(map)) = (self.count, v.as_object_mut()) {
            map.insert("count".into(), json!(count));
        }
        v
    }

    pub fn schema() -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": null,
                "min": 0,
                "max": MAX_PARTICLE_COUNT,
                "description": "Particle count; by default 12000 on desktop and 5000 below 768px"
            },
            "orbit_hold": {
                "type": "number",
                "default": DEFAULT_ORBIT_HOLD,
                "min": 0.0,
                "description": "Frames of pure orbit before the transition"
            },
            "transition_len": {
                "type": "number",
                "default": DEFAULT_TRANSITION_LEN,
                "min": 1.0,
                "description": "Frames over which orbit blends into free flow"
            },
            "spring": {
                "type": "number",
                "default": DEFAULT_SPRING,
                "min": 0.0,
                "max": 1.0,
                "description": "Spring constant toward the orbit target"
            },
            "noise_scale": {
                "type": "number",
                "default": DEFAULT_NOISE_SCALE,
                "description": "Pixel to noise-space scale"
            },
            "noise_speed": {
                "type": "number",
                "default": DEFAULT_NOISE_SPEED,
                "description": "Frame to noise-time scale"
            },
            "base_speed": {
                "type": "number",
                "default": DEFAULT_BASE_SPEED,
                "description": "Curl force multiplier"
            },
            "pointer_radius": {
                "type": "number",
                "default": DEFAULT_POINTER_RADIUS,
                "min": 0.0,
                "description": "Pointer repulsion radius in pixels"
            },
            "pointer_force": {
                "type": "number",
                "default": DEFAULT_POINTER_FORCE,
                "description": "Pointer repulsion peak force"
            },
            "damping_orbit": {
                "type": "number",
                "default": DEFAULT_DAMPING_ORBIT,
                "min": 0.0,
                "max": 1.0,
                "description": "Per-frame velocity retention while orbiting"
            },
            "damping_free": {
                "type": "number",
                "default": DEFAULT_DAMPING_FREE,
                "min": 0.0,
                "max": 1.0,
                "description": "Per-frame velocity retention in free flow"
            },
            "wrap_margin": {
                "type": "number",
                "default": DEFAULT_WRAP_MARGIN,
                "min": 0.0,
                "description": "Off-screen distance before wrapping"
            },
            "noise_seed": {
                "type": "integer",
                "default": DEFAULT_NOISE_SEED,
                "description": "Seed of the noise permutation table"
            }
        })
    }

    /// Particle count for a device, honouring a fixed `count`.
    pub fn count_for(&self, device: DeviceClass) -> usize {
        self.count.unwrap_or_else(|| device.default_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_class_threshold() {
        assert_eq!(DeviceClass::from_viewport_width(767.9), DeviceClass::Constrained);
        assert_eq!(DeviceClass::from_viewport_width(768.0), DeviceClass::Desktop);
        assert_eq!(DeviceClass::Desktop.default_count(), 12_000);
        assert_eq!(DeviceClass::Constrained.default_count(), 5_000);
    }

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(ParticleConfig::from_json(&json!({})), ParticleConfig::default());
    }

    #[test]
    fn from_json_reads_and_clamps() {
        let c = ParticleConfig::from_json(&json!({
            "count": 300,
            "spring": 4.0,
            "transition_len": 0,
            "noise_seed": 7,
            "base_speed": 0.9
        }));
        assert_eq!(c.count, Some(300));
        assert_eq!(c.spring, 1.0);
        assert_eq!(c.transition_len, 1.0);
        assert_eq!(c.noise_seed, 7);
        assert_eq!(c.base_speed, 0.9);
    }

    #[test]
    fn to_json_round_trips() {
        let c = ParticleConfig {
            count: Some(42),
            pointer_force: 10.0,
            ..ParticleConfig::default()
        };
        assert_eq!(ParticleConfig::from_json(&c.to_json()), c);
        assert!(ParticleConfig::default().to_json().get("count").is_none());
    }

    #[test]
    fn huge_count_is_capped() {
        let config = ParticleConfig::from_json(&json!({"count": u64::MAX}));
        assert_eq!(config.count, Some(MAX_PARTICLE_COUNT));
        assert_eq!(ParticleConfig::schema()["count"]["max"], MAX_PARTICLE_COUNT);
    }

    #[test]
    fn count_for_prefers_fixed_count() {
        let auto = ParticleConfig::default();
        assert_eq!(auto.count_for(DeviceClass::Constrained), 5_000);
        let fixed = ParticleConfig {
            count: Some(10),
            ..auto
        };
        assert_eq!(fixed.count_for(DeviceClass::Desktop), 10);
    }

    #[test]
    fn schema_covers_every_key() {
        let schema = ParticleConfig::schema();
        let values = ParticleConfig::default().to_json();
        let keys: Vec<&String> = values
            .as_object()
            .map(|m| m.keys().collect())
            .unwrap_or_default();
        assert!(!keys.is_empty());
        for key in keys {
            assert!(schema.get(key).is_some(), "schema missing {key}");
            assert!(schema[key].get("description").is_some());
        }
        assert!(schema.get("count").is_some());
    }
}

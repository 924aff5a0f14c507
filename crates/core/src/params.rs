//! Helpers for reading typed engine parameters from a JSON object.
//!
//! Each helper takes the params value, a key, and a default. Missing keys and
//! wrong types fall back to the default, so an engine can always be built
//! from `{}`.

use serde_json::Value;

/// Reads an `f64`, accepting integers too.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads an `f64` and clamps it into `[min, max]`.
///
/// Non-finite values fall back to the default before clamping.
pub fn param_f64_clamped(params: &Value, name: &str, default: f64, min: f64, max: f64) -> f64 {
    let v = param_f64(params, name, default);
    let v = if v.is_finite() { v } else { default };
    v.clamp(min, max)
}

/// Reads a non-negative integer and clamps it into `[min, max]`.
pub fn param_usize_clamped(params: &Value, name: &str, default: usize, min: usize, max: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
        .unwrap_or(default)
        .clamp(min, max)
}

/// Reads a `bool`.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f64_reads_float_and_integer() {
        let params = json!({"stiffness": 0.08, "orbit_hold": 120});
        assert!((param_f64(&params, "stiffness", 0.06) - 0.08).abs() < f64::EPSILON);
        assert!((param_f64(&params, "orbit_hold", 180.0) - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_falls_back_on_missing_or_wrong_type() {
        let params = json!({"stiffness": "stiff", "damping": null});
        assert_eq!(param_f64(&params, "stiffness", 0.06), 0.06);
        assert_eq!(param_f64(&params, "damping", 0.88), 0.88);
        assert_eq!(param_f64(&params, "absent", 1.5), 1.5);
        assert_eq!(param_f64(&json!("not an object"), "x", 7.0), 7.0);
    }

    #[test]
    fn param_f64_clamped_limits_range() {
        let params = json!({"progress": 3.5, "damping": -2.0});
        assert_eq!(param_f64_clamped(&params, "progress", 0.0, 0.0, 1.0), 1.0);
        assert_eq!(param_f64_clamped(&params, "damping", 0.9, 0.0, 1.0), 0.0);
        assert_eq!(param_f64_clamped(&params, "absent", 0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn param_usize_clamped_rejects_floats_and_negatives() {
        let params = json!({"count": 5000, "float": 2.5, "neg": -1});
        assert_eq!(param_usize_clamped(&params, "count", 0, 0, usize::MAX), 5000);
        assert_eq!(param_usize_clamped(&params, "float", 99, 0, usize::MAX), 99);
        assert_eq!(param_usize_clamped(&params, "neg", 5, 0, usize::MAX), 5);
    }

    #[test]
    fn param_usize_clamped_caps_huge_values() {
        let params = json!({"count": u64::MAX, "segments": 0, "foam_count": -4});
        assert_eq!(param_usize_clamped(&params, "count", 10, 0, 200_000), 200_000);
        assert_eq!(param_usize_clamped(&params, "segments", 160, 1, 4096), 1);
        assert_eq!(param_usize_clamped(&params, "foam_count", 30, 0, 1000), 30);
        assert_eq!(param_usize_clamped(&params, "missing", 5000, 0, 1000), 1000);
    }

    #[test]
    fn param_bool_rejects_numbers() {
        let params = json!({"foam": true, "n": 1});
        assert!(param_bool(&params, "foam", false));
        assert!(!param_bool(&params, "n", false));
    }
}

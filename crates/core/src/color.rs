//! sRGB color type and the fixed palette used by the canvases.
//!
//! Components are `f64` in [0, 1]. Interpolation is a plain per-channel lerp,
//! which is what the speed-to-color and scroll-to-color mappings use.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip quantizes to
/// 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Amber `#f59e0b`, color of slow particles.
pub const AMBER: Srgb = Srgb::new(
    0.960_784_313_725_490_2,
    0.619_607_843_137_254_9,
    0.043_137_254_901_960_784,
);
/// Cyan `#06b6d4`, color of fast particles and the start of the scroll tint.
pub const CYAN: Srgb = Srgb::new(
    0.023_529_411_764_705_882,
    0.713_725_490_196_078_4,
    0.831_372_549_019_607_9,
);
/// Violet `#8b5cf6`, end of the scroll tint.
pub const VIOLET: Srgb = Srgb::new(
    0.545_098_039_215_686_2,
    0.360_784_313_725_490_2,
    0.964_705_882_352_941_2,
);
/// Near-black page background `#050508`, the last wave gradient stop.
pub const BACKGROUND: Srgb = Srgb::new(
    0.019_607_843_137_254_9,
    0.019_607_843_137_254_9,
    0.031_372_549_019_607_84,
);

impl Srgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Quantizes to 8-bit channels with rounding and clamping.
    pub fn to_rgb8(self) -> [u8; 3] {
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Parses `"#ff00aa"` or `"ff00aa"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Srgb::from_rgb8(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Formats as `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Per-channel linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Srgb, t: f64) -> Srgb {
        Srgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Interpolates on 8-bit channels with `t` clamped to [0, 1], rounding
    /// each channel to the nearest integer.
    pub fn lerp_rgb8(self, other: Srgb, t: f64) -> Srgb {
        let t = t.clamp(0.0, 1.0);
        let a = self.to_rgb8();
        let b = other.to_rgb8();
        let mix = |i: usize| {
            let from = a[i] as f64;
            let to = b[i] as f64;
            (from + (to - from) * t).round() as u8
        };
        Srgb::from_rgb8(mix(0), mix(1), mix(2))
    }

    /// Adds `amount` to each 8-bit channel, saturating at 255.
    pub fn lighten_rgb8(self, amount: u8) -> Srgb {
        let [r, g, b] = self.to_rgb8();
        Srgb::from_rgb8(
            r.saturating_add(amount),
            g.saturating_add(amount),
            b.saturating_add(amount),
        )
    }
}

fn quantize(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_with_and_without_hash() {
        assert_eq!(Srgb::from_hex("#f59e0b").unwrap(), AMBER);
        assert_eq!(Srgb::from_hex("06B6D4").unwrap(), CYAN);
    }

    #[test]
    fn palette_constants_match_their_8bit_channels() {
        assert_eq!(AMBER, Srgb::from_rgb8(0xf5, 0x9e, 0x0b));
        assert_eq!(CYAN, Srgb::from_rgb8(0x06, 0xb6, 0xd4));
        assert_eq!(VIOLET, Srgb::from_rgb8(0x8b, 0x5c, 0xf6));
        assert_eq!(BACKGROUND, Srgb::from_rgb8(0x05, 0x05, 0x08));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Srgb::from_hex("#12345").is_err());
        assert!(Srgb::from_hex("#gg0000").is_err());
        assert!(Srgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn to_hex_round_trips_palette_constants() {
        assert_eq!(AMBER.to_hex(), "#f59e0b");
        assert_eq!(CYAN.to_hex(), "#06b6d4");
        assert_eq!(VIOLET.to_hex(), "#8b5cf6");
        assert_eq!(BACKGROUND.to_hex(), "#050508");
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(AMBER.lerp(CYAN, 0.0), AMBER);
        let end = AMBER.lerp(CYAN, 1.0);
        assert!((end.r - CYAN.r).abs() < 1e-12);
        assert!((end.g - CYAN.g).abs() < 1e-12);
        assert!((end.b - CYAN.b).abs() < 1e-12);
    }

    #[test]
    fn lerp_rgb8_rounds_and_clamps() {
        // cyan (6, 182, 212) -> violet (139, 92, 246) at 0.5 = (72.5, 137, 229)
        assert_eq!(CYAN.lerp_rgb8(VIOLET, 0.5).to_rgb8(), [73, 137, 229]);
        assert_eq!(CYAN.lerp_rgb8(VIOLET, -1.0), CYAN);
        assert_eq!(CYAN.lerp_rgb8(VIOLET, 2.0), VIOLET);
    }

    #[test]
    fn lighten_saturates() {
        assert_eq!(VIOLET.lighten_rgb8(40).to_rgb8(), [179, 132, 255]);
    }

    #[test]
    fn srgb_json_round_trip() {
        let json = serde_json::to_string(&VIOLET).unwrap();
        assert_eq!(json, "\"#8b5cf6\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, VIOLET);
    }

    #[test]
    fn srgb_deserialize_rejects_invalid_hex() {
        assert!(serde_json::from_str::<Srgb>("\"#nothex\"").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lerp_stays_between_endpoints(t in 0.0_f64..=1.0) {
                let c = AMBER.lerp(CYAN, t);
                for (v, a, b) in [(c.r, AMBER.r, CYAN.r), (c.g, AMBER.g, CYAN.g), (c.b, AMBER.b, CYAN.b)] {
                    prop_assert!(v >= a.min(b) - 1e-12 && v <= a.max(b) + 1e-12);
                }
            }
        }
    }
}

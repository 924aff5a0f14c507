//! Wave layers and the three-harmonic height function.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use vector_field_core::color::Srgb;

/// Amplitude weight of the overtone term.
const OVERTONE_WEIGHT: f64 = 0.35;
/// Amplitude weight of the subharmonic term.
const SUBHARMONIC_WEIGHT: f64 = 0.2;
/// Amplitudes are relative to `min(0.6 * width, height)`.
const WIDTH_AMPLITUDE_CAP: f64 = 0.6;

/// One band of the wave field.
///
/// `amplitude` is a fraction of the canvas scale, `speed` is in radians per
/// second, `opacity` scales every alpha the layer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveLayer {
    pub frequency: f64,
    pub amplitude: f64,
    pub speed: f64,
    pub color: Srgb,
    pub opacity: f64,
}

/// Frequency and speed ratios of the overtone and subharmonic terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicProfile {
    pub overtone_frequency: f64,
    pub overtone_speed: f64,
    pub sub_frequency: f64,
    pub sub_speed: f64,
}

impl HarmonicProfile {
    /// Hero surf canvas.
    pub const SURFER: HarmonicProfile = HarmonicProfile {
        overtone_frequency: 1.8,
        overtone_speed: 1.4,
        sub_frequency: 0.5,
        sub_speed: 0.6,
    };

    /// Scroll-tinted page background.
    pub const UNIFIED: HarmonicProfile = HarmonicProfile {
        overtone_frequency: 1.7,
        overtone_speed: 1.3,
        sub_frequency: 0.6,
        sub_speed: 0.7,
    };
}

/// Height of a layer's crest at normalized x position `nx` and time `t`
/// (seconds).
///
/// `size` is the canvas `(width, height)`; `breathe` scales the amplitude.
/// A zero-amplitude layer returns exactly `base_y`.
pub fn wave_y(
    nx: f64,
    t: f64,
    layer: &WaveLayer,
    profile: &HarmonicProfile,
    size: (f64, f64),
    base_y: f64,
    breathe: f64,
) -> f64 {
    let (w, h) = size;
    let a = layer.amplitude * (w * WIDTH_AMPLITUDE_CAP).min(h) * breathe;
    let f = layer.frequency;
    let s = layer.speed;
    let y1 = (nx * TAU * f + t * s).sin() * a;
    let y2 = (nx * TAU * f * profile.overtone_frequency + t * s * profile.overtone_speed).sin()
        * a
        * OVERTONE_WEIGHT;
    let y3 = (nx * TAU * f * profile.sub_frequency + t * s * profile.sub_speed).sin()
        * a
        * SUBHARMONIC_WEIGHT;
    base_y + y1 + y2 + y3
}

/// Samples the crest into `segments + 1` points from x = 0 to x = width.
pub fn crest(
    layer: &WaveLayer,
    profile: &HarmonicProfile,
    t: f64,
    size: (f64, f64),
    base_y: f64,
    breathe: f64,
    segments: usize,
) -> Vec<DVec2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let nx = i as f64 / segments as f64;
            DVec2::new(
                nx * size.0,
                wave_y(nx, t, layer, profile, size, base_y, breathe),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_field_core::color::VIOLET;

    fn layer(amplitude: f64) -> WaveLayer {
        WaveLayer {
            frequency: 1.4,
            amplitude,
            speed: 0.55,
            color: VIOLET,
            opacity: 0.65,
        }
    }

    #[test]
    fn zero_amplitude_returns_base_exactly() {
        for &(nx, t) in &[(0.0, 0.0), (0.37, 12.5), (1.0, 1e4)] {
            let y = wave_y(nx, t, &layer(0.0), &HarmonicProfile::SURFER, (800.0, 600.0), 210.0, 1.0);
            assert_eq!(y, 210.0);
        }
    }

    #[test]
    fn origin_sample_is_base() {
        // every sine argument is zero at nx = 0, t = 0
        let y = wave_y(0.0, 0.0, &layer(0.12), &HarmonicProfile::UNIFIED, (800.0, 600.0), 100.0, 1.0);
        assert_eq!(y, 100.0);
    }

    #[test]
    fn amplitude_uses_short_scale() {
        // wide canvas: height limits; quarter period puts the fundamental at its peak
        let l = WaveLayer {
            frequency: 1.0,
            speed: 0.0,
            ..layer(0.1)
        };
        let flat = HarmonicProfile {
            overtone_frequency: 0.0,
            overtone_speed: 0.0,
            sub_frequency: 0.0,
            sub_speed: 0.0,
        };
        let y = wave_y(0.25, 0.0, &l, &flat, (2000.0, 500.0), 0.0, 1.0);
        assert!((y - 50.0).abs() < 1e-9, "y = {y}");
        // narrow canvas: 0.6 * width limits
        let y = wave_y(0.25, 0.0, &l, &flat, (500.0, 2000.0), 0.0, 1.0);
        assert!((y - 30.0).abs() < 1e-9, "y = {y}");
    }

    #[test]
    fn breathe_scales_displacement() {
        let l = layer(0.1);
        let p = HarmonicProfile::UNIFIED;
        let base = wave_y(0.3, 2.0, &l, &p, (800.0, 600.0), 0.0, 1.0);
        let more = wave_y(0.3, 2.0, &l, &p, (800.0, 600.0), 0.0, 1.15);
        assert!((more - base * 1.15).abs() < 1e-9);
    }

    #[test]
    fn crest_spans_width() {
        let pts = crest(&layer(0.1), &HarmonicProfile::SURFER, 1.0, (640.0, 480.0), 200.0, 1.0, 160);
        assert_eq!(pts.len(), 161);
        assert_eq!(pts[0].x, 0.0);
        assert_eq!(pts[160].x, 640.0);
    }

    #[test]
    fn layer_serializes_color_as_hex() {
        let v = serde_json::to_value(layer(0.1)).unwrap();
        assert_eq!(v["color"], "#8b5cf6");
        let back: WaveLayer = serde_json::from_value(v).unwrap();
        assert_eq!(back.frequency, 1.4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn displacement_bounded_by_total_weight(
                nx in 0.0_f64..=1.0,
                t in 0.0_f64..1e4,
                amp in 0.0_f64..0.3,
            ) {
                let l = layer(amp);
                let y = wave_y(nx, t, &l, &HarmonicProfile::SURFER, (800.0, 600.0), 300.0, 1.0);
                let a = amp * 480.0;
                prop_assert!((y - 300.0).abs() <= a * 1.55 + 1e-9);
            }
        }
    }
}

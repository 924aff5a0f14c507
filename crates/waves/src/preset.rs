//! The two wave canvases.

use serde::{Deserialize, Serialize};
use vector_field_core::color::{Srgb, CYAN, VIOLET};
use vector_field_core::error::EngineError;

use crate::layer::{HarmonicProfile, WaveLayer};

/// Amount added to every channel of the secondary tint.
const LIGHT_TINT_LIFT: u8 = 40;
/// How far the secondary tint lags behind the main one in progress.
const LIGHT_TINT_LAG: f64 = 0.15;

/// Which wave canvas to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WavePreset {
    /// Three violet layers behind the hero section.
    Surfer,
    /// Four breathing layers tinted by scroll progress, with foam.
    Unified,
}

impl WavePreset {
    pub const ALL: [WavePreset; 2] = [WavePreset::Surfer, WavePreset::Unified];

    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "surfer" => Ok(WavePreset::Surfer),
            "unified" => Ok(WavePreset::Unified),
            other => Err(EngineError::UnknownPreset(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WavePreset::Surfer => "surfer",
            WavePreset::Unified => "unified",
        }
    }

    /// Layers front (index 0) to back.
    pub fn layers(self) -> Vec<WaveLayer> {
        match self {
            WavePreset::Surfer => vec![
                surfer_layer(1.4, 0.12, 0.55, Srgb::from_rgb8(0x7c, 0x3a, 0xed), 0.65),
                surfer_layer(2.0, 0.08, 0.40, Srgb::from_rgb8(0x8b, 0x5c, 0xf6), 0.45),
                surfer_layer(2.8, 0.06, 0.70, Srgb::from_rgb8(0xa7, 0x8b, 0xfa), 0.28),
            ],
            WavePreset::Unified => {
                let [main, light] = scroll_tint(0.0);
                vec![
                    surfer_layer(1.2, 0.09, 0.35, main, 0.60),
                    surfer_layer(1.6, 0.065, 0.25, main, 0.45),
                    surfer_layer(2.0, 0.05, 0.45, light, 0.32),
                    surfer_layer(2.6, 0.04, 0.55, light, 0.22),
                ]
            }
        }
    }

    pub fn profile(self) -> HarmonicProfile {
        match self {
            WavePreset::Surfer => HarmonicProfile::SURFER,
            WavePreset::Unified => HarmonicProfile::UNIFIED,
        }
    }

    /// Baseline of layer 0 as a fraction of canvas height.
    pub fn base_fraction(self) -> f64 {
        match self {
            WavePreset::Surfer => 0.35,
            WavePreset::Unified => 0.38,
        }
    }

    /// Baseline step between consecutive layers as a fraction of height.
    pub fn layer_spacing(self) -> f64 {
        match self {
            WavePreset::Surfer => 0.09,
            WavePreset::Unified => 0.08,
        }
    }

    /// Whether amplitude slowly breathes with time.
    pub fn breathes(self) -> bool {
        self == WavePreset::Unified
    }

    /// Whether layer colors follow scroll progress.
    pub fn scroll_tinted(self) -> bool {
        self == WavePreset::Unified
    }

    /// Foam is on by default only on the unified canvas.
    pub fn default_foam(self) -> bool {
        self == WavePreset::Unified
    }
}

fn surfer_layer(frequency: f64, amplitude: f64, speed: f64, color: Srgb, opacity: f64) -> WaveLayer {
    WaveLayer {
        frequency,
        amplitude,
        speed,
        color,
        opacity,
    }
}

/// Amplitude multiplier at time `t` seconds for breathing presets.
pub fn breathe(t: f64) -> f64 {
    1.0 + (t * 0.3).sin() * 0.15
}

/// Main and secondary layer colors for scroll `progress` in [0, 1].
///
/// Main runs cyan to violet on rounded 8-bit channels. The secondary color
/// is the main color from slightly earlier progress, lifted toward white.
pub fn scroll_tint(progress: f64) -> [Srgb; 2] {
    let main = CYAN.lerp_rgb8(VIOLET, progress);
    let light = CYAN
        .lerp_rgb8(VIOLET, (progress - LIGHT_TINT_LAG).max(0.0))
        .lighten_rgb8(LIGHT_TINT_LIFT);
    [main, light]
}

/// Tinted color of layer `index`: the front two use the main color.
pub fn tint_for_layer(index: usize, tint: [Srgb; 2]) -> Srgb {
    if index < 2 {
        tint[0]
    } else {
        tint[1]
    }
}

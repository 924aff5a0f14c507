#![deny(unsafe_code)]
//! Core types and traits for the vector-field animations.
//!
//! Provides the seeded permutation table and 3D simplex `NoiseField`, the
//! curl-noise `FieldSource`s, the `Engine` trait with its backend-neutral
//! `DrawList`, the clamped `AnimationClock`, the `FrameScheduler` /
//! `CanvasController` pair that drives one canvas, colors, PRNGs, `Seed`,
//! and parameter helpers.

pub mod clock;
pub mod color;
pub mod controller;
pub mod draw;
pub mod engine;
pub mod error;
pub mod field_source;
pub mod noise;
pub mod params;
pub mod prng;
pub mod scheduler;
pub mod seed;

pub use clock::{AnimationClock, FrameDelta, MAX_FRAME_DT};
pub use color::Srgb;
pub use controller::{CanvasController, SharedController};
pub use draw::{BlendMode, DrawCommand, DrawList, GradientStop, Paint};
pub use engine::Engine;
pub use error::EngineError;
pub use field_source::{curl_2d, CurlNoiseSource, FieldSource, PointerRepulsor};
pub use noise::{create_noise_field, NoiseField, PermutationTable};
pub use prng::{ParkMiller, Xorshift64};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use seed::Seed;

#![deny(unsafe_code)]
//! Orbit-to-flow particle field.
//!
//! Thousands of particles start on concentric spiral orbits around the canvas
//! center. After a hold, a cubic-eased phase blends the orbit spring force
//! into the curl of a 3D simplex noise field, and the particles dissolve into
//! a divergence-free flow that slowly evolves with time. A pointer pushes
//! particles away at every phase. Speed drives size, alpha and an amber to
//! cyan color shift.
//!
//! Storage is structure-of-arrays in `f32` so the buffers can be handed to a
//! GPU as point attributes without repacking; arithmetic is `f64`.

pub mod config;
pub mod phase;

use std::f64::consts::PI;

use glam::DVec2;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use vector_field_core::clock::{FrameDelta, REFERENCE_FPS};
use vector_field_core::color::{Srgb, AMBER, CYAN};
use vector_field_core::draw::{BlendMode, DrawCommand, DrawList};
use vector_field_core::error::EngineError;
use vector_field_core::field_source::{CurlNoiseSource, FieldSource, PointerRepulsor};
use vector_field_core::noise::NoiseField;
use vector_field_core::prng::Xorshift64;
use vector_field_core::Engine;

pub use config::{DeviceClass, ParticleConfig};
pub use phase::{ease_in_out_cubic, linear_phase};

/// Innermost orbit radius in pixels.
const ORBIT_BASE_RADIUS: f64 = 30.0;
/// Outermost orbit as a fraction of the short canvas side.
const ORBIT_SPREAD: f64 = 0.42;
/// Total random radial jitter in pixels.
const ORBIT_JITTER: f64 = 60.0;
/// Spiral turns across the ensemble, in radians.
const SPIRAL_ANGLE: f64 = 24.0 * PI;
const ANGLE_JITTER: f64 = 0.5;
/// Angular speed range in radians per frame.
const ORBIT_SPEED_MIN: f64 = 0.008;
const ORBIT_SPEED_RANGE: f64 = 0.012;

/// Curl force scale on top of `base_speed`.
const CURL_FORCE_SCALE: f64 = 0.1;
/// Pointer impulse scale on top of the repulsion force.
const POINTER_IMPULSE_SCALE: f64 = 0.05;
/// Speed in px/frame at which visuals saturate.
const SPEED_NORM: f64 = 4.0;
/// Maximum amber to cyan blend.
const COLOR_SHIFT: f64 = 0.8;

/// Outcome of [`ParticleSystem::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    Ready,
    /// The canvas size was unusable; the next valid `resize` completes it.
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Request {
    count: usize,
    device: DeviceClass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lifecycle {
    /// Waiting for a usable canvas. `None` means the count and device class
    /// are decided from the first valid size.
    Deferred(Option<Request>),
    Ready,
    Disposed,
}

/// Per-particle render attributes, one entry per particle.
///
/// `color` is interleaved RGB, three floats per particle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderAttributes {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub size: Vec<f32>,
    pub alpha: Vec<f32>,
    pub color: Vec<f32>,
}

impl RenderAttributes {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// The particle field of one canvas.
pub struct ParticleSystem {
    config: ParticleConfig,
    flow: CurlNoiseSource<NoiseField>,
    rng: Xorshift64,
    lifecycle: Lifecycle,
    device: DeviceClass,
    width: f64,
    height: f64,
    /// Elapsed simulation time in reference frames.
    time: f64,
    pointer: Option<DVec2>,

    pos_x: Vec<f32>,
    pos_y: Vec<f32>,
    vel_x: Vec<f32>,
    vel_y: Vec<f32>,
    orbit_radius: Vec<f32>,
    orbit_angle: Vec<f32>,
    orbit_speed: Vec<f32>,
    orbit_dir: Vec<f32>,
    size: Vec<f32>,
    alpha: Vec<f32>,
    color: Vec<f32>,
}

impl ParticleSystem {
    /// Creates an empty system. Particles appear on [`initialize`](Self::initialize)
    /// or, for engine use, on the first valid [`resize`](Self::resize).
    pub fn new(seed: u64, config: ParticleConfig) -> Self {
        let noise = NoiseField::new(config.noise_seed);
        Self {
            flow: CurlNoiseSource::new(noise, config.noise_scale, config.noise_speed),
            config,
            rng: Xorshift64::new(seed),
            lifecycle: Lifecycle::Deferred(None),
            device: DeviceClass::Desktop,
            width: 0.0,
            height: 0.0,
            time: 0.0,
            pointer: None,
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            vel_x: Vec::new(),
            vel_y: Vec::new(),
            orbit_radius: Vec::new(),
            orbit_angle: Vec::new(),
            orbit_speed: Vec::new(),
            orbit_dir: Vec::new(),
            size: Vec::new(),
            alpha: Vec::new(),
            color: Vec::new(),
        }
    }

    /// Creates a system from a JSON params object.
    pub fn from_json(seed: u64, params: &Value) -> Self {
        Self::new(seed, ParticleConfig::from_json(params))
    }

    /// Places `count` particles on spiral orbits around the canvas center.
    ///
    /// Non-finite or non-positive dimensions defer the work to the next
    /// valid [`resize`](Self::resize). A disposed system stays disposed.
    pub fn initialize(
        &mut self,
        count: usize,
        width: f64,
        height: f64,
        device: DeviceClass,
    ) -> Initialization {
        if self.lifecycle == Lifecycle::Disposed {
            return Initialization::Deferred;
        }
        let request = Request { count, device };
        if !valid_size(width, height) {
            debug!(width, height, count, "particle init deferred");
            self.lifecycle = Lifecycle::Deferred(Some(request));
            return Initialization::Deferred;
        }
        self.populate(request, width, height);
        Initialization::Ready
    }

    fn populate(&mut self, request: Request, width: f64, height: f64) {
        let Request { count, device } = request;
        self.width = width;
        self.height = height;
        self.device = device;
        self.time = 0.0;

        self.pos_x = Vec::with_capacity(count);
        self.pos_y = Vec::with_capacity(count);
        self.orbit_radius = Vec::with_capacity(count);
        self.orbit_angle = Vec::with_capacity(count);
        self.orbit_speed = Vec::with_capacity(count);
        self.orbit_dir = Vec::with_capacity(count);
        self.size = Vec::with_capacity(count);
        self.alpha = Vec::with_capacity(count);
        self.color = Vec::with_capacity(count * 3);
        self.vel_x = vec![0.0; count];
        self.vel_y = vec![0.0; count];

        let center = DVec2::new(width * 0.5, height * 0.5);
        let max_radius = width.min(height) * ORBIT_SPREAD;
        let speed_factor = device.orbit_speed_factor();
        let amber = rgb_f32(AMBER);

        for i in 0..count {
            let u = i as f64 / count as f64;
            let radius = ORBIT_BASE_RADIUS + u * max_radius + self.rng.next_centered() * ORBIT_JITTER;
            let angle = u * SPIRAL_ANGLE + self.rng.next_f64() * ANGLE_JITTER;
            let speed = (ORBIT_SPEED_MIN + self.rng.next_f64() * ORBIT_SPEED_RANGE) * speed_factor;
            let dir = self.rng.next_sign();

            self.orbit_radius.push(radius as f32);
            self.orbit_angle.push(angle as f32);
            self.orbit_speed.push(speed as f32);
            self.orbit_dir.push(dir as f32);
            self.pos_x.push((center.x + angle.cos() * radius) as f32);
            self.pos_y.push((center.y + angle.sin() * radius) as f32);

            self.size.push((1.5 + self.rng.next_f64() * 2.0) as f32);
            self.alpha.push((0.25 + self.rng.next_f64() * 0.35) as f32);
            self.color.extend_from_slice(&amber);
        }

        self.lifecycle = Lifecycle::Ready;
        debug!(
            count,
            width,
            height,
            device = device.as_str(),
            "particle system initialized"
        );
    }

    /// Advances the simulation by `dt_seconds` of real time.
    ///
    /// The delta is clamped to 50 ms. Before initialization completes this
    /// is a no-op; after [`dispose`](Self::dispose) it reports
    /// `EngineError::Disposed`.
    pub fn step(&mut self, dt_seconds: f64, pointer: Option<DVec2>) -> Result<(), EngineError> {
        match self.lifecycle {
            Lifecycle::Disposed => return Err(EngineError::Disposed),
            Lifecycle::Deferred(_) => return Ok(()),
            Lifecycle::Ready => {}
        }
        let dt_scale = FrameDelta::from_seconds(dt_seconds).scale;
        self.time += dt_scale;

        let eased = self.eased_phase();
        let orbit_weight = 1.0 - eased;
        let damping = (self.config.damping_orbit
            + eased * (self.config.damping_free - self.config.damping_orbit))
            .powf(dt_scale);
        let spring = self.config.spring * dt_scale;
        let curl_gain = self.config.base_speed * CURL_FORCE_SCALE * dt_scale;
        let repulsor = pointer.map(|p| PointerRepulsor {
            x: p.x,
            y: p.y,
            radius: self.config.pointer_radius,
            force: self.config.pointer_force,
        });

        let (w, h) = (self.width, self.height);
        let (cx, cy) = (w * 0.5, h * 0.5);
        let margin = self.config.wrap_margin;

        for i in 0..self.pos_x.len() {
            let px = self.pos_x[i] as f64;
            let py = self.pos_y[i] as f64;

            let angle =
                self.orbit_angle[i] as f64 + self.orbit_speed[i] as f64 * self.orbit_dir[i] as f64 * dt_scale;
            self.orbit_angle[i] = angle as f32;
            let radius = self.orbit_radius[i] as f64;
            let target_x = cx + angle.cos() * radius;
            let target_y = cy + angle.sin() * radius;
            let orbit_fx = (target_x - px) * spring;
            let orbit_fy = (target_y - py) * spring;

            let (curl_x, curl_y) = self.flow.sample(px, py, self.time);
            let mut vx = self.vel_x[i] as f64 + orbit_fx * orbit_weight + curl_x * curl_gain * eased;
            let mut vy = self.vel_y[i] as f64 + orbit_fy * orbit_weight + curl_y * curl_gain * eased;

            if let Some(repulsor) = &repulsor {
                let (rx, ry) = repulsor.sample(px, py, self.time);
                vx += rx * POINTER_IMPULSE_SCALE * dt_scale;
                vy += ry * POINTER_IMPULSE_SCALE * dt_scale;
            }

            vx *= damping;
            vy *= damping;

            let x = wrap(px + vx * dt_scale, w, margin);
            let y = wrap(py + vy * dt_scale, h, margin);
            self.pos_x[i] = x as f32;
            self.pos_y[i] = y as f32;
            self.vel_x[i] = vx as f32;
            self.vel_y[i] = vy as f32;

            let n = ((vx * vx + vy * vy).sqrt() / SPEED_NORM).min(1.0);
            self.size[i] = (1.5 + n * 2.0) as f32;
            self.alpha[i] = (0.25 + n * 0.4) as f32;
            let c = rgb_f32(AMBER.lerp(CYAN, n * COLOR_SHIFT));
            self.color[i * 3..i * 3 + 3].copy_from_slice(&c);
        }
        Ok(())
    }

    /// Linear orbit-to-flow phase in [0, 1].
    pub fn phase(&self) -> f64 {
        linear_phase(self.time, self.config.orbit_hold, self.config.transition_len)
    }

    /// Cubic-eased phase; this is the actual force blend weight.
    pub fn eased_phase(&self) -> f64 {
        ease_in_out_cubic(self.phase())
    }

    /// Elapsed simulation time in reference frames.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Elapsed simulation time in seconds.
    pub fn time_seconds(&self) -> f64 {
        self.time / REFERENCE_FPS
    }

    /// Snapshot of every particle's render attributes.
    pub fn render_attributes(&self) -> RenderAttributes {
        RenderAttributes {
            x: self.pos_x.clone(),
            y: self.pos_y.clone(),
            size: self.size.clone(),
            alpha: self.alpha.clone(),
            color: self.color.clone(),
        }
    }

    pub fn sizes(&self) -> &[f32] {
        &self.size
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alpha
    }

    /// Interleaved `r, g, b` per particle.
    pub fn colors(&self) -> &[f32] {
        &self.color
    }

    pub fn positions(&self) -> (&[f32], &[f32]) {
        (&self.pos_x, &self.pos_y)
    }

    pub fn velocities(&self) -> (&[f32], &[f32]) {
        (&self.vel_x, &self.vel_y)
    }

    /// Records the new canvas size.
    ///
    /// Invalid sizes are ignored. If initialization was deferred, the first
    /// valid size completes it. Orbit radii keep the size they were built for.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !valid_size(width, height) {
            return;
        }
        match self.lifecycle {
            Lifecycle::Disposed => {}
            Lifecycle::Deferred(request) => {
                let request = request.unwrap_or_else(|| {
                    let device = DeviceClass::from_viewport_width(width);
                    Request {
                        count: self.config.count_for(device),
                        device,
                    }
                });
                self.populate(request, width, height);
            }
            Lifecycle::Ready => {
                debug!(width, height, "particle canvas resized");
                self.width = width;
                self.height = height;
            }
        }
    }

    /// Releases the particle buffers. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        for buf in [
            &mut self.pos_x,
            &mut self.pos_y,
            &mut self.vel_x,
            &mut self.vel_y,
            &mut self.orbit_radius,
            &mut self.orbit_angle,
            &mut self.orbit_speed,
            &mut self.orbit_dir,
            &mut self.size,
            &mut self.alpha,
            &mut self.color,
        ] {
            *buf = Vec::new();
        }
        self.lifecycle = Lifecycle::Disposed;
        debug!("particle system disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    pub fn len(&self) -> usize {
        self.pos_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_x.is_empty()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }
}

impl Engine for ParticleSystem {
    fn advance(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
        self.step(dt_seconds, self.pointer)
    }

    fn resize(&mut self, width: f64, height: f64) {
        ParticleSystem::resize(self, width, height);
    }

    fn set_pointer(&mut self, pointer: Option<DVec2>) {
        self.pointer = pointer;
    }

    /// Emits one soft point per particle and switches the list to additive
    /// blending.
    fn draw(&self, list: &mut DrawList) {
        list.blend = BlendMode::Additive;
        for i in 0..self.pos_x.len() {
            list.push(DrawCommand::Point {
                x: self.pos_x[i] as f64,
                y: self.pos_y[i] as f64,
                size: self.size[i] as f64,
                color: Srgb::new(
                    self.color[i * 3] as f64,
                    self.color[i * 3 + 1] as f64,
                    self.color[i * 3 + 2] as f64,
                ),
                alpha: self.alpha[i] as f64,
            });
        }
    }

    fn params(&self) -> Value {
        self.config.to_json()
    }

    fn param_schema(&self) -> Value {
        ParticleConfig::schema()
    }

    fn dispose(&mut self) {
        ParticleSystem::dispose(self);
    }

    fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }
}

fn valid_size(width: f64, height: f64) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

/// Wraps a coordinate that left `[-margin, extent + margin]` to the far edge.
fn wrap(v: f64, extent: f64, margin: f64) -> f64 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}

fn rgb_f32(c: Srgb) -> [f32; 3] {
    [c.r as f32, c.g as f32, c.b as f32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vector_field_core::clock::MAX_FRAME_DT;

    const DT: f64 = 1.0 / 60.0;

    fn system(count: usize, w: f64, h: f64, seed: u64) -> ParticleSystem {
        let mut s = ParticleSystem::new(seed, ParticleConfig::default());
        assert_eq!(
            s.initialize(count, w, h, DeviceClass::Desktop),
            Initialization::Ready
        );
        s
    }

    fn bits(v: &[f32]) -> Vec<u32> {
        v.iter().map(|f| f.to_bits()).collect()
    }

    // ---- Initialization ----

    #[test]
    fn huge_json_count_is_capped_on_resize() {
        let mut s = ParticleSystem::from_json(1, &json!({"count": u64::MAX}));
        Engine::resize(&mut s, 800.0, 600.0);
        assert_eq!(s.len(), config::MAX_PARTICLE_COUNT);
        assert_eq!(s.render_attributes().len(), config::MAX_PARTICLE_COUNT);
    }

    #[test]
    fn initialize_places_particles_on_orbits() {
        let s = system(500, 800.0, 600.0, 1);
        let (xs, ys) = s.positions();
        for i in 0..s.len() {
            let dx = xs[i] as f64 - 400.0;
            let dy = ys[i] as f64 - 300.0;
            let r = (dx * dx + dy * dy).sqrt();
            assert!((r - s.orbit_radius[i] as f64).abs() < 1e-2);
            assert!(s.orbit_dir[i] == 1.0 || s.orbit_dir[i] == -1.0);
        }
        let (vx, vy) = s.velocities();
        assert!(vx.iter().chain(vy).all(|v| *v == 0.0));
    }

    #[test]
    fn initial_attributes_are_in_range() {
        let s = system(300, 800.0, 600.0, 9);
        let attrs = s.render_attributes();
        assert!(attrs.size.iter().all(|v| (1.5..=3.5).contains(v)));
        assert!(attrs.alpha.iter().all(|v| (0.25..=0.6).contains(v)));
        let amber = rgb_f32(AMBER);
        assert!(attrs.color.chunks(3).all(|c| c == amber));
    }

    #[test]
    fn orbit_radius_spans_the_canvas() {
        let s = system(1000, 1000.0, 500.0, 3);
        let max = s.orbit_radius.iter().cloned().fold(f32::MIN, f32::max) as f64;
        // 30 + 0.42 * 500 + 30 at most
        assert!(max <= 270.0 + 1e-3);
        assert!(max > 200.0);
    }

    #[test]
    fn constrained_devices_orbit_slower() {
        let mut s = ParticleSystem::new(5, ParticleConfig::default());
        s.initialize(200, 400.0, 800.0, DeviceClass::Constrained);
        let max_speed = s.orbit_speed.iter().cloned().fold(0.0_f32, f32::max) as f64;
        assert!(max_speed <= (ORBIT_SPEED_MIN + ORBIT_SPEED_RANGE) * 0.8 + 1e-6);
        assert_eq!(s.device(), DeviceClass::Constrained);
    }

    #[test]
    fn zero_dimensions_defer_until_resize() {
        let mut s = ParticleSystem::new(1, ParticleConfig::default());
        assert_eq!(
            s.initialize(100, 0.0, 600.0, DeviceClass::Desktop),
            Initialization::Deferred
        );
        assert!(!s.is_ready());
        assert!(s.is_empty());
        s.step(DT, None).unwrap();
        s.resize(f64::NAN, 10.0);
        assert!(s.is_empty());
        s.resize(800.0, 600.0);
        assert!(s.is_ready());
        assert_eq!(s.len(), 100);
    }

    #[test]
    fn engine_resize_picks_count_from_viewport() {
        let mut s = ParticleSystem::new(1, ParticleConfig::default());
        Engine::resize(&mut s, 375.0, 812.0);
        assert_eq!(s.len(), config::CONSTRAINED_PARTICLE_COUNT);
        assert_eq!(s.device(), DeviceClass::Constrained);

        let mut fixed = ParticleSystem::from_json(1, &json!({"count": 64}));
        Engine::resize(&mut fixed, 1920.0, 1080.0);
        assert_eq!(fixed.len(), 64);
    }

    // ---- Count invariant ----

    #[test]
    fn count_is_constant_over_lifetime() {
        let mut s = system(777, 640.0, 480.0, 11);
        for frame in 0..400 {
            let pointer = (frame % 3 == 0).then(|| DVec2::new(320.0, 240.0));
            s.step(DT, pointer).unwrap();
            if frame == 200 {
                s.resize(300.0, 900.0);
            }
            let attrs = s.render_attributes();
            assert_eq!(attrs.len(), 777);
            assert_eq!(attrs.y.len(), 777);
            assert_eq!(attrs.size.len(), 777);
            assert_eq!(attrs.alpha.len(), 777);
            assert_eq!(attrs.color.len(), 777 * 3);
        }
    }

    // ---- Wrap invariant ----

    #[test]
    fn positions_stay_within_wrap_margin() {
        let mut s = system(400, 320.0, 240.0, 21);
        s.config.base_speed = 40.0;
        s.config.orbit_hold = 0.0;
        s.config.transition_len = 1.0;
        for _ in 0..300 {
            s.step(MAX_FRAME_DT, Some(DVec2::new(160.0, 120.0))).unwrap();
            let (xs, ys) = s.positions();
            assert!(xs.iter().all(|x| (-20.0..=340.0).contains(x)));
            assert!(ys.iter().all(|y| (-20.0..=260.0).contains(y)));
        }
    }

    #[test]
    fn wrap_moves_to_opposite_edge() {
        assert_eq!(wrap(-20.5, 100.0, 20.0), 120.0);
        assert_eq!(wrap(120.5, 100.0, 20.0), -20.0);
        assert_eq!(wrap(-20.0, 100.0, 20.0), -20.0);
        assert_eq!(wrap(50.0, 100.0, 20.0), 50.0);
    }

    // ---- Phase ----

    #[test]
    fn phase_follows_time() {
        let mut s = system(10, 100.0, 100.0, 1);
        assert_eq!(s.phase(), 0.0);
        let mut last = 0.0;
        for _ in 0..400 {
            s.step(DT, None).unwrap();
            assert!(s.phase() >= last);
            last = s.phase();
        }
        assert!(s.time() >= 360.0);
        assert_eq!(s.phase(), 1.0);
        assert_eq!(s.eased_phase(), 1.0);
    }

    #[test]
    fn time_advances_by_clamped_frames() {
        let mut s = system(10, 100.0, 100.0, 1);
        s.step(10.0, None).unwrap();
        assert!((s.time() - 3.0).abs() < 1e-12);
        assert!((s.time_seconds() - MAX_FRAME_DT).abs() < 1e-12);
    }

    // ---- dt clamp ----

    #[test]
    fn huge_dt_moves_no_further_than_clamped_dt() {
        let mut a = system(300, 800.0, 600.0, 8);
        let mut b = system(300, 800.0, 600.0, 8);
        a.step(10.0, None).unwrap();
        b.step(MAX_FRAME_DT, None).unwrap();
        assert_eq!(bits(a.positions().0), bits(b.positions().0));
        assert_eq!(bits(a.positions().1), bits(b.positions().1));
    }

    // ---- Pointer ----

    #[test]
    fn pointer_pushes_nearby_particles_away() {
        let mut with = system(1, 200.0, 200.0, 2);
        let mut without = system(1, 200.0, 200.0, 2);
        let (x0, y0) = (with.pos_x[0] as f64, with.pos_y[0] as f64);
        let pointer = DVec2::new(x0 + 10.0, y0);
        with.step(DT, Some(pointer)).unwrap();
        without.step(DT, None).unwrap();
        assert!(with.pos_x[0] < without.pos_x[0]);
    }

    #[test]
    fn pointer_outside_radius_has_no_effect() {
        let mut with = system(50, 200.0, 200.0, 2);
        let mut without = system(50, 200.0, 200.0, 2);
        with.step(DT, Some(DVec2::new(5000.0, 5000.0))).unwrap();
        without.step(DT, None).unwrap();
        assert_eq!(bits(with.positions().0), bits(without.positions().0));
    }

    // ---- Visuals ----

    #[test]
    fn visuals_track_speed() {
        let mut s = system(200, 400.0, 400.0, 4);
        for _ in 0..30 {
            s.step(DT, Some(DVec2::new(200.0, 200.0))).unwrap();
        }
        let (vx, vy) = s.velocities();
        for i in 0..s.len() {
            let speed = ((vx[i] as f64).powi(2) + (vy[i] as f64).powi(2)).sqrt();
            let n = (speed / SPEED_NORM).min(1.0);
            assert!((s.size[i] as f64 - (1.5 + n * 2.0)).abs() < 1e-3);
            assert!((s.alpha[i] as f64 - (0.25 + n * 0.4)).abs() < 1e-3);
        }
    }

    // ---- Determinism ----

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = system(250, 500.0, 400.0, 77);
        let mut b = system(250, 500.0, 400.0, 77);
        for _ in 0..50 {
            a.step(DT, None).unwrap();
            b.step(DT, None).unwrap();
        }
        assert_eq!(a.render_attributes(), b.render_attributes());
    }

    #[test]
    fn different_seed_different_ensemble() {
        let a = system(100, 500.0, 400.0, 1);
        let b = system(100, 500.0, 400.0, 2);
        assert_ne!(bits(a.positions().0), bits(b.positions().0));
    }

    // ---- Dispose ----

    #[test]
    fn dispose_is_idempotent() {
        let mut s = system(100, 100.0, 100.0, 1);
        s.dispose();
        s.dispose();
        assert!(s.is_disposed());
        assert!(s.render_attributes().is_empty());
        assert!(matches!(s.step(DT, None), Err(EngineError::Disposed)));
        s.resize(200.0, 200.0);
        assert!(s.is_empty());
        assert_eq!(
            s.initialize(10, 100.0, 100.0, DeviceClass::Desktop),
            Initialization::Deferred
        );
    }

    // ---- Engine ----

    #[test]
    fn engine_draw_emits_one_point_per_particle() {
        let mut s = system(64, 100.0, 100.0, 1);
        s.set_pointer(Some(DVec2::new(50.0, 50.0)));
        s.advance(DT).unwrap();
        let mut list = DrawList::new(100.0, 100.0, BlendMode::Normal);
        s.draw(&mut list);
        assert_eq!(list.len(), 64);
        assert_eq!(list.blend, BlendMode::Additive);
        assert!(list
            .commands()
            .iter()
            .all(|c| matches!(c, DrawCommand::Point { .. })));
    }

    #[test]
    fn engine_params_round_trip() {
        let s = ParticleSystem::from_json(1, &json!({"spring": 0.1, "count": 5}));
        let p = s.params();
        assert_eq!(p["spring"], 0.1);
        assert_eq!(p["count"], 5);
        assert!(s.param_schema().get("spring").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn wrap_holds_for_any_dt_sequence(
                seed in 1u64..10_000,
                dts in prop::collection::vec(0.0_f64..0.2, 1..40),
            ) {
                let mut s = system(60, 200.0, 150.0, seed);
                s.config.orbit_hold = 0.0;
                for dt in dts {
                    s.step(dt, Some(DVec2::new(100.0, 75.0))).unwrap();
                }
                let (xs, ys) = s.positions();
                prop_assert!(xs.iter().all(|x| (-20.0..=220.0).contains(x)));
                prop_assert!(ys.iter().all(|y| (-20.0..=170.0).contains(y)));
                prop_assert_eq!(s.render_attributes().len(), 60);
            }

            #[test]
            fn oversized_dt_equals_ceiling(seed in 1u64..10_000, dt in 0.05_f64..1e4) {
                let mut a = system(20, 300.0, 300.0, seed);
                let mut b = system(20, 300.0, 300.0, seed);
                a.step(dt, None).unwrap();
                b.step(MAX_FRAME_DT, None).unwrap();
                prop_assert_eq!(bits(a.positions().0), bits(b.positions().0));
            }
        }
    }
}

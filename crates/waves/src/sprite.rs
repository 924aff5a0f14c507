//! Short-lived decorative particles: foam above the water, spray off the crest.
//!
//! Both fade through a triangular envelope: alpha ramps up linearly over the
//! first `ramp` fraction of life and decays linearly to zero at the end.
//! Ages and velocities are in reference frames.

use vector_field_core::prng::Xorshift64;

/// Ramp fraction of the foam envelope.
pub const FOAM_RAMP: f64 = 0.15;
/// Ramp fraction of the spray envelope.
pub const SPRAY_RAMP: f64 = 0.12;
/// Number of foam particles kept alive.
pub const DEFAULT_FOAM_COUNT: usize = 30;
/// Foam that rises this far above the canvas is respawned.
const FOAM_CEILING: f64 = -20.0;
/// Peak foam alpha.
const FOAM_ALPHA: f64 = 0.35;
/// Foam shrinks by this fraction over its life.
const FOAM_SHRINK: f64 = 0.3;

/// Expected spray spawns per frame.
pub const DEFAULT_SPRAY_RATE: f64 = 0.6;
/// Maximum live spray particles.
pub const DEFAULT_SPRAY_CAP: usize = 48;
/// Downward acceleration of spray in px/frame².
const SPRAY_GRAVITY: f64 = 0.025;
/// Peak spray alpha.
const SPRAY_ALPHA: f64 = 0.55;

/// Triangular life envelope in [0, 1] for life fraction `progress`.
pub fn envelope(progress: f64, ramp: f64) -> f64 {
    let v = if progress < ramp {
        progress / ramp
    } else {
        1.0 - (progress - ramp) / (1.0 - ramp)
    };
    v.clamp(0.0, 1.0)
}

/// A disc drawn by the host: position, radius and alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
}

/// One foam bubble. `x` is normalized to the canvas width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Foam {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub life: f64,
    pub max_life: f64,
    /// Horizontal drift in px/frame, applied as `vx / width`.
    pub vx: f64,
    pub vy: f64,
}

impl Foam {
    pub fn spawn(rng: &mut Xorshift64, height: f64) -> Self {
        Self {
            x: rng.next_f64(),
            y: height * (0.25 + rng.next_f64() * 0.15),
            radius: 1.5 + rng.next_f64() * 3.5,
            life: 0.0,
            max_life: 100.0 + rng.next_f64() * 140.0,
            vx: rng.next_centered() * 0.4,
            vy: -(0.4 + rng.next_f64() * 0.8),
        }
    }

    fn progress(&self) -> f64 {
        self.life / self.max_life
    }

    fn expired(&self) -> bool {
        self.life > self.max_life || self.y < FOAM_CEILING
    }
}

/// Fixed-size foam pool, refilled every frame.
#[derive(Debug, Clone, Default)]
pub struct FoamPool {
    capacity: usize,
    bubbles: Vec<Foam>,
}

impl FoamPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bubbles: Vec::with_capacity(capacity),
        }
    }

    /// Tops the pool up, then ages and moves every bubble.
    ///
    /// Bubbles that outlive `max_life` or rise past the ceiling are replaced
    /// in place by fresh ones.
    pub fn update(&mut self, rng: &mut Xorshift64, dt_scale: f64, width: f64, height: f64) {
        while self.bubbles.len() < self.capacity {
            self.bubbles.push(Foam::spawn(rng, height));
        }
        for bubble in self.bubbles.iter_mut().rev() {
            bubble.life += dt_scale;
            bubble.x += bubble.vx / width * dt_scale;
            bubble.y += bubble.vy * dt_scale;
            if bubble.expired() {
                *bubble = Foam::spawn(rng, height);
            }
        }
    }

    /// Visible bubbles in canvas pixels.
    pub fn dots(&self, width: f64) -> impl Iterator<Item = Dot> + '_ {
        self.bubbles.iter().filter_map(move |b| {
            let progress = b.progress();
            let alpha = envelope(progress, FOAM_RAMP) * FOAM_ALPHA;
            (alpha > 0.0).then(|| Dot {
                x: b.x * width,
                y: b.y,
                radius: b.radius * (1.0 - progress * FOAM_SHRINK),
                alpha,
            })
        })
    }

    pub fn bubbles(&self) -> &[Foam] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
    }
}

/// One spray droplet, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spray {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub life: f64,
    pub max_life: f64,
}

impl Spray {
    /// Spawns a droplet at `(x, y)` thrown up and sideways.
    pub fn spawn(rng: &mut Xorshift64, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: rng.next_centered() * 1.2,
            vy: -(0.6 + rng.next_f64() * 1.2),
            radius: 0.8 + rng.next_f64() * 1.6,
            life: 0.0,
            max_life: 30.0 + rng.next_f64() * 45.0,
        }
    }
}

/// Spray thrown off a crest, spawned probabilistically.
#[derive(Debug, Clone)]
pub struct SprayPool {
    rate: f64,
    cap: usize,
    droplets: Vec<Spray>,
}

impl SprayPool {
    pub fn new(rate: f64, cap: usize) -> Self {
        Self {
            rate: rate.max(0.0),
            cap,
            droplets: Vec::new(),
        }
    }

    /// Spawns new droplets, ages and moves all, and drops expired ones.
    ///
    /// `crest_at(nx)` returns the crest height at normalized x. On average
    /// `rate * dt_scale` droplets spawn per call, never beyond the cap.
    pub fn update<F>(
        &mut self,
        rng: &mut Xorshift64,
        dt_scale: f64,
        width: f64,
        crest_at: F,
    ) where
        F: Fn(f64) -> f64,
    {
        let mut budget = self.rate * dt_scale;
        while budget > 0.0 && self.droplets.len() < self.cap {
            if rng.chance(budget.min(1.0)) {
                let nx = rng.next_f64();
                self.droplets.push(Spray::spawn(rng, nx * width, crest_at(nx)));
            }
            budget -= 1.0;
        }

        for d in &mut self.droplets {
            d.life += dt_scale;
            d.vy += SPRAY_GRAVITY * dt_scale;
            d.x += d.vx * dt_scale;
            d.y += d.vy * dt_scale;
        }
        self.droplets.retain(|d| d.life <= d.max_life);
    }

    pub fn dots(&self) -> impl Iterator<Item = Dot> + '_ {
        self.droplets.iter().filter_map(|d| {
            let alpha = envelope(d.life / d.max_life, SPRAY_RAMP) * SPRAY_ALPHA;
            (alpha > 0.0).then_some(Dot {
                x: d.x,
                y: d.y,
                radius: d.radius,
                alpha,
            })
        })
    }

    pub fn droplets(&self) -> &[Spray] {
        &self.droplets
    }

    pub fn len(&self) -> usize {
        self.droplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.droplets.is_empty()
    }

    pub fn clear(&mut self) {
        self.droplets.clear();
    }
}

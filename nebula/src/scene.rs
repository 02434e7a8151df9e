//! Background layers and transient whispers.

use glam::Vec2;
use rand::Rng;

use crate::color::Color;
use crate::config::SceneConfig;
use crate::math::Viewport;

/// A background star. Position is in unit space and scaled to the
/// viewport at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub size: f32,
    pub opacity: f32,
    /// Flicker rate (radians per frame)
    pub speed: f32,
    pub phase: f32,
    /// Parallax depth factor
    pub depth: f32,
}

impl Star {
    /// Opacity multiplier for `frame`, in [0.4, 1.0].
    pub fn flicker(&self, frame: u64) -> f32 {
        (frame as f32 * self.speed + self.phase).sin() * 0.3 + 0.7
    }
}

/// A slowly drifting colored haze.
#[derive(Debug, Clone, PartialEq)]
pub struct NebulaCloud {
    /// Unit-space position
    pub position: Vec2,
    /// Unit-space velocity per frame
    pub velocity: Vec2,
    /// Radius as a fraction of the larger viewport side
    pub size: f32,
    pub color: Color,
}

impl NebulaCloud {
    /// Drift one frame, wrapping at the edges.
    pub fn drift(&mut self) {
        self.position += self.velocity;
        self.position.x = self.position.x.rem_euclid(1.0);
        self.position.y = self.position.y.rem_euclid(1.0);
    }
}

const CLOUD_COLORS: [Color; 3] = [
    Color::rgba(0, 255, 255, 0.03),
    Color::rgba(255, 0, 255, 0.03),
    Color::rgba(112, 0, 255, 0.03),
];

/// Stars and clouds, generated once per engine.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub stars: Vec<Star>,
    pub clouds: Vec<NebulaCloud>,
}

impl Scene {
    pub fn generate<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        let stars = (0..config.star_count)
            .map(|_| Star {
                position: Vec2::new(rng.gen(), rng.gen()),
                size: rng.gen_range(0.1..1.6),
                opacity: rng.gen_range(0.1..0.9),
                speed: rng.gen_range(0.005..0.025),
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
                depth: rng.gen_range(0.2..1.0),
            })
            .collect();

        let clouds = (0..config.cloud_count)
            .map(|i| NebulaCloud {
                position: Vec2::new(rng.gen(), rng.gen()),
                velocity: Vec2::new(rng.gen_range(-2e-4..2e-4), rng.gen_range(-2e-4..2e-4)),
                size: rng.gen_range(0.3..0.6),
                color: CLOUD_COLORS[i % CLOUD_COLORS.len()],
            })
            .collect();

        Self { stars, clouds }
    }

    pub fn drift_clouds(&mut self) {
        for cloud in &mut self.clouds {
            cloud.drift();
        }
    }
}

/// Convert a unit-space point to canvas pixels.
pub fn to_canvas(unit: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(unit.x * viewport.width, unit.y * viewport.height)
}

/// A member's vibe floating up from their node after a click.
#[derive(Debug, Clone, PartialEq)]
pub struct Whisper {
    pub text: String,
    pub position: Vec2,
    age: u32,
    lifetime: u32,
    rise: f32,
}

impl Whisper {
    pub fn new(text: impl Into<String>, position: Vec2, lifetime: u32, rise: f32) -> Self {
        Self {
            text: text.into(),
            position,
            age: 0,
            lifetime: lifetime.max(1),
            rise,
        }
    }

    /// Rise and age one frame.
    pub fn advance(&mut self) {
        self.position.y -= self.rise;
        self.age = self.age.saturating_add(1);
    }

    pub fn alpha(&self) -> f32 {
        (1.0 - self.age as f32 / self.lifetime as f32).max(0.0)
    }

    pub fn is_faded(&self) -> bool {
        self.alpha() <= 0.0
    }
}

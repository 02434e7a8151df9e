//! Configuration for the Nebula engine.

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Nebula`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NebulaConfig {
    /// Force layout tuning
    pub physics: PhysicsConfig,
    /// Node sizing and orbiters
    pub nodes: NodeConfig,
    /// Background layers
    pub scene: SceneConfig,
    /// Pointer handling and whispers
    pub interaction: InteractionConfig,
}

impl NebulaConfig {
    /// Load config from YAML. Missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Force layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fraction of the gap to `alpha_floor` closed each tick
    pub alpha_decay: f32,
    /// Alpha never drops below this, so the layout keeps relaxing
    pub alpha_floor: f32,
    /// Fraction of velocity lost each tick
    pub velocity_decay: f32,
    /// Base many-body strength (negative repels)
    pub charge_strength: f32,
    /// Extra repulsion per unit of resonance
    pub charge_resonance_gain: f32,
    /// Collision footprint added per orbiter
    pub collide_per_orbiter: f32,
    /// Collision footprint padding
    pub collide_padding: f32,
    /// Distance kept from the canvas edges
    pub bounds_margin: f32,
    /// Pull between members of similar resonance; `None` disables it
    pub affinity_strength: Option<f32>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            alpha_decay: 0.0228, // ~300 ticks to settle
            alpha_floor: 0.02,
            velocity_decay: 0.4,
            charge_strength: -300.0,
            charge_resonance_gain: 0.2,
            collide_per_orbiter: 15.0,
            collide_padding: 20.0,
            bounds_margin: 100.0,
            affinity_strength: Some(0.02),
        }
    }
}

/// Node sizing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Core radius of a member who has not posted today
    pub base_radius: f32,
    /// Core radius of a member who posted today
    pub posted_radius: f32,
    /// Radius growth per unit of resonance
    pub resonance_scale: f32,
    /// Orbiters every node has
    pub base_orbiters: usize,
    /// Cap on orbiters earned through resonance
    pub max_extra_orbiters: u32,
    /// Distance of the innermost orbiter
    pub orbiter_base_distance: f32,
    /// Spacing between orbiter rings before scaling
    pub orbiter_spacing: f32,
    /// Speed spread in radians per frame; ring `i` spins at up to
    /// half of this divided by `i + 1`, either way round
    pub orbiter_speed: f32,
    /// Every n-th orbiter, starting with the first, is a planet
    pub planet_every: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_radius: 16.0,
            posted_radius: 24.0,
            resonance_scale: 0.1,
            base_orbiters: 3,
            max_extra_orbiters: 10,
            orbiter_base_distance: 30.0,
            orbiter_spacing: 12.0,
            orbiter_speed: 0.04,
            planet_every: 3,
        }
    }
}

/// Background layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Background fill (hex)
    pub background: String,
    pub star_count: usize,
    pub cloud_count: usize,
    /// Pairs closer than this are linked
    pub connection_distance: f32,
    /// Link opacity at zero distance
    pub connection_alpha: f32,
    /// Star offset per pixel of pointer displacement from center
    pub parallax: f32,
    /// Seed for stars, clouds and orbiters
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: "#020408".to_string(),
            star_count: 400,
            cloud_count: 5,
            connection_distance: 400.0,
            connection_alpha: 0.08,
            parallax: 0.05,
            seed: 0x0a0a,
        }
    }
}

/// Pointer and whisper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pixels beyond a node's radius that still count as a hit
    pub hit_margin: f32,
    /// Fraction of the gap to the real pointer closed each frame
    pub pointer_smoothing: f32,
    /// Frames a whisper takes to fade out
    pub whisper_frames: u32,
    /// Pixels a whisper rises per frame
    pub whisper_rise: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hit_margin: 20.0,
            pointer_smoothing: 0.1,
            whisper_frames: 90,
            whisper_rise: 0.5,
        }
    }
}

//! Simulation nodes derived from members.
//!
//! A [`SimNode`] pairs the member record ("identity") with mutable
//! animation state ("sim"). Nodes live in a [`NodeGraph`] where every
//! pair of members is linked, weighted by how close their resonance is.
//! The graph is rebuilt wholesale whenever the member or pulse snapshot
//! changes; nothing here is persisted.

use std::f32::consts::TAU;

use aura_core::{has_posted_today, resonance_by_user, Pulse, UserProfile};
use chrono::{DateTime, TimeZone};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::color::Palette;
use crate::config::NodeConfig;
use crate::math::Viewport;
use crate::sim::{Body, Kinematics, LayoutGraph, Link};

/// Members of the current snapshot and the links between them.
pub type NodeGraph = LayoutGraph<SimNode>;

/// A small body circling a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbiter {
    pub distance: f32,
    /// Current angle (radians)
    pub angle: f32,
    /// Radians per frame
    pub speed: f32,
    pub size: f32,
    /// Planets are drawn brighter and leave a glowing trail
    pub is_planet: bool,
}

impl Orbiter {
    pub fn advance(&mut self) {
        self.angle = (self.angle + self.speed).rem_euclid(TAU);
    }

    /// Position relative to the node center.
    pub fn offset(&self) -> Vec2 {
        Vec2::from_angle(self.angle) * self.distance
    }
}

/// Animation state of one node.
#[derive(Debug, Clone)]
pub struct SimState {
    pub kinematics: Kinematics,
    /// Core radius
    pub radius: f32,
    pub palette: Palette,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub orbiters: Vec<Orbiter>,
}

/// A member as the visualization sees it.
#[derive(Debug, Clone)]
pub struct SimNode {
    pub identity: UserProfile,
    /// Resonance received across all of the member's pulses
    pub total_resonance: u32,
    pub posted_today: bool,
    pub sim: SimState,
}

impl SimNode {
    pub fn position(&self) -> Vec2 {
        self.sim.kinematics.position
    }

    pub fn radius(&self) -> f32 {
        self.sim.radius
    }

    /// Whether `point` lies within the core radius plus `margin`.
    pub fn hit(&self, point: Vec2, margin: f32) -> bool {
        self.position().distance(point) < self.sim.radius + margin
    }

    /// Space the node needs including its orbiters.
    pub fn footprint(&self, per_orbiter: f32, padding: f32) -> f32 {
        self.sim.radius + self.sim.orbiters.len() as f32 * per_orbiter + padding
    }
}

impl Body for SimNode {
    fn kinematics(&self) -> &Kinematics {
        &self.sim.kinematics
    }

    fn kinematics_mut(&mut self) -> &mut Kinematics {
        &mut self.sim.kinematics
    }
}

/// Core radius for a member.
pub fn node_radius(config: &NodeConfig, total_resonance: u32, posted_today: bool) -> f32 {
    let base = if posted_today {
        config.posted_radius
    } else {
        config.base_radius
    };
    base * (1.0 + total_resonance as f32 * config.resonance_scale)
}

/// Link weight between two members: 1 for equal resonance, falling
/// off with the difference.
pub fn affinity(a: u32, b: u32) -> f32 {
    1.0 / (1.0 + a.abs_diff(b) as f32)
}

/// Orbiter count for a member.
pub fn orbiter_count(config: &NodeConfig, total_resonance: u32) -> usize {
    config.base_orbiters + total_resonance.min(config.max_extra_orbiters) as usize
}

/// Builds nodes from member and pulse snapshots.
#[derive(Debug, Clone)]
pub struct NodeBuilder<'a> {
    config: &'a NodeConfig,
    viewport: Viewport,
    seed: u64,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(config: &'a NodeConfig, viewport: Viewport, seed: u64) -> Self {
        Self {
            config,
            viewport,
            seed,
        }
    }

    /// One node per member, in member order (node index `i` is member
    /// `i`), with every pair linked by [`affinity`].
    ///
    /// "Posted today" is judged in `now`'s time zone.
    pub fn build<Tz: TimeZone>(
        &self,
        users: &[UserProfile],
        pulses: &[Pulse],
        now: &DateTime<Tz>,
    ) -> NodeGraph {
        let resonance = resonance_by_user(pulses);
        let n = users.len();
        let mut graph = NodeGraph::with_capacity(n, n * n.saturating_sub(1) / 2);

        let ids: Vec<_> = users
            .iter()
            .enumerate()
            .map(|(index, user)| {
                let total = resonance.get(&user.id).copied().unwrap_or(0);
                let posted = has_posted_today(user.last_pulse_at, now);
                graph.add_node(self.node(index, user, total, posted))
            })
            .collect();

        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let weight = affinity(graph[a].total_resonance, graph[b].total_resonance);
                graph.add_edge(a, b, Link::new(weight));
            }
        }
        graph
    }

    fn node(&self, index: usize, user: &UserProfile, total: u32, posted: bool) -> SimNode {
        let mut rng = self.rng_for(&user.id);
        let radius = node_radius(self.config, total, posted);
        let scale = 1.0 + total as f32 * self.config.resonance_scale;
        let planet_every = self.config.planet_every.max(1);

        let orbiters = (0..orbiter_count(self.config, total))
            .map(|i| Orbiter {
                distance: self.config.orbiter_base_distance
                    + i as f32 * self.config.orbiter_spacing * scale,
                angle: rng.gen_range(0.0..TAU),
                speed: (rng.gen::<f32>() - 0.5) * self.config.orbiter_speed / (i + 1) as f32,
                size: rng.gen::<f32>() * 3.0 + 1.0,
                is_planet: i % planet_every == 0,
            })
            .collect();

        let position = Vec2::new(
            rng.gen_range(0.0..=self.viewport.width.max(1.0)),
            rng.gen_range(0.0..=self.viewport.height.max(1.0)),
        );

        SimNode {
            identity: user.clone(),
            total_resonance: total,
            posted_today: posted,
            sim: SimState {
                kinematics: Kinematics::at(position),
                radius,
                palette: Palette::for_node(index, user.color.as_deref()),
                rotation: rng.gen_range(0.0..TAU),
                rotation_speed: (rng.gen::<f32>() - 0.5) * 0.015,
                orbiters,
            },
        }
    }

    /// Per-member RNG, stable across rebuilds.
    fn rng_for(&self, id: &str) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(id.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        StdRng::seed_from_u64(u64::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use petgraph::stable_graph::NodeIndex;

    fn user(id: &str) -> UserProfile {
        UserProfile::new(id, id.to_uppercase(), "vibe", "")
    }

    fn pulse(id: &str, author: &UserProfile, resonance: u32) -> Pulse {
        let mut p = Pulse::new(id, author, "text", "", 0, 0.5);
        p.resonance_count = resonance;
        p
    }

    fn build(users: &[UserProfile], pulses: &[Pulse], seed: u64) -> NodeGraph {
        NodeBuilder::new(&NodeConfig::default(), Viewport::new(800.0, 600.0), seed).build(
            users,
            pulses,
            &Utc::now(),
        )
    }

    #[test]
    fn test_radius_and_orbiters_scale_with_resonance() {
        let config = NodeConfig::default();
        assert_eq!(node_radius(&config, 0, false), 16.0);
        assert_eq!(node_radius(&config, 0, true), 24.0);
        assert!((node_radius(&config, 6, false) - 16.0 * 1.6).abs() < 1e-4);

        assert_eq!(orbiter_count(&config, 0), 3);
        assert_eq!(orbiter_count(&config, 6), 9);
        assert_eq!(orbiter_count(&config, 500), 13);
    }

    #[test]
    fn test_build_aggregates_resonance_per_member() {
        let (a, b) = (user("a"), user("b"));
        let pulses = vec![pulse("1", &b, 2), pulse("2", &b, 4)];
        let graph = build(&[a, b], &pulses, 1);

        assert_eq!(graph.node_count(), 2);
        let (a, b) = (&graph[NodeIndex::new(0)], &graph[NodeIndex::new(1)]);
        assert_eq!(a.total_resonance, 0);
        assert_eq!(b.total_resonance, 6);
        assert!(b.radius() > a.radius());
        assert_eq!(b.sim.orbiters.len(), 9);
    }

    #[test]
    fn test_every_pair_is_linked_by_affinity() {
        let (a, b, c) = (user("a"), user("b"), user("c"));
        let pulses = vec![pulse("1", &b, 3)];
        let graph = build(&[a, b, c], &pulses, 1);
        assert_eq!(graph.edge_count(), 3);

        let weight = |x: usize, y: usize| {
            let edge = graph
                .find_edge(NodeIndex::new(x), NodeIndex::new(y))
                .unwrap();
            graph[edge].weight
        };
        assert_eq!(weight(0, 2), 1.0);
        assert_eq!(weight(0, 1), 0.25);
        assert_eq!(weight(2, 1), 0.25);
        assert_eq!(affinity(7, 2), affinity(2, 7));
    }

    #[test]
    fn test_orbiter_rings_follow_resonance_scale() {
        let config = NodeConfig::default();
        let zion = user("zion");
        let rich = user("rich");
        let pulses = vec![pulse("1", &rich, 5)];
        let graph = build(&[zion, rich], &pulses, 1);

        for (index, scale) in [(0, 1.0), (1, 1.5)] {
            let orbiters = &graph[NodeIndex::new(index)].sim.orbiters;
            for (i, orbiter) in orbiters.iter().enumerate() {
                let expected = config.orbiter_base_distance + i as f32 * config.orbiter_spacing * scale;
                assert!((orbiter.distance - expected).abs() < 1e-4, "ring {i}: {}", orbiter.distance);
                assert!(orbiter.speed.abs() <= 0.02 / (i + 1) as f32);
                assert!((1.0..4.0).contains(&orbiter.size));
                assert_eq!(orbiter.is_planet, i % 3 == 0);
            }
        }
        assert_eq!(graph[NodeIndex::new(0)].sim.orbiters[0].distance, 30.0);
    }

    #[test]
    fn test_posted_today_enlarges_node() {
        let now = Utc::now();
        let mut a = user("a");
        a.record_pulse(now.timestamp_millis());
        let graph = NodeBuilder::new(&NodeConfig::default(), Viewport::new(800.0, 600.0), 1)
            .build(&[a], &[], &now);
        let node = &graph[NodeIndex::new(0)];
        assert!(node.posted_today);
        assert_eq!(node.radius(), 24.0);
    }

    #[test]
    fn test_build_is_deterministic_per_seed() {
        let users = [user("a")];
        let id = NodeIndex::new(0);
        let first = build(&users, &[], 7);
        let again = build(&users, &[], 7);
        let other = build(&users, &[], 8);

        assert_eq!(first[id].position(), again[id].position());
        assert_eq!(first[id].sim.orbiters, again[id].sim.orbiters);
        assert_ne!(first[id].position(), other[id].position());
    }

    #[test]
    fn test_orbiter_advance_wraps() {
        let mut orbiter = Orbiter {
            distance: 10.0,
            angle: TAU - 0.001,
            speed: 0.01,
            size: 1.0,
            is_planet: false,
        };
        orbiter.advance();
        assert!(orbiter.angle >= 0.0 && orbiter.angle < 0.01);
        assert!((orbiter.offset().length() - 10.0).abs() < 1e-4);
    }
}

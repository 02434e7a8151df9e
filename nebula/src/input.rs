//! Pointer input and selection.

use aura_core::UserProfile;
use glam::Vec2;
use petgraph::stable_graph::NodeIndex;

use crate::math::Viewport;
use crate::node::NodeGraph;

/// Input delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum NebulaInput {
    PointerMove(Vec2),
    Click(Vec2),
    Resize(Viewport),
}

/// Notifications emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum NebulaEvent {
    /// A member's node was clicked
    UserSelected(UserProfile),
}

/// Pointer position with exponential smoothing, used for parallax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    target: Vec2,
    smoothed: Vec2,
}

impl Pointer {
    /// Start at rest on `origin`.
    pub fn new(origin: Vec2) -> Self {
        Self {
            target: origin,
            smoothed: origin,
        }
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Close `smoothing` of the gap to the real pointer.
    pub fn step(&mut self, smoothing: f32) {
        self.smoothed = self.smoothed.lerp(self.target, smoothing.clamp(0.0, 1.0));
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }
}

/// The node nearest `point` whose core radius plus `margin` contains it.
pub fn hit_test(graph: &NodeGraph, point: Vec2, margin: f32) -> Option<NodeIndex> {
    graph
        .node_indices()
        .filter(|&id| graph[id].hit(point, margin))
        .min_by(|&a, &b| {
            graph[a]
                .position()
                .distance(point)
                .total_cmp(&graph[b].position().distance(point))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::node::NodeBuilder;
    use chrono::Utc;

    fn graph_at(points: &[(f32, f32)]) -> NodeGraph {
        let users: Vec<UserProfile> = (0..points.len())
            .map(|i| UserProfile::new(format!("u{i}"), format!("U{i}"), "", ""))
            .collect();
        let config = NodeConfig::default();
        let mut graph =
            NodeBuilder::new(&config, Viewport::new(800.0, 600.0), 0).build(&users, &[], &Utc::now());
        for (i, &(x, y)) in points.iter().enumerate() {
            graph[NodeIndex::new(i)].sim.kinematics.position = Vec2::new(x, y);
        }
        graph
    }

    #[test]
    fn test_hit_within_margin() {
        let graph = graph_at(&[(100.0, 100.0)]);
        // radius 16 + margin 20
        assert_eq!(hit_test(&graph, Vec2::new(135.0, 100.0), 20.0), Some(NodeIndex::new(0)));
        assert_eq!(hit_test(&graph, Vec2::new(137.0, 100.0), 20.0), None);
    }

    #[test]
    fn test_hit_picks_nearest() {
        let graph = graph_at(&[(100.0, 100.0), (130.0, 100.0)]);
        assert_eq!(hit_test(&graph, Vec2::new(120.0, 100.0), 20.0), Some(NodeIndex::new(1)));
        assert_eq!(hit_test(&graph, Vec2::new(110.0, 100.0), 20.0), Some(NodeIndex::new(0)));
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(hit_test(&NodeGraph::default(), Vec2::ZERO, 20.0), None);
    }

    #[test]
    fn test_pointer_smoothing() {
        let mut pointer = Pointer::new(Vec2::ZERO);
        pointer.set_target(Vec2::new(100.0, 0.0));
        pointer.step(0.1);
        assert!((pointer.smoothed().x - 10.0).abs() < 1e-4);
        assert_eq!(pointer.target(), Vec2::new(100.0, 0.0));
    }
}

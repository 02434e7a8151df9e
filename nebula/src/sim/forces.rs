//! Built-in forces.

use glam::Vec2;

use super::{body_ids, jiggle, positions, Body, Force, LayoutGraph};
use crate::math::Viewport;

/// Per-body parameter lookup.
pub type Accessor<B> = Box<dyn Fn(&B) -> f32 + Send>;

fn cache<B>(graph: &LayoutGraph<B>, accessor: &Accessor<B>) -> Vec<f32> {
    graph.node_indices().map(|id| accessor(&graph[id])).collect()
}

/// Pairwise charge. Negative strength repels.
///
/// Exact O(n²) sum; populations here are small enough that a
/// Barnes-Hut tree would not pay for itself.
pub struct ManyBody<B> {
    strength: Accessor<B>,
    strengths: Vec<f32>,
    distance_min2: f32,
}

impl<B: Body> ManyBody<B> {
    pub fn new(strength: impl Fn(&B) -> f32 + Send + 'static) -> Self {
        Self {
            strength: Box::new(strength),
            strengths: Vec::new(),
            distance_min2: 1.0,
        }
    }
}

impl<B: Body> Force<B> for ManyBody<B> {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn initialize(&mut self, graph: &LayoutGraph<B>) {
        self.strengths = cache(graph, &self.strength);
    }

    fn apply(&mut self, graph: &mut LayoutGraph<B>, alpha: f32) {
        if self.strengths.len() != graph.node_count() {
            self.initialize(graph);
        }
        let ids = body_ids(graph);
        let pos = positions(graph, &ids);

        for (i, &id) in ids.iter().enumerate() {
            let mut dv = Vec2::ZERO;
            for (j, &other) in pos.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut d = other - pos[i];
                let mut l2 = d.length_squared();
                if l2 == 0.0 {
                    d = jiggle(i, j);
                    l2 = d.length_squared();
                }
                if l2 < self.distance_min2 {
                    l2 = (self.distance_min2 * l2).sqrt();
                }
                dv += d * (self.strengths[j] * alpha / l2);
            }
            graph[id].kinematics_mut().velocity += dv;
        }
    }
}

/// Shifts all bodies so their mean position sits on `target`.
#[derive(Debug, Clone)]
pub struct Center {
    target: Vec2,
    strength: f32,
}

impl Center {
    pub fn new(target: Vec2) -> Self {
        Self {
            target,
            strength: 1.0,
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }
}

impl<B: Body> Force<B> for Center {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&mut self, graph: &mut LayoutGraph<B>, _alpha: f32) {
        let ids = body_ids(graph);
        if ids.is_empty() {
            return;
        }
        let mean = positions(graph, &ids).into_iter().sum::<Vec2>() / ids.len() as f32;
        let shift = (mean - self.target) * self.strength;
        for id in ids {
            graph[id].kinematics_mut().position -= shift;
        }
    }
}

/// Keeps bodies from overlapping their collision radii.
pub struct Collide<B> {
    radius: Accessor<B>,
    radii: Vec<f32>,
    strength: f32,
}

impl<B: Body> Collide<B> {
    pub fn new(radius: impl Fn(&B) -> f32 + Send + 'static) -> Self {
        Self {
            radius: Box::new(radius),
            radii: Vec::new(),
            strength: 0.7,
        }
    }
}

impl<B: Body> Force<B> for Collide<B> {
    fn name(&self) -> &'static str {
        "collide"
    }

    fn initialize(&mut self, graph: &LayoutGraph<B>) {
        self.radii = cache(graph, &self.radius).into_iter().map(|r| r.max(0.0)).collect();
    }

    fn apply(&mut self, graph: &mut LayoutGraph<B>, _alpha: f32) {
        if self.radii.len() != graph.node_count() {
            self.initialize(graph);
        }
        let ids = body_ids(graph);
        // Resolve against where bodies are heading, not where they are.
        let predicted: Vec<Vec2> = ids
            .iter()
            .map(|&id| {
                let k = graph[id].kinematics();
                k.position + k.velocity
            })
            .collect();
        let mut dv = vec![Vec2::ZERO; ids.len()];

        for i in 0..ids.len() {
            let ri = self.radii[i];
            for j in (i + 1)..ids.len() {
                let rj = self.radii[j];
                let r = ri + rj;
                let mut d = predicted[i] - predicted[j];
                let mut l2 = d.length_squared();
                if l2 >= r * r {
                    continue;
                }
                if l2 == 0.0 {
                    d = jiggle(i, j);
                    l2 = d.length_squared();
                }
                let l = l2.sqrt();
                let k = (r - l) / l * self.strength;
                let (ri2, rj2) = (ri * ri, rj * rj);
                let share = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
                dv[i] += d * (k * share);
                dv[j] -= d * (k * (1.0 - share));
            }
        }

        for (id, dv) in ids.into_iter().zip(dv) {
            graph[id].kinematics_mut().velocity += dv;
        }
    }
}

/// Clamps positions into the viewport inset by a margin.
#[derive(Debug, Clone)]
pub struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Bounds {
    /// The margin shrinks to fit small viewports.
    pub fn within(viewport: Viewport, margin: f32) -> Self {
        let extent = viewport.extent().max(Vec2::ZERO);
        let inset = Vec2::splat(margin.max(0.0)).min(extent / 2.0);
        Self {
            min: inset,
            max: extent - inset,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

impl<B: Body> Force<B> for Bounds {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn apply(&mut self, graph: &mut LayoutGraph<B>, _alpha: f32) {
        for id in body_ids(graph) {
            let k = graph[id].kinematics_mut();
            k.position = k.position.max(self.min).min(self.max);
        }
    }
}

/// Pull along every link, scaled by the link weight.
///
/// With links weighted by similarity, bodies drift toward their most
/// similar neighbors.
#[derive(Debug, Clone)]
pub struct Affinity {
    strength: f32,
}

impl Affinity {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }
}

impl<B: Body> Force<B> for Affinity {
    fn name(&self) -> &'static str {
        "affinity"
    }

    fn apply(&mut self, graph: &mut LayoutGraph<B>, alpha: f32) {
        let n = graph.node_count();
        if n < 2 {
            return;
        }
        let scale = self.strength * alpha / n as f32;
        let edges: Vec<_> = graph.edge_indices().collect();

        for edge in edges {
            let Some((a, b)) = graph.edge_endpoints(edge) else {
                continue;
            };
            let weight = graph[edge].weight;
            let d = graph[b].kinematics().position - graph[a].kinematics().position;
            let pull = d * (weight * scale);
            graph[a].kinematics_mut().velocity += pull;
            graph[b].kinematics_mut().velocity -= pull;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::sim::tests::{dot, graph_of, Dot};
    use crate::sim::{Link, Simulation};
    use petgraph::stable_graph::NodeIndex;

    #[test]
    fn test_many_body_repels() {
        let mut force = ManyBody::new(|_: &Dot| -30.0);
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0), Dot::at(10.0, 0.0)]);
        force.apply(&mut graph, 1.0);

        let (a, b) = (dot(&graph, 0).k.velocity.x, dot(&graph, 1).k.velocity.x);
        assert!(a < 0.0);
        assert!(b > 0.0);
        assert!((a + b).abs() < 1e-5);
    }

    #[test]
    fn test_many_body_coincident_bodies_separate() {
        let mut force = ManyBody::new(|_: &Dot| -30.0);
        let mut graph = graph_of(vec![Dot::at(5.0, 5.0), Dot::at(5.0, 5.0)]);
        force.apply(&mut graph, 1.0);
        assert!(dot(&graph, 0).k.velocity.is_finite());
        assert_ne!(dot(&graph, 0).k.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_center_preserves_shape() {
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0), Dot::at(10.0, 0.0)]);
        Force::<Dot>::apply(&mut Center::new(Vec2::new(100.0, 100.0)), &mut graph, 1.0);
        assert_eq!(dot(&graph, 0).k.position, Vec2::new(95.0, 100.0));
        assert_eq!(dot(&graph, 1).k.position, Vec2::new(105.0, 100.0));
    }

    #[test]
    fn test_collide_pushes_overlapping_apart() {
        let mut force = Collide::new(|d: &Dot| d.radius);
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0), Dot::at(5.0, 0.0)]);
        force.apply(&mut graph, 1.0);
        assert!(dot(&graph, 0).k.velocity.x < 0.0);
        assert!(dot(&graph, 1).k.velocity.x > 0.0);

        let mut apart = graph_of(vec![Dot::at(0.0, 0.0), Dot::at(50.0, 0.0)]);
        force.apply(&mut apart, 1.0);
        assert_eq!(dot(&apart, 0).k.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_collide_heavier_body_moves_less() {
        let mut force = Collide::new(|d: &Dot| d.radius);
        let mut heavy = Dot::at(0.0, 0.0);
        heavy.radius = 30.0;
        let mut graph = graph_of(vec![heavy, Dot::at(10.0, 0.0)]);
        force.apply(&mut graph, 1.0);
        assert!(dot(&graph, 0).k.velocity.x.abs() < dot(&graph, 1).k.velocity.x.abs());
    }

    #[test]
    fn test_bounds_clamp_with_margin() {
        let mut bounds = Bounds::within(Viewport::new(400.0, 300.0), 100.0);
        let mut graph = graph_of(vec![Dot::at(-50.0, 1_000.0), Dot::at(200.0, 150.0)]);
        Force::<Dot>::apply(&mut bounds, &mut graph, 1.0);
        assert_eq!(dot(&graph, 0).k.position, Vec2::new(100.0, 200.0));
        assert_eq!(dot(&graph, 1).k.position, Vec2::new(200.0, 150.0));

        // Margin larger than half the viewport collapses to the center line.
        let tiny = Bounds::within(Viewport::new(100.0, 100.0), 100.0);
        assert!(tiny.contains(Vec2::new(50.0, 50.0)));
        assert!(!tiny.contains(Vec2::new(51.0, 50.0)));
    }

    #[test]
    fn test_affinity_follows_link_weights() {
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0), Dot::at(100.0, 0.0), Dot::at(0.0, 100.0)]);
        let (a, b, c) = (NodeIndex::new(0), NodeIndex::new(1), NodeIndex::new(2));
        graph.add_edge(a, b, Link::new(1.0));
        graph.add_edge(a, c, Link::new(0.1));
        Force::<Dot>::apply(&mut Affinity::new(1.0), &mut graph, 1.0);

        // Dot 0 is pulled harder along the heavier link.
        let v = dot(&graph, 0).k.velocity;
        assert!(v.x > v.y);
        assert!(v.y > 0.0);
        // Unlinked pairs feel nothing from each other.
        assert_eq!(dot(&graph, 1).k.velocity.y, 0.0);
    }

    #[test]
    fn test_layout_settles_inside_bounds() {
        let viewport = Viewport::new(800.0, 600.0);
        let config = PhysicsConfig::default();
        let mut sim = Simulation::new(&config)
            .with_force(ManyBody::new(|_: &Dot| -300.0))
            .with_force(Center::new(viewport.center()))
            .with_force(Collide::new(|d: &Dot| d.radius + 20.0))
            .with_force(Bounds::within(viewport, config.bounds_margin));
        let mut graph = graph_of(
            (0..8)
                .map(|i| Dot::at(390.0 + i as f32, 300.0 - i as f32))
                .collect(),
        );
        sim.initialize(&graph);

        for _ in 0..300 {
            sim.tick(&mut graph);
        }
        for id in graph.node_indices() {
            // Integration after the clamp can step slightly outside.
            let p = graph[id].k.position;
            assert!(p.x > 50.0 && p.x < 750.0 && p.y > 50.0 && p.y < 550.0, "{p:?}");
        }
        let spread = dot(&graph, 0).k.position.distance(dot(&graph, 7).k.position);
        assert!(spread > 20.0);
    }
}

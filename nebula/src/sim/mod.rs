//! Force-directed layout simulation.
//!
//! Bodies live as node weights of a petgraph [`StableUnGraph`]; edges
//! carry a [`Link`] weight that link forces read. A [`Simulation`] owns
//! an ordered list of [`Force`]s and an `alpha` "temperature". Each tick:
//!
//! 1. alpha moves toward `alpha_floor` by `alpha_decay`
//! 2. every force adjusts velocities (or positions) scaled by alpha
//! 3. velocities are damped by `velocity_decay` and integrated
//!
//! Alpha never reaches zero, so the layout keeps breathing while the
//! engine is attached.

pub mod forces;

pub use forces::{Affinity, Bounds, Center, Collide, ManyBody};

use glam::Vec2;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;

/// Position and velocity of one body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Kinematics {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }
}

/// Anything the simulation can move.
pub trait Body {
    fn kinematics(&self) -> &Kinematics;
    fn kinematics_mut(&mut self) -> &mut Kinematics;
}

/// Edge between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Scales link forces, in `0..=1`
    pub weight: f32,
}

impl Link {
    pub fn new(weight: f32) -> Self {
        Self {
            weight: weight.clamp(0.0, 1.0),
        }
    }
}

/// Bodies and their links.
pub type LayoutGraph<B> = StableUnGraph<B, Link>;

/// One force in the layout.
pub trait Force<B>: Send {
    /// Stable name; adding a force with an existing name replaces it.
    fn name(&self) -> &'static str;

    /// Cache per-body parameters. Called when bodies change.
    fn initialize(&mut self, _graph: &LayoutGraph<B>) {}

    fn apply(&mut self, graph: &mut LayoutGraph<B>, alpha: f32);
}

/// Force simulation over bodies of type `B`.
pub struct Simulation<B> {
    forces: Vec<Box<dyn Force<B>>>,
    alpha: f32,
    alpha_decay: f32,
    alpha_floor: f32,
    velocity_decay: f32,
    running: bool,
    ticks: u64,
}

impl<B: Body> Simulation<B> {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            forces: Vec::new(),
            alpha: 1.0,
            alpha_decay: config.alpha_decay.clamp(0.0, 1.0),
            alpha_floor: config.alpha_floor.clamp(0.0, 1.0),
            velocity_decay: config.velocity_decay.clamp(0.0, 1.0),
            running: true,
            ticks: 0,
        }
    }

    /// Builder-style [`Simulation::set_force`].
    pub fn with_force(mut self, force: impl Force<B> + 'static) -> Self {
        self.set_force(force);
        self
    }

    /// Add a force, replacing any force with the same name in place.
    pub fn set_force(&mut self, force: impl Force<B> + 'static) {
        let force: Box<dyn Force<B>> = Box::new(force);
        match self.forces.iter().position(|f| f.name() == force.name()) {
            Some(i) => self.forces[i] = force,
            None => self.forces.push(force),
        }
    }

    pub fn remove_force(&mut self, name: &str) -> bool {
        let before = self.forces.len();
        self.forces.retain(|f| f.name() != name);
        self.forces.len() != before
    }

    pub fn force_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|f| f.name()).collect()
    }

    /// Re-cache per-body parameters in every force.
    pub fn initialize(&mut self, graph: &LayoutGraph<B>) {
        for force in &mut self.forces {
            force.initialize(graph);
        }
    }

    /// Advance one step. No-op once stopped.
    pub fn tick(&mut self, graph: &mut LayoutGraph<B>) {
        if !self.running {
            return;
        }
        self.alpha += (self.alpha_floor - self.alpha) * self.alpha_decay;

        for force in &mut self.forces {
            force.apply(graph, self.alpha);
        }

        let damping = 1.0 - self.velocity_decay;
        for id in body_ids(graph) {
            let k = graph[id].kinematics_mut();
            k.velocity *= damping;
            k.position += k.velocity;
        }
        self.ticks += 1;
    }

    /// Raise alpha back to 1 so the layout re-settles.
    pub fn reheat(&mut self) {
        self.alpha = 1.0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl<B> std::fmt::Debug for Simulation<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("forces", &self.forces.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("alpha", &self.alpha)
            .field("running", &self.running)
            .field("ticks", &self.ticks)
            .finish()
    }
}

/// Node indices in graph order. Collected so the graph can be mutated
/// while walking them.
pub(crate) fn body_ids<B>(graph: &LayoutGraph<B>) -> Vec<NodeIndex> {
    graph.node_indices().collect()
}

/// Current positions, aligned with `ids`.
pub(crate) fn positions<B: Body>(graph: &LayoutGraph<B>, ids: &[NodeIndex]) -> Vec<Vec2> {
    ids.iter().map(|&id| graph[id].kinematics().position).collect()
}

/// Tiny deterministic displacement for coincident bodies.
pub(crate) fn jiggle(i: usize, j: usize) -> Vec2 {
    let h = (i as f32 + 1.0) * 12.9898 + (j as f32 + 1.0) * 78.233;
    let a = (h.sin() * 43_758.547).fract();
    Vec2::from_angle(a * std::f32::consts::TAU) * 1e-3
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    pub struct Dot {
        pub k: Kinematics,
        pub radius: f32,
    }

    impl Dot {
        pub fn at(x: f32, y: f32) -> Self {
            Self {
                k: Kinematics::at(Vec2::new(x, y)),
                radius: 10.0,
            }
        }
    }

    impl Body for Dot {
        fn kinematics(&self) -> &Kinematics {
            &self.k
        }
        fn kinematics_mut(&mut self) -> &mut Kinematics {
            &mut self.k
        }
    }

    /// Unlinked graph holding `dots` at indices `0..n`.
    pub fn graph_of(dots: Vec<Dot>) -> LayoutGraph<Dot> {
        let mut graph = LayoutGraph::default();
        for dot in dots {
            graph.add_node(dot);
        }
        graph
    }

    pub fn dot(graph: &LayoutGraph<Dot>, i: usize) -> &Dot {
        &graph[NodeIndex::new(i)]
    }

    #[test]
    fn test_alpha_decays_to_floor_but_never_stops() {
        let config = PhysicsConfig::default();
        let mut sim: Simulation<Dot> = Simulation::new(&config);
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0)]);

        for _ in 0..2_000 {
            sim.tick(&mut graph);
        }
        assert!(sim.is_running());
        assert!(sim.alpha() >= config.alpha_floor);
        assert!((sim.alpha() - config.alpha_floor).abs() < 1e-3);

        sim.reheat();
        assert_eq!(sim.alpha(), 1.0);
    }

    #[test]
    fn test_velocity_integrates_and_decays() {
        let mut sim: Simulation<Dot> = Simulation::new(&PhysicsConfig::default());
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0)]);
        graph[NodeIndex::new(0)].k.velocity = Vec2::new(10.0, 0.0);

        sim.tick(&mut graph);
        let moved = dot(&graph, 0);
        assert!((moved.k.velocity.x - 6.0).abs() < 1e-5);
        assert!((moved.k.position.x - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_set_force_replaces_by_name() {
        let mut sim: Simulation<Dot> = Simulation::new(&PhysicsConfig::default())
            .with_force(Center::new(Vec2::ZERO))
            .with_force(Center::new(Vec2::new(5.0, 5.0)));
        assert_eq!(sim.force_names(), vec!["center"]);
        assert!(sim.remove_force("center"));
        assert!(!sim.remove_force("center"));
    }

    #[test]
    fn test_stopped_simulation_does_not_move() {
        let mut sim: Simulation<Dot> = Simulation::new(&PhysicsConfig::default());
        let mut graph = graph_of(vec![Dot::at(1.0, 1.0)]);
        graph[NodeIndex::new(0)].k.velocity = Vec2::new(3.0, 3.0);
        sim.stop();
        sim.tick(&mut graph);
        assert_eq!(dot(&graph, 0).k.position, Vec2::new(1.0, 1.0));
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn test_removed_bodies_are_skipped() {
        let mut sim: Simulation<Dot> = Simulation::new(&PhysicsConfig::default())
            .with_force(ManyBody::new(|_: &Dot| -30.0));
        let mut graph = graph_of(vec![Dot::at(0.0, 0.0), Dot::at(10.0, 0.0), Dot::at(20.0, 0.0)]);
        graph.remove_node(NodeIndex::new(1));
        sim.initialize(&graph);
        sim.tick(&mut graph);

        // Stable indices survive the removal.
        assert_eq!(graph.node_count(), 2);
        assert!(dot(&graph, 0).k.position.x < 0.0);
        assert!(dot(&graph, 2).k.position.x > 20.0);
    }
}

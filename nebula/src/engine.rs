//! The Nebula engine.
//!
//! [`Nebula`] owns one [`RenderContext`] for the current member/pulse
//! snapshot. Snapshots are compared by identity (`Arc::ptr_eq`): a new
//! snapshot tears the context down and rebuilds it, an identical one is
//! a no-op. The host drives frames and feeds input.

use std::sync::Arc;

use aura_core::{Pulse, UserProfile};
use chrono::{DateTime, TimeZone};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::config::NebulaConfig;
use crate::error::{NebulaError, Result};
use crate::images::ImageCache;
use crate::input::{hit_test, NebulaEvent, NebulaInput, Pointer};
use crate::math::Viewport;
use crate::node::{NodeBuilder, NodeGraph, SimNode};
use crate::render;
use crate::scene::{Scene, Whisper};
use crate::sim::{Affinity, Bounds, Center, Collide, ManyBody, Simulation};

/// Everything one rendering pass needs.
#[derive(Debug)]
pub struct RenderContext {
    pub viewport: Viewport,
    /// Members as nodes, linked pairwise by resonance affinity
    pub graph: NodeGraph,
    pub simulation: Simulation<SimNode>,
    pub scene: Scene,
    pub pointer: Pointer,
    pub whispers: Vec<Whisper>,
    pub images: ImageCache,
    /// Frames drawn since the engine was created
    pub frame: u64,
}

/// Force-directed visualization of members.
#[derive(Debug)]
pub struct Nebula {
    config: NebulaConfig,
    ctx: RenderContext,
    users: Arc<[UserProfile]>,
    pulses: Arc<[Pulse]>,
    generation: u64,
}

impl Nebula {
    pub fn new(config: NebulaConfig, viewport: Viewport) -> Result<Self> {
        if !viewport.is_valid() {
            return Err(NebulaError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let scene = Scene::generate(&config.scene, &mut StdRng::seed_from_u64(config.scene.seed));
        let simulation = Simulation::new(&config.physics);
        Ok(Self {
            ctx: RenderContext {
                viewport,
                graph: NodeGraph::default(),
                simulation,
                scene,
                pointer: Pointer::new(viewport.center()),
                whispers: Vec::new(),
                images: ImageCache::new(),
                frame: 0,
            },
            config,
            users: Arc::from(Vec::new()),
            pulses: Arc::from(Vec::new()),
            generation: 0,
        })
    }

    /// Attach a member/pulse snapshot.
    ///
    /// Returns `false` when both slices are the same allocations already
    /// attached. Otherwise the previous nodes and forces are discarded
    /// and a fresh layout starts from alpha 1.
    pub fn set_data<Tz: TimeZone>(
        &mut self,
        users: Arc<[UserProfile]>,
        pulses: Arc<[Pulse]>,
        now: &DateTime<Tz>,
    ) -> bool {
        if Arc::ptr_eq(&self.users, &users) && Arc::ptr_eq(&self.pulses, &pulses) {
            return false;
        }
        self.teardown();
        self.users = users;
        self.pulses = pulses;
        self.rebuild(now);
        true
    }

    fn teardown(&mut self) {
        self.ctx.simulation.stop();
        self.ctx.graph.clear();
        self.ctx.whispers.clear();
    }

    fn rebuild<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let ctx = &mut self.ctx;
        ctx.graph = NodeBuilder::new(&self.config.nodes, ctx.viewport, self.config.scene.seed)
            .build(&self.users, &self.pulses, now);
        let evicted = ctx
            .images
            .retain_only(self.users.iter().map(|u| u.portrait_url.as_str()));
        for id in ctx.graph.node_indices() {
            ctx.images.request(&ctx.graph[id].identity.portrait_url);
        }
        ctx.simulation = build_simulation(&self.config, ctx.viewport);
        ctx.simulation.initialize(&ctx.graph);
        self.generation += 1;

        info!(
            generation = self.generation,
            nodes = ctx.graph.node_count(),
            links = ctx.graph.edge_count(),
            evicted_images = evicted,
            pulses = self.pulses.len(),
            "Nebula rebuilt"
        );
    }

    /// Apply host input. Clicks on a node return the selected member.
    pub fn handle_input(&mut self, input: NebulaInput) -> Option<NebulaEvent> {
        match input {
            NebulaInput::PointerMove(at) => {
                self.ctx.pointer.set_target(at);
                None
            }
            NebulaInput::Click(at) => {
                let id = hit_test(&self.ctx.graph, at, self.config.interaction.hit_margin)?;
                let node = &self.ctx.graph[id];
                debug!(user = %node.identity.id, "Node selected");
                self.ctx.whispers.push(Whisper::new(
                    node.identity.vibe.clone(),
                    node.position(),
                    self.config.interaction.whisper_frames,
                    self.config.interaction.whisper_rise,
                ));
                Some(NebulaEvent::UserSelected(node.identity.clone()))
            }
            NebulaInput::Resize(viewport) => {
                if let Err(e) = self.resize(viewport) {
                    debug!(error = %e, "Ignoring resize");
                }
                None
            }
        }
    }

    /// Re-center the layout on a new viewport and let it re-settle.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        if !viewport.is_valid() {
            return Err(NebulaError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let ctx = &mut self.ctx;
        ctx.viewport = viewport;
        ctx.simulation.set_force(Center::new(viewport.center()));
        ctx.simulation
            .set_force(Bounds::within(viewport, self.config.physics.bounds_margin));
        ctx.simulation.reheat();
        Ok(())
    }

    /// Advance physics and animation by one frame and draw it.
    pub fn frame(&mut self, canvas: &mut dyn Canvas) {
        let ctx = &mut self.ctx;
        ctx.frame += 1;
        ctx.pointer.step(self.config.interaction.pointer_smoothing);
        ctx.simulation.tick(&mut ctx.graph);
        for whisper in &mut ctx.whispers {
            whisper.advance();
        }
        ctx.whispers.retain(|w| !w.is_faded());
        render::draw(ctx, &self.config, canvas);
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SimNode> + '_ {
        let graph = &self.ctx.graph;
        graph.node_indices().map(move |id| &graph[id])
    }

    pub fn node_count(&self) -> usize {
        self.ctx.graph.node_count()
    }

    pub fn node(&self, user_id: &str) -> Option<&SimNode> {
        self.nodes().find(|n| n.identity.id == user_id)
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Image cache, for the host to report load results.
    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.ctx.images
    }

    pub fn config(&self) -> &NebulaConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.ctx.viewport
    }

    /// Number of rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame_count(&self) -> u64 {
        self.ctx.frame
    }
}

fn build_simulation(config: &NebulaConfig, viewport: Viewport) -> Simulation<SimNode> {
    let physics = &config.physics;
    let (charge, gain) = (physics.charge_strength, physics.charge_resonance_gain);
    let (per_orbiter, padding) = (physics.collide_per_orbiter, physics.collide_padding);

    let mut simulation = Simulation::new(physics)
        .with_force(ManyBody::new(move |n: &SimNode| {
            charge * (1.0 + n.total_resonance as f32 * gain)
        }))
        .with_force(Center::new(viewport.center()))
        .with_force(Collide::new(move |n: &SimNode| n.footprint(per_orbiter, padding)))
        .with_force(Bounds::within(viewport, physics.bounds_margin));
    if let Some(strength) = physics.affinity_strength {
        simulation.set_force(Affinity::new(strength));
    }
    simulation
}

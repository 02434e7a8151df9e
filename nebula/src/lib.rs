//! Nebula: force-directed particle view of Aura members
//!
//! Each member becomes a glowing node whose size, orbiters and label
//! grow with the resonance their pulses received. Nodes repel, avoid
//! overlap, stay on screen and drift toward members of similar
//! resonance.
//!
//! ```text
//!   users + pulses ──► NodeBuilder ──► NodeGraph ──► Simulation.tick()
//!                                           │
//!   NebulaInput ──► Nebula ◄────────────────┘
//!        │            │
//!        ▼            ▼
//!   NebulaEvent    render::draw ──► dyn Canvas (DisplayList | SvgCanvas)
//! ```
//!
//! The engine is synchronous; [`NebulaLoop`] paces it on a tokio task.

pub mod canvas;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod images;
pub mod input;
pub mod math;
pub mod node;
pub mod render;
pub mod runloop;
pub mod scene;
pub mod sim;

pub use canvas::{Canvas, DisplayList, DrawCommand, SvgCanvas};
pub use color::{Color, Palette};
pub use config::NebulaConfig;
pub use engine::{Nebula, RenderContext};
pub use error::{NebulaError, Result};
pub use images::{ImageCache, ImageState};
pub use glam::Vec2;
pub use input::{NebulaEvent, NebulaInput};
pub use math::Viewport;
pub use node::{NodeGraph, SimNode};
pub use runloop::{LoopCommand, LoopConfig, NebulaLoop};

//! Aura core model
//!
//! Plain records shared by every Aura crate:
//!
//! - [`UserProfile`] and [`Pulse`]: the two persisted entities
//! - [`Intention`]: the mood/energy/frequency/color analysis of a pulse
//! - [`bots`]: placeholder identities used when no real data is available
//! - [`resonance`]: aggregates derived from the pulse list on demand
//! - [`time`]: calendar-day helpers ("has posted today")
//!
//! Nothing in here performs I/O.

pub mod bots;
pub mod resonance;
pub mod time;
pub mod types;

pub use bots::{generate_bots, seed_users};
pub use resonance::{
    can_generate_seed, collective_resonance_hz, resonance_by_user, total_resonance,
    SEED_RESONANCE_COST,
};
pub use time::{has_posted_today, now_millis};
pub use types::*;

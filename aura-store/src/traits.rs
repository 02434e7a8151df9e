//! The `PulseStore` trait - the seam between Aura and its document database.

use async_trait::async_trait;

use aura_core::{Pulse, UserProfile};

use crate::error::Result;

/// Document store holding users and pulses.
#[async_trait]
pub trait PulseStore: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// All users, in store order.
    async fn get_users(&self) -> Result<Vec<UserProfile>>;

    /// All pulses, newest first.
    async fn get_pulses(&self) -> Result<Vec<Pulse>>;

    /// Insert or replace a user by id.
    async fn save_user(&self, user: &UserProfile) -> Result<()>;

    /// Insert a new pulse. Existing ids are rejected.
    async fn save_pulse(&self, pulse: &Pulse) -> Result<()>;

    /// Add one resonance to the pulse.
    ///
    /// Returns the count written, or `None` if the pulse does not exist.
    /// Atomicity is up to the store: the in-memory store increments under
    /// one lock, the MongoDB store fetches and replaces, so concurrent
    /// calls against it may lose an increment.
    async fn resonate_pulse(&self, pulse_id: &str, acting_user_id: &str) -> Result<Option<u32>>;
}

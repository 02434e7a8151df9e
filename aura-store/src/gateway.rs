//! Fault-tolerant facade over an optional [`PulseStore`].
//!
//! Every call catches its own error, logs it and returns an empty or
//! no-op result. Callers apply their optimistic local update first and
//! never block on these.

use std::sync::Arc;
use tracing::{debug, error, warn};

use aura_core::{Pulse, UserProfile};

use crate::traits::PulseStore;

/// Handle to the document store, shared by the shell.
#[derive(Clone, Default)]
pub struct PersistenceGateway {
    store: Option<Arc<dyn PulseStore>>,
}

impl PersistenceGateway {
    /// Gateway over a configured store.
    pub fn new(store: Arc<dyn PulseStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Gateway with no store: reads are empty, writes are dropped.
    pub fn offline() -> Self {
        Self { store: None }
    }

    /// Whether a store is configured.
    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub async fn get_users(&self) -> Vec<UserProfile> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        match store.get_users().await {
            Ok(users) => {
                debug!(count = users.len(), store = store.name(), "Users loaded");
                users
            }
            Err(e) => {
                error!("Error fetching users: {}", e);
                Vec::new()
            }
        }
    }

    /// Pulses, newest first.
    pub async fn get_pulses(&self) -> Vec<Pulse> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        match store.get_pulses().await {
            Ok(pulses) => {
                debug!(count = pulses.len(), store = store.name(), "Pulses loaded");
                pulses
            }
            Err(e) => {
                error!("Error fetching pulses: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn save_user(&self, user: &UserProfile) {
        let Some(store) = &self.store else {
            warn!(user_id = %user.id, "No store configured, user not saved");
            return;
        };
        if let Err(e) = store.save_user(user).await {
            error!(user_id = %user.id, "Error saving user: {}", e);
        }
    }

    pub async fn save_pulse(&self, pulse: &Pulse) {
        let Some(store) = &self.store else {
            warn!(pulse_id = %pulse.id, "No store configured, pulse not saved");
            return;
        };
        if let Err(e) = store.save_pulse(pulse).await {
            error!(pulse_id = %pulse.id, "Error saving pulse: {}", e);
        }
    }

    pub async fn resonate_pulse(&self, pulse_id: &str, acting_user_id: &str) {
        let Some(store) = &self.store else {
            return;
        };
        match store.resonate_pulse(pulse_id, acting_user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(pulse_id, "Resonated pulse not found in store"),
            Err(e) => error!(pulse_id, "Error resonating pulse: {}", e),
        }
    }
}

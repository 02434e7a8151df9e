//! In-process store, used offline and in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use aura_core::{Pulse, UserProfile};

use crate::error::{Result, StoreError};
use crate::traits::PulseStore;

/// Store holding everything in memory.
///
/// Users keep insertion order; pulses are sorted on read.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<UserProfile>>,
    pulses: RwLock<HashMap<String, Pulse>>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with users and pulses.
    pub fn with_data(users: Vec<UserProfile>, pulses: Vec<Pulse>) -> Self {
        Self {
            users: RwLock::new(users),
            pulses: RwLock::new(pulses.into_iter().map(|p| (p.id.clone(), p)).collect()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate an unreachable database.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PulseStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_users(&self) -> Result<Vec<UserProfile>> {
        self.check_online()?;
        Ok(self.users.read().await.clone())
    }

    async fn get_pulses(&self) -> Result<Vec<Pulse>> {
        self.check_online()?;
        let mut pulses: Vec<Pulse> = self.pulses.read().await.values().cloned().collect();
        pulses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(pulses)
    }

    async fn save_user(&self, user: &UserProfile) -> Result<()> {
        self.check_online()?;
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(())
    }

    async fn save_pulse(&self, pulse: &Pulse) -> Result<()> {
        self.check_online()?;
        let mut pulses = self.pulses.write().await;
        if pulses.contains_key(&pulse.id) {
            return Err(StoreError::Duplicate(pulse.id.clone()));
        }
        pulses.insert(pulse.id.clone(), pulse.clone());
        Ok(())
    }

    async fn resonate_pulse(&self, pulse_id: &str, _acting_user_id: &str) -> Result<Option<u32>> {
        self.check_online()?;

        // Lookup and increment under one guard so concurrent resonances
        // are never lost.
        let mut pulses = self.pulses.write().await;
        let Some(pulse) = pulses.get_mut(pulse_id) else {
            return Ok(None);
        };
        pulse.resonate();
        Ok(Some(pulse.resonance_count))
    }
}

//! End-to-end shell scenarios against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;

use aura::{AppShell, DataSource};
use aura_core::{Pulse, UserProfile, ViewState};
use aura_oracle::Oracle;
use aura_store::error::Result as StoreResult;
use aura_store::{MemoryStore, PersistenceGateway, PulseStore};
use nebula::{DisplayList, Nebula, NebulaConfig, NebulaInput, Viewport};

/// Store that never answers within any reasonable timeout.
struct SlowStore;

#[async_trait]
impl PulseStore for SlowStore {
    fn name(&self) -> &str {
        "slow"
    }

    async fn get_users(&self) -> StoreResult<Vec<UserProfile>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![UserProfile::new("late", "Late", "", "")])
    }

    async fn get_pulses(&self) -> StoreResult<Vec<Pulse>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }

    async fn save_user(&self, _user: &UserProfile) -> StoreResult<()> {
        Ok(())
    }

    async fn save_pulse(&self, _pulse: &Pulse) -> StoreResult<()> {
        Ok(())
    }

    async fn resonate_pulse(&self, _pulse_id: &str, _acting: &str) -> StoreResult<Option<u32>> {
        Ok(None)
    }
}

fn shell_over(store: Arc<dyn PulseStore>) -> AppShell {
    AppShell::new(PersistenceGateway::new(store), Oracle::offline())
}

async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_falls_back_after_timeout() {
    let mut shell = shell_over(Arc::new(SlowStore));
    let source = shell.bootstrap(Duration::from_secs(5)).await;

    assert_eq!(source, DataSource::Fallback);
    // Four demo identities plus twelve bots.
    assert_eq!(shell.users().len(), 16);
    assert!(shell.users().iter().any(|u| u.name == "Zion"));
    assert!(shell.users().iter().all(|u| u.id != "late"));
    assert!(shell.pulses().is_empty());
}

#[tokio::test]
async fn test_store_data_is_used() {
    let zion = UserProfile::new("u1", "Zion", "calm", "");
    let pulse = Pulse::new("p1", &zion, "light", "", 10, 0.5);
    let store = Arc::new(MemoryStore::with_data(vec![zion], vec![pulse]));
    let mut shell = shell_over(store);

    assert_eq!(shell.bootstrap(Duration::from_secs(5)).await, DataSource::Store);
    assert_eq!(shell.users().len(), 1);
    assert_eq!(shell.pulses()[0].id, "p1");
}

#[tokio::test]
async fn test_empty_or_offline_store_falls_back() {
    let mut shell = shell_over(Arc::new(MemoryStore::new())).with_bot_count(3);
    assert_eq!(shell.bootstrap(Duration::from_secs(5)).await, DataSource::Fallback);
    assert_eq!(shell.users().len(), 7);

    let store = Arc::new(MemoryStore::new());
    store.set_offline(true);
    let mut shell = shell_over(store).with_bot_count(0);
    assert_eq!(shell.bootstrap(Duration::from_secs(5)).await, DataSource::Fallback);
    assert_eq!(shell.users().len(), 4);

    let mut shell = AppShell::new(PersistenceGateway::offline(), Oracle::offline());
    assert_eq!(shell.bootstrap(Duration::from_secs(5)).await, DataSource::Fallback);
}

#[tokio::test]
async fn test_post_and_resonate_reach_the_store() {
    let ana = UserProfile::new("a", "Ana", "", "");
    let store = Arc::new(MemoryStore::with_data(vec![ana], vec![]));
    let mut shell = shell_over(store.clone());
    shell.bootstrap(Duration::from_secs(5)).await;
    shell.login("ana");

    let pulse = shell.post_pulse("a quiet morning", None).await.unwrap();
    shell.resonate(&pulse.id).unwrap();
    settle().await;

    let stored = store.get_pulses().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].resonance_count, 1);
    let users = store.get_users().await.unwrap();
    assert_eq!(users[0].pulse_count, 1);
    assert_eq!(users[0].last_pulse_at, Some(pulse.timestamp));
}

#[tokio::test]
async fn test_store_failure_keeps_local_state() {
    let ana = UserProfile::new("a", "Ana", "", "");
    let store = Arc::new(MemoryStore::with_data(vec![ana], vec![]));
    let mut shell = shell_over(store.clone());
    shell.bootstrap(Duration::from_secs(5)).await;
    shell.login("ana");
    store.set_offline(true);

    let pulse = shell.post_pulse("still here", None).await.unwrap();
    assert_eq!(shell.resonate(&pulse.id).unwrap(), 1);
    settle().await;

    assert_eq!(shell.pulses().len(), 1);
    assert_eq!(shell.current_user().unwrap().pulse_count, 1);
    store.set_offline(false);
    assert!(store.get_pulses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_nebula_follows_shell_snapshots() {
    let mut shell = AppShell::new(PersistenceGateway::offline(), Oracle::offline()).with_bot_count(2);
    shell.bootstrap(Duration::from_secs(1)).await;
    shell.login("zion");

    let mut nebula = Nebula::new(NebulaConfig::default(), Viewport::new(800.0, 600.0)).unwrap();
    let now = Local::now();
    let (users, pulses) = shell.snapshot();
    assert!(nebula.set_data(users, pulses, &now));
    assert_eq!(nebula.node_count(), 6);

    // No mutation, same snapshot: nothing to rebuild.
    let (users, pulses) = shell.snapshot();
    assert!(!nebula.set_data(users, pulses, &now));

    shell.create_identity("Nova", "new light").unwrap();
    let (users, pulses) = shell.snapshot();
    assert!(nebula.set_data(users, pulses, &now));
    assert_eq!(nebula.generation(), 2);
    assert_eq!(nebula.node_count(), 7);

    // Selecting a node routes back into the shell.
    let mut canvas = DisplayList::new();
    nebula.frame(&mut canvas);
    let at = nebula.node(&shell.current_user().unwrap().id).unwrap().position();
    let event = nebula.handle_input(NebulaInput::Click(at)).unwrap();
    shell.handle_event(event);
    assert_eq!(shell.view(), ViewState::Profile);
    assert!(shell.selected_user().is_some());
}

//! Application state and the operations the surfaces call.
//!
//! Member and pulse collections are immutable `Arc` snapshots; every
//! mutation builds a new slice so the Nebula sees a new identity and
//! rebuilds. Writes apply locally first, then a best-effort remote write
//! is spawned that only logs on failure. Concurrent writes from other
//! clients are not reconciled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aura_core::{
    collective_resonance_hz, generate_bots, generate_id, has_posted_today, now_millis,
    resonance_by_user, seed_users, total_resonance, Pulse, UserProfile, ViewState,
    SEED_RESONANCE_COST,
};
use aura_oracle::{Echo, Oracle};
use aura_store::PersistenceGateway;
use chrono::Local;
use nebula::NebulaEvent;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::error::{Result, ShellError};

/// Placeholder identities generated when the store has none.
pub const DEFAULT_BOT_COUNT: usize = 12;

/// Where the bootstrap data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Store,
    /// Store was empty, unreachable or too slow
    Fallback,
}

/// Shell state plus its collaborators.
pub struct AppShell {
    users: Arc<[UserProfile]>,
    pulses: Arc<[Pulse]>,
    current_user: Option<UserProfile>,
    view: ViewState,
    selected_pulse: Option<Pulse>,
    selected_user: Option<UserProfile>,
    gateway: PersistenceGateway,
    oracle: Oracle,
    bot_count: usize,
}

impl AppShell {
    pub fn new(gateway: PersistenceGateway, oracle: Oracle) -> Self {
        Self {
            users: Arc::from(Vec::new()),
            pulses: Arc::from(Vec::new()),
            current_user: None,
            view: ViewState::default(),
            selected_pulse: None,
            selected_user: None,
            gateway,
            oracle,
            bot_count: DEFAULT_BOT_COUNT,
        }
    }

    pub fn with_bot_count(mut self, count: usize) -> Self {
        self.bot_count = count;
        self
    }

    /// Load members and pulses concurrently.
    ///
    /// Falls back to the demo identities plus generated bots when the
    /// load does not finish within `timeout` (pulses then start empty)
    /// or when the store has no members.
    pub async fn bootstrap(&mut self, timeout: Duration) -> DataSource {
        let gateway = self.gateway.clone();
        let load = async move { tokio::join!(gateway.get_users(), gateway.get_pulses()) };

        let (users, pulses, source) = match tokio::time::timeout(timeout, load).await {
            Ok((users, pulses)) if !users.is_empty() => (users, pulses, DataSource::Store),
            Ok((_, pulses)) => {
                info!("Store has no members, using demo identities");
                (self.fallback_users(), pulses, DataSource::Fallback)
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Startup load timed out, using demo identities"
                );
                (self.fallback_users(), Vec::new(), DataSource::Fallback)
            }
        };

        info!(
            users = users.len(),
            pulses = pulses.len(),
            source = ?source,
            "Bootstrap complete"
        );
        self.users = Arc::from(users);
        self.pulses = Arc::from(pulses);
        source
    }

    fn fallback_users(&self) -> Vec<UserProfile> {
        let now = now_millis();
        let mut users = seed_users(now);
        users.extend(generate_bots(self.bot_count, now, &mut rand::thread_rng()));
        users
    }

    /// Current member and pulse snapshots.
    pub fn snapshot(&self) -> (Arc<[UserProfile]>, Arc<[Pulse]>) {
        (self.users.clone(), self.pulses.clone())
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }

    /// Pulses, newest first.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }

    pub fn selected_user(&self) -> Option<&UserProfile> {
        self.selected_user.as_ref()
    }

    pub fn selected_pulse(&self) -> Option<&Pulse> {
        self.selected_pulse.as_ref()
    }

    pub fn select_pulse(&mut self, pulse_id: &str) -> Result<&Pulse> {
        let pulse = self
            .pulses
            .iter()
            .find(|p| p.id == pulse_id)
            .cloned()
            .ok_or_else(|| ShellError::PulseNotFound(pulse_id.to_string()))?;
        Ok(&*self.selected_pulse.insert(pulse))
    }

    /// Enter as the member named `name` (case-insensitive), or the first
    /// member when nobody matches. `None` only when there are no members.
    pub fn login(&mut self, name: &str) -> Option<&UserProfile> {
        let wanted = name.trim().to_lowercase();
        let user = self
            .users
            .iter()
            .find(|u| u.name.to_lowercase() == wanted)
            .or_else(|| self.users.first())?
            .clone();
        info!(user = %user.name, "Logged in");
        self.view = ViewState::Nebula;
        Some(&*self.current_user.insert(user))
    }

    /// Create a new member and make it current.
    pub fn create_identity(&mut self, name: &str, vibe: &str) -> Result<UserProfile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShellError::EmptyName);
        }
        let vibe = vibe.trim();
        let portrait = self
            .oracle
            .generate_symbolic_portrait(&format!("{name}, {vibe}"));
        let user = UserProfile::new(generate_id(&mut rand::thread_rng()), name, vibe, portrait);

        let mut users = self.users.to_vec();
        users.push(user.clone());
        self.users = Arc::from(users);
        self.current_user = Some(user.clone());
        self.view = ViewState::Nebula;
        info!(user_id = %user.id, name = %user.name, "Identity created");

        let gateway = self.gateway.clone();
        let saved = user.clone();
        self.persist(async move { gateway.save_user(&saved).await });
        Ok(user)
    }

    /// Publish today's pulse for the current member.
    ///
    /// The text is rewritten and analyzed by the oracle before anything
    /// changes locally; those calls always produce a value.
    pub async fn post_pulse(&mut self, text: &str, heart_rate: Option<u32>) -> Result<Pulse> {
        let author = self.current_user.clone().ok_or(ShellError::NoCurrentUser)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ShellError::EmptyContent);
        }
        if has_posted_today(author.last_pulse_at, &Local::now()) {
            return Err(ShellError::AlreadyPostedToday(author.name));
        }

        let content = self.oracle.poetize_content(text).await;
        let intention = self.oracle.analyze_intention(&content).await;
        let image_url = self.oracle.generate_pulse_visual(&content, &intention.mood);

        let now = now_millis();
        let pulse = Pulse::new(
            generate_id(&mut rand::thread_rng()),
            &author,
            content,
            image_url,
            now,
            intention.energy,
        )
        .with_intention(&intention)
        .with_heart_rate(heart_rate);

        let mut pulses = Vec::with_capacity(self.pulses.len() + 1);
        pulses.push(pulse.clone());
        pulses.extend(self.pulses.iter().cloned());
        self.pulses = Arc::from(pulses);
        let updated = self.update_user(&author.id, |u| u.record_pulse(now));
        info!(pulse_id = %pulse.id, user_id = %author.id, mood = %intention.mood, "Pulse posted");

        let gateway = self.gateway.clone();
        let saved = pulse.clone();
        self.persist(async move {
            gateway.save_pulse(&saved).await;
            if let Some(user) = updated {
                gateway.save_user(&user).await;
            }
        });
        Ok(pulse)
    }

    /// Add one resonance to a pulse. Returns its new count.
    pub fn resonate(&mut self, pulse_id: &str) -> Result<u32> {
        let mut pulses = self.pulses.to_vec();
        let pulse = pulses
            .iter_mut()
            .find(|p| p.id == pulse_id)
            .ok_or_else(|| ShellError::PulseNotFound(pulse_id.to_string()))?;
        pulse.resonate();
        let count = pulse.resonance_count;
        self.pulses = Arc::from(pulses);

        if let Some(selected) = self.selected_pulse.as_mut().filter(|p| p.id == pulse_id) {
            selected.resonate();
        }
        debug!(pulse_id, count, "Resonated");

        let gateway = self.gateway.clone();
        let pulse_id = pulse_id.to_string();
        let acting = self
            .current_user
            .as_ref()
            .map(|u| u.id.clone())
            .unwrap_or_default();
        self.persist(async move { gateway.resonate_pulse(&pulse_id, &acting).await });
        Ok(count)
    }

    /// Grant the current member one more seed. Returns the new count.
    pub fn generate_seed(&mut self) -> Result<u32> {
        let user = self.current_user.as_ref().ok_or(ShellError::NoCurrentUser)?;
        let have = total_resonance(&user.id, &self.pulses);
        if have < SEED_RESONANCE_COST {
            return Err(ShellError::InsufficientResonance {
                have,
                need: SEED_RESONANCE_COST,
            });
        }
        let id = user.id.clone();
        let updated = self
            .update_user(&id, |u| u.seed_count += 1)
            .ok_or(ShellError::NoCurrentUser)?;
        let seeds = updated.seed_count;
        info!(user_id = %id, seeds, "Seed generated");

        let gateway = self.gateway.clone();
        self.persist(async move { gateway.save_user(&updated).await });
        Ok(seeds)
    }

    /// A short oracle reply to a pulse.
    pub async fn echo(&self, pulse_id: &str) -> Result<Echo> {
        let pulse = self
            .pulses
            .iter()
            .find(|p| p.id == pulse_id)
            .ok_or_else(|| ShellError::PulseNotFound(pulse_id.to_string()))?;
        Ok(self.oracle.echo(&pulse.content).await)
    }

    pub fn handle_event(&mut self, event: NebulaEvent) {
        match event {
            NebulaEvent::UserSelected(user) => {
                debug!(user_id = %user.id, "Member selected");
                self.selected_user = Some(user);
                self.view = ViewState::Profile;
            }
        }
    }

    /// Members paired with their total resonance, in member order.
    pub fn users_with_resonance(&self) -> Vec<(UserProfile, u32)> {
        let totals = resonance_by_user(&self.pulses);
        self.users
            .iter()
            .map(|u| (u.clone(), totals.get(&u.id).copied().unwrap_or(0)))
            .collect()
    }

    pub fn collective_resonance_hz(&self) -> f64 {
        collective_resonance_hz(&self.pulses)
    }

    /// Apply `apply` to member `id` in the snapshot and to the current
    /// member if it is the same one. Returns the updated record.
    fn update_user(&mut self, id: &str, apply: impl Fn(&mut UserProfile)) -> Option<UserProfile> {
        let mut users = self.users.to_vec();
        let updated = users.iter_mut().find(|u| u.id == id).map(|u| {
            apply(u);
            u.clone()
        });
        if updated.is_some() {
            self.users = Arc::from(users);
        }

        match self.current_user.as_mut() {
            Some(current) if current.id == id => {
                match &updated {
                    Some(user) => *current = user.clone(),
                    None => apply(current),
                }
                Some(current.clone())
            }
            _ => updated,
        }
    }

    /// Spawn a remote write. Failures are logged by the gateway.
    fn persist<F>(&self, write: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(write);
            }
            Err(_) => warn!("No async runtime, remote write skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_oracle::MockBackend;
    use aura_store::{MemoryStore, PulseStore};

    fn shell_with(users: Vec<UserProfile>, pulses: Vec<Pulse>) -> (AppShell, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_data(users.clone(), pulses.clone()));
        let mut shell = AppShell::new(PersistenceGateway::new(store.clone()), Oracle::offline());
        shell.users = Arc::from(users);
        shell.pulses = Arc::from(pulses);
        (shell, store)
    }

    fn pulse(id: &str, author: &UserProfile, resonance: u32) -> Pulse {
        let mut p = Pulse::new(id, author, "light", "", 1, 0.5);
        p.resonance_count = resonance;
        p
    }

    #[test]
    fn test_login_case_insensitive_or_first() {
        let (mut shell, _) = shell_with(
            vec![UserProfile::new("1", "Zion", "", ""), UserProfile::new("2", "Gaia", "", "")],
            vec![],
        );
        assert_eq!(shell.login("gAIA").unwrap().id, "2");
        assert_eq!(shell.view(), ViewState::Nebula);
        assert_eq!(shell.login("nobody").unwrap().id, "1");

        let (mut empty, _) = shell_with(vec![], vec![]);
        assert!(empty.login("zion").is_none());
        assert_eq!(empty.view(), ViewState::Intro);
    }

    #[tokio::test]
    async fn test_resonate_touches_exactly_one_pulse() {
        let a = UserProfile::new("a", "A", "", "");
        let (mut shell, _) = shell_with(vec![a.clone()], vec![pulse("p1", &a, 0), pulse("p2", &a, 3)]);
        shell.select_pulse("p2").unwrap();
        let (_, before) = shell.snapshot();

        assert_eq!(shell.resonate("p2").unwrap(), 4);
        assert_eq!(shell.pulses()[0].resonance_count, 0);
        assert_eq!(shell.pulses()[1].resonance_count, 4);
        assert_eq!(shell.selected_pulse().unwrap().resonance_count, 4);
        assert!(!Arc::ptr_eq(&before, &shell.snapshot().1));

        assert_eq!(
            shell.resonate("missing"),
            Err(ShellError::PulseNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_post_pulse_rules() {
        let (mut shell, _) = shell_with(vec![UserProfile::new("a", "Ana", "", "")], vec![]);
        assert_eq!(
            shell.post_pulse("hello", None).await,
            Err(ShellError::NoCurrentUser)
        );

        shell.login("ana");
        assert_eq!(shell.post_pulse("   ", None).await, Err(ShellError::EmptyContent));

        let pulse = shell.post_pulse("hello", Some(72)).await.unwrap();
        assert_eq!(pulse.resonance_count, 0);
        assert_eq!(pulse.content, "hello");
        assert_eq!(pulse.heart_rate, Some(72));
        assert_eq!(shell.pulses()[0].id, pulse.id);
        assert_eq!(shell.current_user().unwrap().pulse_count, 1);
        assert_eq!(shell.users()[0].last_pulse_at, Some(pulse.timestamp));

        assert_eq!(
            shell.post_pulse("again", None).await,
            Err(ShellError::AlreadyPostedToday("Ana".to_string()))
        );
        assert_eq!(shell.pulses().len(), 1);
    }

    #[tokio::test]
    async fn test_post_pulse_uses_oracle() {
        let backend = MockBackend::new("mock")
            .then_respond("Light gathers at dawn")
            .then_respond(r##"{"mood":"Aurora","energy":0.4,"frequency":480,"color":"#ff00ff"}"##);
        let mut shell = AppShell::new(PersistenceGateway::offline(), Oracle::new(Arc::new(backend)));
        shell.users = Arc::from(vec![UserProfile::new("a", "Ana", "", "")]);
        shell.login("ana");

        let pulse = shell.post_pulse("i feel the morning", None).await.unwrap();
        assert_eq!(pulse.content, "Light gathers at dawn");
        assert_eq!(pulse.color.as_deref(), Some("#ff00ff"));
        assert_eq!(pulse.frequency, Some(480.0));
        assert!((pulse.energy - 0.4).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_generate_seed_threshold() {
        let a = UserProfile::new("a", "Ana", "", "");
        let (mut shell, _) = shell_with(vec![a.clone()], vec![pulse("p1", &a, 4)]);
        shell.login("ana");
        assert_eq!(
            shell.generate_seed(),
            Err(ShellError::InsufficientResonance { have: 4, need: 5 })
        );

        shell.resonate("p1").unwrap();
        assert_eq!(shell.generate_seed().unwrap(), 2);
        assert_eq!(shell.users()[0].seed_count, 2);
    }

    #[tokio::test]
    async fn test_create_identity_appends_and_logs_in() {
        let (mut shell, store) = shell_with(vec![UserProfile::new("a", "Ana", "", "")], vec![]);
        let (before, _) = shell.snapshot();
        let user = shell.create_identity(" Nova ", "curious").unwrap();

        assert_eq!(user.name, "Nova");
        assert_eq!(user.seed_count, 1);
        assert_eq!(user.id.len(), 9);
        assert!(user.portrait_url.starts_with("http"));
        assert_eq!(shell.users().len(), 2);
        assert_eq!(shell.current_user().unwrap().id, user.id);
        assert!(!Arc::ptr_eq(&before, &shell.snapshot().0));
        assert_eq!(shell.create_identity("  ", "x"), Err(ShellError::EmptyName));

        // Let the spawned write land.
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.get_users().await.unwrap().iter().any(|u| u.id == user.id));
    }

    #[test]
    fn test_handle_event_selects_profile() {
        let (mut shell, _) = shell_with(vec![], vec![]);
        let user = UserProfile::new("b", "Bo", "", "");
        shell.handle_event(NebulaEvent::UserSelected(user.clone()));
        assert_eq!(shell.selected_user(), Some(&user));
        assert_eq!(shell.view(), ViewState::Profile);
    }

    #[test]
    fn test_resonance_views() {
        let (a, b) = (UserProfile::new("a", "A", "", ""), UserProfile::new("b", "B", "", ""));
        let (shell, _) = shell_with(
            vec![a.clone(), b.clone()],
            vec![pulse("1", &b, 2), pulse("2", &b, 4)],
        );
        let totals = shell.users_with_resonance();
        assert_eq!(totals[0].1, 0);
        assert_eq!(totals[1].1, 6);
        assert!((shell.collective_resonance_hz() - 0.24).abs() < 1e-9);
    }

    #[test]
    fn test_persist_without_runtime_is_skipped() {
        let (mut shell, _) = shell_with(vec![UserProfile::new("a", "Ana", "", "")], vec![]);
        assert!(shell.create_identity("Nova", "").is_ok());
    }
}

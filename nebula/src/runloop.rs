//! Frame-paced render loop.
//!
//! [`NebulaLoop`] moves a [`Nebula`] and a canvas onto a tokio task that
//! draws one frame per interval tick. The host talks to it through
//! commands and receives [`NebulaEvent`]s back. Exactly one loop owns an
//! engine at a time; shutting down hands both back.

use std::sync::Arc;
use std::time::Duration;

use aura_core::{Pulse, UserProfile};
use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::canvas::Canvas;
use crate::engine::Nebula;
use crate::error::{NebulaError, Result};
use crate::input::{NebulaEvent, NebulaInput};

/// Commands accepted by a running loop.
#[derive(Debug)]
pub enum LoopCommand {
    Input(NebulaInput),
    SetData {
        users: Arc<[UserProfile]>,
        pulses: Arc<[Pulse]>,
    },
    /// Host finished loading an image
    ImageLoaded { url: String, ok: bool },
    Shutdown,
}

/// Pacing of a loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub fps: u32,
    /// Stop on its own after this many frames
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            max_frames: None,
        }
    }
}

impl LoopConfig {
    fn period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}

/// Handle to a running render loop drawing onto a `C`.
pub struct NebulaLoop<C> {
    commands: mpsc::UnboundedSender<LoopCommand>,
    handle: JoinHandle<(Nebula, C)>,
}

impl<C: Canvas + 'static> NebulaLoop<C> {
    /// Start drawing `nebula` onto `canvas`. Must be called inside a
    /// tokio runtime.
    pub fn spawn(
        nebula: Nebula,
        canvas: C,
        config: LoopConfig,
        events: mpsc::UnboundedSender<NebulaEvent>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(nebula, canvas, config, rx, events));
        Self {
            commands: tx,
            handle,
        }
    }

    pub fn send(&self, command: LoopCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| NebulaError::LoopStopped)
    }

    /// A sender for tasks that report back to the loop, such as image
    /// loads. Sends fail once the loop has stopped.
    pub fn commands(&self) -> mpsc::UnboundedSender<LoopCommand> {
        self.commands.clone()
    }

    pub fn input(&self, input: NebulaInput) -> Result<()> {
        self.send(LoopCommand::Input(input))
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the loop and take back the engine and canvas.
    pub async fn shutdown(self) -> Result<(Nebula, C)> {
        // Already finished loops have dropped their receiver.
        let _ = self.commands.send(LoopCommand::Shutdown);
        self.join().await
    }

    /// Wait for the loop to end on its own (frame limit or shutdown).
    pub async fn join(self) -> Result<(Nebula, C)> {
        self.handle
            .await
            .map_err(|e| NebulaError::LoopFailed(e.to_string()))
    }
}

async fn run<C: Canvas>(
    mut nebula: Nebula,
    mut canvas: C,
    config: LoopConfig,
    mut commands: mpsc::UnboundedReceiver<LoopCommand>,
    events: mpsc::UnboundedSender<NebulaEvent>,
) -> (Nebula, C) {
    let mut tick = interval(config.period());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut drawn: u64 = 0;

    info!(fps = config.fps, max_frames = ?config.max_frames, "Render loop started");

    loop {
        tokio::select! {
            _ = tick.tick() => {
                nebula.frame(&mut canvas);
                drawn += 1;
                if config.max_frames.is_some_and(|max| drawn >= max) {
                    break;
                }
            }
            command = commands.recv() => {
                match command {
                    Some(LoopCommand::Input(input)) => {
                        if let Some(event) = nebula.handle_input(input) {
                            if events.send(event).is_err() {
                                debug!("Event receiver dropped");
                            }
                        }
                    }
                    Some(LoopCommand::SetData { users, pulses }) => {
                        nebula.set_data(users, pulses, &Local::now());
                    }
                    Some(LoopCommand::ImageLoaded { url, ok }) => {
                        let known = if ok {
                            nebula.images_mut().mark_ready(&url)
                        } else {
                            warn!(url = %url, "Portrait failed to load");
                            nebula.images_mut().mark_failed(&url)
                        };
                        if !known {
                            debug!(url = %url, "Dropping result for an evicted portrait");
                        }
                    }
                    Some(LoopCommand::Shutdown) | None => break,
                }
            }
        }
    }

    info!(frames = drawn, "Render loop stopped");
    (nebula, canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DisplayList;
    use crate::config::NebulaConfig;
    use crate::math::Viewport;
    use glam::Vec2;

    fn engine() -> Nebula {
        let mut config = NebulaConfig::default();
        config.scene.star_count = 5;
        Nebula::new(config, Viewport::new(640.0, 480.0)).unwrap()
    }

    fn snapshot() -> (Arc<[UserProfile]>, Arc<[Pulse]>) {
        let users = vec![
            UserProfile::new("a", "Ana", "calm", "https://img/a"),
            UserProfile::new("b", "Bo", "bright", "https://img/b"),
        ];
        (Arc::from(users), Arc::from(Vec::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_limit_ends_loop() {
        let (events, _rx) = mpsc::unbounded_channel();
        let config = LoopConfig {
            fps: 60,
            max_frames: Some(10),
        };
        let running = NebulaLoop::spawn(engine(), DisplayList::new(), config, events);
        let (nebula, _canvas) = running.join().await.unwrap();
        assert_eq!(nebula.frame_count(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_emits_selection() {
        let (events, mut selected) = mpsc::unbounded_channel();
        let mut nebula = engine();
        let only: Arc<[UserProfile]> = Arc::from(vec![UserProfile::new("b", "Bo", "bright", "")]);
        nebula.set_data(only, Arc::from(Vec::new()), &Local::now());

        let running = NebulaLoop::spawn(nebula, DisplayList::new(), LoopConfig::default(), events);
        // A lone node is pulled onto the viewport center by the first frame.
        tokio::time::sleep(Duration::from_millis(50)).await;
        running.input(NebulaInput::Click(Vec2::new(320.0, 240.0))).unwrap();

        let NebulaEvent::UserSelected(user) = selected.recv().await.unwrap();
        assert_eq!(user.id, "b");

        let (nebula, _) = running.shutdown().await.unwrap();
        assert_eq!(nebula.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_data_and_image_commands() {
        let (events, _rx) = mpsc::unbounded_channel();
        let running = NebulaLoop::spawn(engine(), DisplayList::new(), LoopConfig::default(), events);
        let (users, pulses) = snapshot();
        running.send(LoopCommand::SetData { users, pulses }).unwrap();
        running
            .send(LoopCommand::ImageLoaded {
                url: "https://img/a".to_string(),
                ok: true,
            })
            .unwrap();
        let loader = running.commands();
        loader
            .send(LoopCommand::ImageLoaded {
                url: "https://img/b".to_string(),
                ok: false,
            })
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(running.is_running());

        let (nebula, _) = running.shutdown().await.unwrap();
        assert_eq!(nebula.node_count(), 2);
        assert!(nebula.context().images.is_ready("https://img/a"));
        assert_eq!(
            nebula.context().images.state("https://img/b"),
            Some(crate::images::ImageState::Failed)
        );
        assert!(nebula.frame_count() > 0);
    }

    #[tokio::test]
    async fn test_send_after_stop_fails() {
        let (events, _rx) = mpsc::unbounded_channel();
        let config = LoopConfig {
            fps: 1_000,
            max_frames: Some(1),
        };
        let running = NebulaLoop::spawn(engine(), DisplayList::new(), config, events);
        while running.is_running() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            running.input(NebulaInput::PointerMove(Default::default())),
            Err(NebulaError::LoopStopped)
        ));
    }
}

//! Aura - headless nebula runner
//!
//! Loads members and pulses (or demo identities), lets the nebula settle
//! for a number of frames and writes the final frame as SVG.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use aura::{collaborators, logging, AppShell, Args, PortraitLoader};
use nebula::{LoopConfig, Nebula, NebulaInput, NebulaLoop, SvgCanvas};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init(&args.log_level, args.log_format);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }
    let nebula_config = match args.nebula_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("======================================");
    info!("  Aura - the nebula of daily pulses");
    info!("======================================");
    info!("Viewport: {}x{}", args.width, args.height);
    info!("Frames: {} at {} fps", args.frames, args.fps);

    // Collaborators
    let gateway = collaborators::build_gateway(&args).await;
    let oracle = collaborators::build_oracle(&args.oracle).await;

    // Shell state
    let mut shell = AppShell::new(gateway, oracle).with_bot_count(args.bot_count);
    let source = shell.bootstrap(args.load_timeout()).await;
    if let Some(user) = shell.login(args.login.as_deref().unwrap_or_default()) {
        info!(user = %user.name, vibe = %user.vibe, "Current identity");
    }
    info!(
        source = ?source,
        members = shell.users().len(),
        pulses = shell.pulses().len(),
        collective_hz = shell.collective_resonance_hz(),
        "Shell ready"
    );

    // Nebula
    let mut nebula = Nebula::new(nebula_config, args.viewport())?;
    let (users, pulses) = shell.snapshot();
    nebula.set_data(users, pulses, &Local::now());
    let portraits = nebula.context().images.pending();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let running = NebulaLoop::spawn(
        nebula,
        SvgCanvas::new(args.viewport()),
        LoopConfig {
            fps: args.fps,
            max_frames: Some(args.frames.max(1)),
        },
        events_tx,
    );
    match PortraitLoader::new(args.portrait_timeout()) {
        Ok(loader) => {
            let commands = running.commands();
            tokio::spawn(async move { loader.load_all(portraits, &commands).await });
        }
        Err(e) => warn!("Portrait loader unavailable, keeping gradient cores: {}", e),
    }
    let (mut nebula, mut canvas) = running.join().await?;

    if let Some(name) = &args.select {
        let target = nebula
            .nodes()
            .find(|n| n.identity.name.eq_ignore_ascii_case(name))
            .map(|n| n.position());
        match target.and_then(|at| nebula.handle_input(NebulaInput::Click(at))) {
            Some(event) => {
                shell.handle_event(event);
                // One more frame so the whisper shows up in the snapshot.
                nebula.frame(&mut canvas);
            }
            None => warn!(member = %name, "No node to select"),
        }
    }
    while let Ok(event) = events_rx.try_recv() {
        shell.handle_event(event);
    }
    if let Some(user) = shell.selected_user() {
        info!(user = %user.name, view = ?shell.view(), "Member selected");
    }

    for (user, resonance) in shell.users_with_resonance().iter().filter(|(_, r)| *r > 0) {
        info!(user = %user.name, resonance, "Resonance");
    }

    if let Some(path) = &args.snapshot {
        std::fs::write(path, canvas.to_svg())
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        info!(path = %path.display(), frames = nebula.frame_count(), "Snapshot written");
    }

    Ok(())
}

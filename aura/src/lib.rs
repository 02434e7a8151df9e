//! Aura application shell
//!
//! Wires the store, the oracle and the Nebula engine together:
//!
//! ```text
//!   Args ──► collaborators ──► PersistenceGateway ─┐
//!                         └──► Oracle ─────────────┤
//!                                                  ▼
//!                     NebulaEvent ──────────────► AppShell ──► (users, pulses) snapshots
//!                                                                       │
//!                                                                       ▼
//!                                                               nebula::Nebula
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod logging;
pub mod portraits;
pub mod shell;

pub use config::{Args, ConfigError, LogFormat};
pub use error::ShellError;
pub use portraits::PortraitLoader;
pub use shell::{AppShell, DataSource};

//! Rejections of shell operations.
//!
//! These are user-facing refusals, not failures: the shell state is left
//! unchanged whenever one is returned.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("No identity is active")]
    NoCurrentUser,

    #[error("Identity name is empty")]
    EmptyName,

    #[error("Pulse content is empty")]
    EmptyContent,

    #[error("{0} has already pulsed today")]
    AlreadyPostedToday(String),

    #[error("Pulse not found: {0}")]
    PulseNotFound(String),

    #[error("Not enough resonance for a seed: have {have}, need {need}")]
    InsufficientResonance { have: u32, need: u32 },
}

pub type Result<T> = std::result::Result<T, ShellError>;

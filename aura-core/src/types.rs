//! Entity records.
//!
//! Field names serialize in camelCase so documents written by earlier
//! clients stay readable.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowest frequency an intention may carry (Hz).
pub const FREQUENCY_MIN: f32 = 432.0;
/// Highest frequency an intention may carry (Hz).
pub const FREQUENCY_MAX: f32 = 528.0;

/// A member of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Generated symbolic portrait
    pub portrait_url: String,
    /// Short self-description
    pub vibe: String,
    /// Number of pulses authored
    #[serde(default)]
    pub pulse_count: u32,
    /// Unix millis of the last pulse, if any
    #[serde(default)]
    pub last_pulse_at: Option<i64>,
    /// Invitations available
    #[serde(default)]
    pub seed_count: u32,
    /// Communities joined (not used downstream yet)
    #[serde(default)]
    pub community_count: u32,
    /// Dominant display color (hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl UserProfile {
    /// Create a fresh identity with no pulses and one seed.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        vibe: impl Into<String>,
        portrait_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            portrait_url: portrait_url.into(),
            vibe: vibe.into(),
            pulse_count: 0,
            last_pulse_at: None,
            seed_count: 1,
            community_count: 0,
            color: None,
        }
    }

    /// Record a new pulse at `at` (Unix millis).
    ///
    /// This is the only place `pulse_count` and `last_pulse_at` change.
    pub fn record_pulse(&mut self, at: i64) {
        self.pulse_count += 1;
        self.last_pulse_at = Some(at);
    }
}

/// One user's daily post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pulse {
    /// Client-generated identifier
    pub id: String,
    /// Author id
    pub user_id: String,
    /// Author name at time of posting
    pub user_name: String,
    /// Text, possibly rewritten by the oracle
    pub content: String,
    /// Generated visual
    pub image_url: String,
    /// Unix millis of creation
    pub timestamp: i64,
    /// Energy in [0, 1]
    pub energy: f32,
    /// Endorsements received
    #[serde(default)]
    pub resonance_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f32>,
    /// Heart rate captured while posting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
}

impl Pulse {
    /// Create a pulse with zero resonance. Energy is clamped into [0, 1].
    pub fn new(
        id: impl Into<String>,
        author: &UserProfile,
        content: impl Into<String>,
        image_url: impl Into<String>,
        timestamp: i64,
        energy: f32,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            content: content.into(),
            image_url: image_url.into(),
            timestamp,
            energy: clamp_unit(energy),
            resonance_count: 0,
            color: None,
            frequency: None,
            heart_rate: None,
        }
    }

    /// Attach the analysis captured at creation.
    pub fn with_intention(mut self, intention: &Intention) -> Self {
        self.color = Some(intention.color.clone());
        self.frequency = Some(intention.frequency);
        self
    }

    /// Attach a heart rate reading.
    pub fn with_heart_rate(mut self, bpm: Option<u32>) -> Self {
        self.heart_rate = bpm;
        self
    }

    /// Register one resonance.
    pub fn resonate(&mut self) {
        self.resonance_count += 1;
    }
}

/// Analysis of a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intention {
    /// One-word atmospheric mood
    pub mood: String,
    /// Energy in [0, 1]
    pub energy: f32,
    /// Fundamental frequency in [432, 528] Hz
    pub frequency: f32,
    /// Dominant color (hex)
    pub color: String,
}

impl Intention {
    /// Clamp numeric fields into their documented ranges.
    pub fn normalized(mut self) -> Self {
        self.energy = clamp_unit(self.energy);
        self.frequency = if self.frequency.is_finite() {
            self.frequency.clamp(FREQUENCY_MIN, FREQUENCY_MAX)
        } else {
            FREQUENCY_MIN
        };
        self
    }
}

impl Default for Intention {
    fn default() -> Self {
        Self {
            mood: "Harmonia".to_string(),
            energy: 0.85,
            frequency: FREQUENCY_MIN,
            color: "#00ffff".to_string(),
        }
    }
}

/// Which top-level surface the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    #[default]
    Intro,
    Identity,
    Nebula,
    Ritual,
    Profile,
    Seed,
    Communities,
}

/// Generate a short client-side identifier (9 base-36 characters).
///
/// Uniqueness is probabilistic only.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

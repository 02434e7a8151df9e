//! Aggregates derived from the full pulse list.
//!
//! Recomputed on demand; nothing here is stored.

use std::collections::HashMap;

use crate::types::{Pulse, UserProfile};

/// Resonance a user must hold before generating a seed.
pub const SEED_RESONANCE_COST: u32 = 5;

/// Hz contributed by each pulse to the collective figure.
const HZ_PER_PULSE: f64 = 0.12;

/// Sum of `resonance_count` per author id.
pub fn resonance_by_user(pulses: &[Pulse]) -> HashMap<String, u32> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for pulse in pulses {
        *totals.entry(pulse.user_id.clone()).or_default() += pulse.resonance_count;
    }
    totals
}

/// Total resonance received by one user.
pub fn total_resonance(user_id: &str, pulses: &[Pulse]) -> u32 {
    pulses
        .iter()
        .filter(|p| p.user_id == user_id)
        .map(|p| p.resonance_count)
        .sum()
}

/// Whether `user` has enough resonance to generate a seed.
pub fn can_generate_seed(user: &UserProfile, pulses: &[Pulse]) -> bool {
    total_resonance(&user.id, pulses) >= SEED_RESONANCE_COST
}

/// Collective resonance shown in the header.
pub fn collective_resonance_hz(pulses: &[Pulse]) -> f64 {
    pulses.len() as f64 * HZ_PER_PULSE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(id: &str, user: &str, resonance: u32) -> Pulse {
        let author = UserProfile::new(user, user, "", "");
        let mut p = Pulse::new(id, &author, "", "", 0, 0.5);
        p.resonance_count = resonance;
        p
    }

    #[test]
    fn test_empty_list() {
        assert!(resonance_by_user(&[]).is_empty());
        assert_eq!(total_resonance("a", &[]), 0);
        assert_eq!(collective_resonance_hz(&[]), 0.0);
    }

    #[test]
    fn test_sums_only_matching_author() {
        let pulses = vec![pulse("1", "b", 1), pulse("2", "b", 2), pulse("3", "b", 3), pulse("4", "c", 9)];
        let map = resonance_by_user(&pulses);

        assert_eq!(map["b"], 6);
        assert_eq!(map["c"], 9);
        assert!(!map.contains_key("a"));
        assert_eq!(total_resonance("b", &pulses), 6);
        assert_eq!(total_resonance("a", &pulses), 0);
    }

    #[test]
    fn test_seed_threshold() {
        let user = UserProfile::new("b", "B", "", "");
        assert!(!can_generate_seed(&user, &[pulse("1", "b", 4)]));
        assert!(can_generate_seed(&user, &[pulse("1", "b", 4), pulse("2", "b", 1)]));
    }

    #[test]
    fn test_collective_resonance() {
        let pulses = vec![pulse("1", "a", 0), pulse("2", "a", 0)];
        assert!((collective_resonance_hz(&pulses) - 0.24).abs() < 1e-9);
    }
}

//! Portrait load tracking.
//!
//! The engine never fetches images itself. It registers every portrait
//! URL it wants; the host loads them and reports back. Until a URL is
//! [`ImageState::Ready`] the node core is drawn as a gradient.

use std::collections::{HashMap, HashSet};

/// Load state of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Ready,
    Failed,
}

/// URL to load state.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageState>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url`. Returns true when it was not known yet.
    pub fn request(&mut self, url: &str) -> bool {
        if url.is_empty() || self.entries.contains_key(url) {
            return false;
        }
        self.entries.insert(url.to_string(), ImageState::Pending);
        true
    }

    /// Record a finished load. Results for URLs that were never
    /// requested, or were evicted since, are dropped.
    pub fn mark_ready(&mut self, url: &str) -> bool {
        self.set(url, ImageState::Ready)
    }

    pub fn mark_failed(&mut self, url: &str) -> bool {
        self.set(url, ImageState::Failed)
    }

    fn set(&mut self, url: &str, state: ImageState) -> bool {
        match self.entries.get_mut(url) {
            Some(entry) => {
                *entry = state;
                true
            }
            None => false,
        }
    }

    /// Forget every URL not in `keep`. Returns how many were evicted.
    pub fn retain_only<'a>(&mut self, keep: impl IntoIterator<Item = &'a str>) -> usize {
        let keep: HashSet<&str> = keep.into_iter().collect();
        let before = self.entries.len();
        self.entries.retain(|url, _| keep.contains(url.as_str()));
        before - self.entries.len()
    }

    pub fn state(&self, url: &str) -> Option<ImageState> {
        self.entries.get(url).copied()
    }

    pub fn is_ready(&self, url: &str) -> bool {
        self.state(url) == Some(ImageState::Ready)
    }

    /// URLs still waiting on the host, sorted.
    pub fn pending(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, state)| **state == ImageState::Pending)
            .map(|(url, _)| url.clone())
            .collect();
        urls.sort();
        urls
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

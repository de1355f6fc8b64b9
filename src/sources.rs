//! # Sources
//! The fixed set of tracked profiles and the per-profile media selection rule.
//!
//! Each profile posts its menu differently: one uploads several photos and
//! puts the menu last, the others lead with it. The rule lives in a lookup
//! table keyed by source key so it stays in one auditable place.

use std::collections::HashSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Which element of a post's media list carries the menu image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPick {
    First,
    Last,
}

impl MediaPick {
    /// Pick from `items` according to the strategy. `None` on an empty slice.
    pub fn select<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        match self {
            MediaPick::First => items.first(),
            MediaPick::Last => items.last(),
        }
    }
}

/// Source key → selection strategy for the profiles we know about.
const MEDIA_PICK_TABLE: &[(&str, MediaPick)] = &[
    ("_FxbaQC", MediaPick::Last),
    ("_CiVis", MediaPick::First),
    ("_vKxgdn", MediaPick::First),
];

/// Look up the selection strategy for a source key.
pub fn media_pick_for(key: &str) -> Option<MediaPick> {
    MEDIA_PICK_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, pick)| *pick)
}

/// One tracked profile: logical name used in reports + opaque feed key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub key: String,
}

impl Source {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Ordered, immutable set of sources with unique names and unique keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSet {
    sources: Vec<Source>,
}

impl SourceSet {
    /// Build a set, rejecting blank or duplicate names/keys.
    pub fn new(sources: Vec<Source>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for s in &sources {
            if s.name.trim().is_empty() || s.key.trim().is_empty() {
                bail!("source entries need a non-empty name and key");
            }
            if !names.insert(s.name.as_str()) {
                bail!("duplicate source name `{}`", s.name);
            }
            if !keys.insert(s.key.as_str()) {
                bail!("duplicate source key `{}`", s.key);
            }
        }
        Ok(Self { sources })
    }

    /// The three profiles of the production deployment.
    pub fn default_lunch_spots() -> Self {
        Self {
            sources: vec![
                Source::new("uncle", "_FxbaQC"),
                Source::new("mouse", "_CiVis"),
                Source::new("jundam", "_vKxgdn"),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<'de> Deserialize<'de> for SourceSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let sources = Vec::<Source>::deserialize(deserializer)?;
        SourceSet::new(sources).map_err(serde::de::Error::custom)
    }
}

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::catalog::{AssetAvailability, WordEntry};

pub const DEFAULT_LEVEL_NAME: &str = "Default Level";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub words: Vec<WordEntry>,
    pub unlocked: bool,
}

impl Level {
    pub fn new<S: Into<String>>(id: u32, name: S, words: Vec<WordEntry>) -> Self {
        Self {
            id,
            name: name.into(),
            words,
            unlocked: id == 1,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Numeric level keys read better as "Level 3".
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() && self.name.chars().all(|c| c.is_ascii_digit()) {
            format!("Level {}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Partitions the catalog into levels.
///
/// Groups follow the order in which their key first appears. Entries whose
/// image cannot be resolved are dropped, but their group still becomes a
/// level. Each level's words are shuffled independently.
pub fn build_levels<R: Rng + ?Sized>(
    entries: &[WordEntry],
    availability: &AssetAvailability,
    rng: &mut R,
) -> Vec<Level> {
    let mut groups: Vec<(String, Vec<WordEntry>)> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;

    for entry in entries {
        let name = entry.level.to_string();
        let slot = *index_by_name.entry(name.clone()).or_insert_with(|| {
            groups.push((name, Vec::new()));
            groups.len() - 1
        });

        match availability.resolve(entry) {
            Some(image) => {
                let mut word = entry.clone();
                word.image = Some(image);
                groups[slot].1.push(word);
            }
            None => {
                dropped += 1;
                debug!("No image for '{}', leaving it out of level '{}'", entry.word, groups[slot].0);
            }
        }
    }

    let mut levels: Vec<Level> = groups
        .into_iter()
        .enumerate()
        .map(|(index, (name, mut words))| {
            words.shuffle(rng);
            Level::new(index as u32 + 1, name, words)
        })
        .collect();

    if levels.is_empty() {
        levels.push(Level::new(1, DEFAULT_LEVEL_NAME, Vec::new()));
    }

    info!(
        "Built {} level(s) from {} catalog entries ({} without images)",
        levels.len(),
        entries.len(),
        dropped
    );
    levels
}

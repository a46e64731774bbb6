use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::catalog::{AssetAvailability, WordEntry};
use crate::core::level::{build_levels, Level};
use crate::utils::{GameError, GameResult, KeyValueStore};

/// Storage key holding the serialized [`PlayerProgress`].
pub const PROGRESS_KEY: &str = "wordGameProgress";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub score: u32,
    pub stars: u8,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
    #[serde(default)]
    pub completed_levels: BTreeMap<u32, LevelRecord>,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub correct_answers: u64,
    #[serde(default)]
    pub total_attempts: u64,
}

impl PlayerProgress {
    pub fn to_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GameError::storage_read(format!("Corrupt progress record: {}", e)))
    }

    /// Percentage of correct answers, rounded; 0 before the first attempt.
    pub fn accuracy(&self) -> u32 {
        if self.total_attempts == 0 {
            return 0;
        }
        (self.correct_answers as f64 / self.total_attempts as f64 * 100.0).round() as u32
    }

    pub fn total_stars(&self) -> u32 {
        self.completed_levels.values().map(|r| u32::from(r.stars)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total_score: u64,
    pub completed_levels: usize,
    pub total_levels: usize,
    pub total_stars: u32,
    pub accuracy: u32,
    pub total_attempts: u64,
}

/// Owns the level list and the durable progress record.
pub struct ProgressStore {
    levels: Vec<Level>,
    progress: PlayerProgress,
    storage: Box<dyn KeyValueStore>,
    rng: StdRng,
    storage_degraded: bool,
}

impl ProgressStore {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self::with_rng(storage, StdRng::from_entropy())
    }

    pub fn with_rng(storage: Box<dyn KeyValueStore>, rng: StdRng) -> Self {
        Self {
            levels: Vec::new(),
            progress: PlayerProgress::default(),
            storage,
            rng,
            storage_degraded: false,
        }
    }

    /// Creates a store and restores whatever progress `storage` holds.
    /// Unreadable records are logged and ignored.
    pub fn open(storage: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self::new(storage);
        let persisted = match store.read_persisted() {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!("Starting with fresh progress: {}", e);
                None
            }
        };
        store.restore_progress(persisted);
        store
    }

    pub fn load(&mut self, entries: &[WordEntry], availability: &AssetAvailability) -> &[Level] {
        self.levels = build_levels(entries, availability, &mut self.rng);
        self.refresh_unlocks();
        &self.levels
    }

    pub fn read_persisted(&self) -> GameResult<Option<PlayerProgress>> {
        match self.storage.get(PROGRESS_KEY)? {
            Some(json) => PlayerProgress::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    pub fn restore_progress(&mut self, persisted: Option<PlayerProgress>) {
        if let Some(progress) = persisted {
            info!(
                "Restored progress: {} completed level(s), total score {}",
                progress.completed_levels.len(),
                progress.total_score
            );
            self.progress = progress;
        }
        self.refresh_unlocks();
    }

    pub fn record_level_completion(&mut self, level_id: u32, score: u32, stars: u8) {
        let stars = stars.clamp(1, 3);
        if self.level(level_id).is_none() {
            warn!("Recording completion for unknown level {}", level_id);
        }

        self.progress.completed_levels.insert(
            level_id,
            LevelRecord {
                score,
                stars,
                completed_at: Utc::now(),
            },
        );
        self.progress.total_score += u64::from(score);
        info!("Level {} completed: score {}, {} star(s)", level_id, score, stars);

        self.refresh_unlocks();
        self.persist();
    }

    pub fn record_answer(&mut self, correct: bool) {
        self.progress.total_attempts += 1;
        if correct {
            self.progress.correct_answers += 1;
        }
        self.persist();
    }

    pub fn reset(&mut self) {
        self.progress = PlayerProgress::default();
        for (index, level) in self.levels.iter_mut().enumerate() {
            level.unlocked = index == 0;
        }
        info!("Player progress reset");
        self.persist();
    }

    pub fn accuracy(&self) -> u32 {
        self.progress.accuracy()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, level_id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }

    /// Words of a level, empty when the level does not exist.
    pub fn level_words(&self, level_id: u32) -> &[WordEntry] {
        self.level(level_id).map(|l| l.words.as_slice()).unwrap_or(&[])
    }

    pub fn is_unlocked(&self, level_id: u32) -> bool {
        self.level(level_id).map_or(false, |l| l.unlocked)
    }

    /// Fails unless `level_id` exists and is unlocked.
    pub fn ensure_unlocked(&self, level_id: u32) -> GameResult<()> {
        let level = self
            .level(level_id)
            .ok_or_else(|| GameError::unknown_level(level_id))?;
        if !level.unlocked {
            return Err(GameError::level_locked(level_id));
        }
        Ok(())
    }

    pub fn level_record(&self, level_id: u32) -> Option<&LevelRecord> {
        self.progress.completed_levels.get(&level_id)
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            total_score: self.progress.total_score,
            completed_levels: self.progress.completed_levels.len(),
            total_levels: self.levels.len(),
            total_stars: self.progress.total_stars(),
            accuracy: self.accuracy(),
            total_attempts: self.progress.total_attempts,
        }
    }

    /// True once a write has failed; in-memory state is still authoritative.
    pub fn storage_degraded(&self) -> bool {
        self.storage_degraded
    }

    fn refresh_unlocks(&mut self) {
        let mut previous_id: Option<u32> = None;
        for level in self.levels.iter_mut() {
            level.unlocked = match previous_id {
                None => true,
                Some(prev) => self.progress.completed_levels.contains_key(&prev),
            };
            previous_id = Some(level.id);
        }
    }

    fn persist(&mut self) {
        let result = self
            .progress
            .to_json()
            .and_then(|json| self.storage.set(PROGRESS_KEY, &json));

        match result {
            Ok(()) => {
                self.storage_degraded = false;
                debug!("Progress saved");
            }
            Err(e) => {
                self.storage_degraded = true;
                warn!("Progress kept in memory only: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStore;
    use pretty_assertions::assert_eq;

    fn catalog() -> Vec<WordEntry> {
        vec![
            WordEntry::new(1, "cat", "猫", "Animals"),
            WordEntry::new(2, "dog", "狗", "Animals"),
            WordEntry::new(3, "red", "红色", "Colors"),
            WordEntry::new(4, "blue", "蓝色", "Colors"),
            WordEntry::new(5, "one", "一", "Numbers"),
        ]
    }

    fn store_with(storage: &MemoryStore) -> ProgressStore {
        let mut store = ProgressStore::with_rng(Box::new(storage.clone()), StdRng::seed_from_u64(3));
        store.load(&catalog(), &AssetAvailability::AssumeAllAvailable);
        store
    }

    fn unlocked(store: &ProgressStore) -> Vec<bool> {
        store.levels().iter().map(|l| l.unlocked).collect()
    }

    #[test]
    fn test_initial_unlock_state() {
        let store = store_with(&MemoryStore::new());
        assert_eq!(unlocked(&store), vec![true, false, false]);
        assert!(store.is_unlocked(1));
        assert!(!store.is_unlocked(2));
        assert!(!store.is_unlocked(42));
    }

    #[test]
    fn test_completion_unlocks_next_level() {
        let memory = MemoryStore::new();
        let mut store = store_with(&memory);

        store.record_level_completion(1, 40, 3);
        assert_eq!(unlocked(&store), vec![true, true, false]);
        assert_eq!(store.progress().total_score, 40);
        assert_eq!(store.level_record(1).map(|r| r.stars), Some(3));

        let saved = memory.get(PROGRESS_KEY).unwrap().unwrap();
        let saved = PlayerProgress::from_json(&saved).unwrap();
        assert_eq!(&saved, store.progress());
    }

    #[test]
    fn test_ensure_unlocked() {
        let mut store = store_with(&MemoryStore::new());

        assert!(store.ensure_unlocked(1).is_ok());
        assert!(matches!(
            store.ensure_unlocked(2).unwrap_err(),
            GameError::LevelLocked { level_id: 2 }
        ));
        assert!(matches!(
            store.ensure_unlocked(42).unwrap_err(),
            GameError::UnknownLevel { level_id: 42 }
        ));

        store.record_level_completion(1, 20, 2);
        assert!(store.ensure_unlocked(2).is_ok());
    }

    #[test]
    fn test_unlock_requires_direct_predecessor() {
        let mut store = store_with(&MemoryStore::new());

        store.record_level_completion(2, 10, 1);
        assert_eq!(unlocked(&store), vec![true, false, true]);
    }

    #[test]
    fn test_repeat_completion_upserts_and_accumulates() {
        let mut store = store_with(&MemoryStore::new());

        store.record_level_completion(1, 10, 1);
        store.record_level_completion(1, 20, 2);

        assert_eq!(store.progress().completed_levels.len(), 1);
        assert_eq!(store.level_record(1).map(|r| (r.score, r.stars)), Some((20, 2)));
        assert_eq!(store.progress().total_score, 30);
    }

    #[test]
    fn test_restore_progress_recomputes_unlocks() {
        let memory = MemoryStore::new();
        let mut first = store_with(&memory);
        first.record_level_completion(1, 20, 2);
        first.record_level_completion(2, 20, 2);

        let mut second = ProgressStore::open(Box::new(memory.clone()));
        second.load(&catalog(), &AssetAvailability::AssumeAllAvailable);
        assert_eq!(unlocked(&second), vec![true, true, true]);
        assert_eq!(second.progress().total_score, 40);
    }

    #[test]
    fn test_restore_absent_keeps_defaults() {
        let mut store = store_with(&MemoryStore::new());
        store.restore_progress(None);

        assert_eq!(store.progress(), &PlayerProgress::default());
        assert_eq!(unlocked(&store), vec![true, false, false]);
    }

    #[test]
    fn test_corrupt_progress_falls_back_to_defaults() {
        let mut memory = MemoryStore::new();
        memory.set(PROGRESS_KEY, "{\"completedLevels\": [oops").unwrap();

        let reader = ProgressStore::new(Box::new(memory.clone()));
        assert!(matches!(reader.read_persisted().unwrap_err(), GameError::StorageRead { .. }));

        let store = ProgressStore::open(Box::new(memory));
        assert_eq!(store.progress(), &PlayerProgress::default());
    }

    #[test]
    fn test_record_answer_counts() {
        let mut store = store_with(&MemoryStore::new());

        store.record_answer(true);
        store.record_answer(false);

        assert_eq!(store.progress().total_attempts, 2);
        assert_eq!(store.progress().correct_answers, 1);
        assert_eq!(store.accuracy(), 50);
    }

    #[test]
    fn test_accuracy_rounding() {
        let mut progress = PlayerProgress::default();
        assert_eq!(progress.accuracy(), 0);

        progress.correct_answers = 1;
        progress.total_attempts = 3;
        assert_eq!(progress.accuracy(), 33);

        progress.correct_answers = 2;
        assert_eq!(progress.accuracy(), 67);
    }

    #[test]
    fn test_reset() {
        let memory = MemoryStore::new();
        let mut store = store_with(&memory);
        store.record_answer(true);
        store.record_level_completion(1, 50, 3);
        store.record_level_completion(2, 50, 3);

        store.reset();

        assert_eq!(store.progress(), &PlayerProgress::default());
        assert_eq!(unlocked(&store), vec![true, false, false]);
        let saved = PlayerProgress::from_json(&memory.get(PROGRESS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved, PlayerProgress::default());
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let memory = MemoryStore::new();
        let mut store = store_with(&memory);
        memory.set_fail_writes(true);

        store.record_answer(true);
        store.record_level_completion(1, 10, 1);

        assert!(store.storage_degraded());
        assert_eq!(store.progress().total_attempts, 1);
        assert!(store.is_unlocked(2));
        assert_eq!(memory.get(PROGRESS_KEY).unwrap(), None);

        memory.set_fail_writes(false);
        store.record_answer(false);
        assert!(!store.storage_degraded());
        assert!(memory.get(PROGRESS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_progress_json_roundtrip() {
        let mut progress = PlayerProgress {
            total_score: 70,
            correct_answers: 7,
            total_attempts: 9,
            ..Default::default()
        };
        progress.completed_levels.insert(
            2,
            LevelRecord {
                score: 70,
                stars: 2,
                completed_at: Utc::now(),
            },
        );

        let json = progress.to_json().unwrap();
        assert!(json.contains("\"completedLevels\""));
        assert!(json.contains("\"completedAt\""));
        assert_eq!(PlayerProgress::from_json(&json).unwrap(), progress);
    }

    #[test]
    fn test_reads_browser_shaped_record() {
        let json = r#"{
            "completedLevels": {"1": {"score": 30, "stars": 2, "completedAt": "2024-03-01T10:00:00.000Z"}},
            "totalScore": 30,
            "correctAnswers": 3,
            "totalAttempts": 4
        }"#;
        let progress = PlayerProgress::from_json(json).unwrap();

        assert_eq!(progress.completed_levels[&1].score, 30);
        assert_eq!(progress.accuracy(), 75);
        assert_eq!(progress.total_stars(), 2);
    }

    #[test]
    fn test_summary_and_level_queries() {
        let mut store = store_with(&MemoryStore::new());
        store.record_answer(true);
        store.record_level_completion(1, 20, 2);

        let summary = store.summary();
        assert_eq!(summary.total_score, 20);
        assert_eq!(summary.completed_levels, 1);
        assert_eq!(summary.total_levels, 3);
        assert_eq!(summary.total_stars, 2);
        assert_eq!(summary.accuracy, 100);

        assert_eq!(store.level_words(1).len(), 2);
        assert!(store.level_words(99).is_empty());
    }
}

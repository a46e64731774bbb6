use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::WordEntry;
use crate::core::session::SessionResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: Uuid,
    pub event_type: GameEventType,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventType {
    SessionStarted,
    AnswerRecorded,
    TimeExpired,
    SessionEnded,
    SessionAbandoned,
}

impl GameEvent {
    pub fn new(event_type: GameEventType, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn session_started(session_id: Uuid, level_id: u32, total_words: usize) -> Self {
        let data = serde_json::json!({
            "session_id": session_id,
            "level_id": level_id,
            "total_words": total_words
        });
        Self::new(GameEventType::SessionStarted, data)
    }

    pub fn answer_recorded(word: &WordEntry, correct: bool, points: u32, score: u32) -> Self {
        let data = serde_json::json!({
            "word": word.word,
            "correct": correct,
            "points": points,
            "score": score
        });
        Self::new(GameEventType::AnswerRecorded, data)
    }

    pub fn time_expired(level_id: u32, answered: usize) -> Self {
        let data = serde_json::json!({
            "level_id": level_id,
            "answered": answered
        });
        Self::new(GameEventType::TimeExpired, data)
    }

    pub fn session_ended(result: &SessionResult) -> Self {
        let data = serde_json::json!({
            "level_id": result.level_id,
            "score": result.score,
            "correct_answers": result.correct_answers,
            "total_words": result.total_words,
            "stars": result.stars
        });
        Self::new(GameEventType::SessionEnded, data)
    }

    pub fn session_abandoned(level_id: u32, answered: usize) -> Self {
        let data = serde_json::json!({
            "level_id": level_id,
            "answered": answered
        });
        Self::new(GameEventType::SessionAbandoned, data)
    }
}

pub trait GameEventHandler {
    fn handle_event(&mut self, event: &GameEvent);
}

/// Bounded in-memory event history; the oldest entry goes first.
pub struct EventLogger {
    events: Vec<GameEvent>,
    max_events: usize,
}

impl EventLogger {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    pub fn get_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn get_events_by_type(&self, event_type: &GameEventType) -> Vec<&GameEvent> {
        self.events
            .iter()
            .filter(|event| &event.event_type == event_type)
            .collect()
    }

    pub fn get_recent_events(&self, count: usize) -> Vec<&GameEvent> {
        let start = self.events.len().saturating_sub(count);
        self.events[start..].iter().collect()
    }

    pub fn get_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl GameEventHandler for EventLogger {
    fn handle_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());

        if self.events.len() > self.max_events {
            self.events.remove(0);
        }
    }
}

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::WordEntry;
use crate::core::countdown::{Ticker, TICK_PERIOD};
use crate::core::events::{EventLogger, GameEvent, GameEventHandler};
use crate::core::progress::ProgressStore;
use crate::utils::{GameError, GameResult};

pub const THREE_STAR_PERCENT: f64 = 80.0;
pub const TWO_STAR_PERCENT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRules {
    pub time_limit_secs: u32,
    pub points_per_correct: u32,
    pub distractors: usize,
    pub min_words_per_level: usize,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            time_limit_secs: 60,
            points_per_correct: 10,
            distractors: 2,
            min_words_per_level: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Active,
    Ended,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub id: Uuid,
    pub level_id: u32,
    pub words: Vec<WordEntry>,
    pub current_index: usize,
    pub score: u32,
    pub correct_answers: usize,
    pub remaining_time: u32,
    pub active: bool,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub word: WordEntry,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    pub level_id: u32,
    pub score: u32,
    pub correct_answers: usize,
    pub total_words: usize,
    pub stars: u8,
}

impl SessionResult {
    /// Share of the session's words answered correctly, 0..=100.
    pub fn accuracy(&self) -> u32 {
        if self.total_words == 0 {
            return 0;
        }
        (self.correct_answers as f64 / self.total_words as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerResult {
    pub correct: bool,
    pub points_awarded: u32,
    pub answered_word: Option<WordEntry>,
    pub correct_word: Option<WordEntry>,
    pub session_complete: bool,
    pub next_word: Option<WordEntry>,
    pub result: Option<SessionResult>,
}

impl AnswerResult {
    fn ignored() -> Self {
        Self {
            correct: false,
            points_awarded: 0,
            answered_word: None,
            correct_word: None,
            session_complete: false,
            next_word: None,
            result: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub current_index: usize,
    pub total_words: usize,
    pub score: u32,
    pub remaining_time: u32,
}

/// Star rating for a finished session: 3 at 80% of the attainable points,
/// 2 at 60%, otherwise 1. A session without words still earns one star.
pub fn star_rating(score: u32, total_words: usize, points_per_correct: u32) -> u8 {
    let attainable = total_words as f64 * f64::from(points_per_correct);
    let percentage = if attainable > 0.0 {
        f64::from(score) / attainable * 100.0
    } else {
        0.0
    };

    if percentage >= THREE_STAR_PERCENT {
        3
    } else if percentage >= TWO_STAR_PERCENT {
        2
    } else {
        1
    }
}

/// Runs one timed play session at a time against a level's words.
pub struct SessionEngine {
    rules: SessionRules,
    phase: SessionPhase,
    session: Option<SessionState>,
    last_result: Option<SessionResult>,
    ticker: Box<dyn Ticker>,
    rng: StdRng,
    events: EventLogger,
}

impl SessionEngine {
    pub fn new(rules: SessionRules, ticker: Box<dyn Ticker>) -> Self {
        Self::with_rng(rules, ticker, StdRng::from_entropy())
    }

    pub fn with_rng(rules: SessionRules, ticker: Box<dyn Ticker>, rng: StdRng) -> Self {
        Self {
            rules,
            phase: SessionPhase::Idle,
            session: None,
            last_result: None,
            ticker,
            rng,
            events: EventLogger::default(),
        }
    }

    /// Begins a session on `level_id`. Unknown levels and levels below the
    /// minimum word count are rejected and leave the engine untouched.
    pub fn start(&mut self, progress: &ProgressStore, level_id: u32) -> GameResult<()> {
        let level = progress
            .level(level_id)
            .ok_or_else(|| GameError::unknown_level(level_id))?;

        let required = self.rules.min_words_per_level.max(1);
        if level.words.len() < required {
            return Err(GameError::empty_level(level_id, level.words.len(), required));
        }

        if self.phase == SessionPhase::Active {
            self.abandon();
        }

        let session = SessionState {
            id: Uuid::new_v4(),
            level_id,
            words: level.words.clone(),
            current_index: 0,
            score: 0,
            correct_answers: 0,
            remaining_time: self.rules.time_limit_secs,
            active: true,
            started_at: Utc::now(),
        };

        info!(
            "Session {} started on level {} ({} words, {}s)",
            session.id,
            level_id,
            session.words.len(),
            session.remaining_time
        );
        self.emit_event(GameEvent::session_started(session.id, level_id, session.words.len()));

        self.session = Some(session);
        self.last_result = None;
        self.phase = SessionPhase::Active;
        self.ticker.start(TICK_PERIOD);
        Ok(())
    }

    /// The word being asked. Ends the session if the word list is exhausted.
    pub fn current_word(&mut self, progress: &mut ProgressStore) -> Option<&WordEntry> {
        let exhausted = self
            .session
            .as_ref()
            .map_or(false, |s| s.current_index >= s.words.len());
        if exhausted {
            self.end(progress);
            return None;
        }
        self.peek_word()
    }

    /// The word at the current index, without side effects.
    pub fn peek_word(&self) -> Option<&WordEntry> {
        self.session
            .as_ref()
            .and_then(|s| s.words.get(s.current_index))
    }

    /// The current word plus up to `distractors` other words of the session,
    /// in random order.
    pub fn options(&mut self, progress: &mut ProgressStore) -> Vec<AnswerOption> {
        let current = match self.current_word(progress) {
            Some(word) => word.clone(),
            None => return Vec::new(),
        };
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };

        let others: Vec<&WordEntry> = session
            .words
            .iter()
            .filter(|word| word.id != current.id)
            .collect();

        let mut options: Vec<AnswerOption> = others
            .choose_multiple(&mut self.rng, self.rules.distractors)
            .map(|word| AnswerOption {
                word: (*word).clone(),
                is_correct: false,
            })
            .collect();
        options.push(AnswerOption {
            word: current,
            is_correct: true,
        });
        options.shuffle(&mut self.rng);
        options
    }

    /// Scores `selected` against the current word and moves on.
    ///
    /// An option counts only if it is flagged correct and refers to the word
    /// being asked. Outside an active session this does nothing.
    pub fn answer(&mut self, progress: &mut ProgressStore, selected: &AnswerOption) -> AnswerResult {
        if self.phase != SessionPhase::Active {
            debug!("Ignoring answer outside an active session");
            return AnswerResult::ignored();
        }
        let points_per_correct = self.rules.points_per_correct;
        let Some(session) = self.session.as_mut() else {
            return AnswerResult::ignored();
        };
        let Some(current) = session.words.get(session.current_index).cloned() else {
            return AnswerResult::ignored();
        };

        let correct = selected.is_correct && selected.word.id == current.id;
        let points = if correct { points_per_correct } else { 0 };
        if correct {
            session.score += points;
            session.correct_answers += 1;
        }
        session.current_index += 1;

        let complete = session.current_index >= session.words.len();
        let next_word = session.words.get(session.current_index).cloned();
        let score = session.score;

        debug!(
            "Answer for '{}': {} (+{}, score {})",
            current.word,
            if correct { "correct" } else { "wrong" },
            points,
            score
        );
        progress.record_answer(correct);
        self.emit_event(GameEvent::answer_recorded(&current, correct, points, score));

        let result = if complete { self.finish(progress) } else { None };

        AnswerResult {
            correct,
            points_awarded: points,
            answered_word: Some(selected.word.clone()),
            correct_word: Some(current),
            session_complete: complete,
            next_word: if complete { None } else { next_word },
            result,
        }
    }

    /// One countdown period elapsed. Returns the result if time ran out.
    pub fn on_tick(&mut self, progress: &mut ProgressStore) -> Option<SessionResult> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        let session = self.session.as_mut()?;
        session.remaining_time = session.remaining_time.saturating_sub(1);
        if session.remaining_time > 0 {
            return None;
        }

        let (level_id, answered) = (session.level_id, session.current_index);
        info!("Time is up on level {} after {} answer(s)", level_id, answered);
        self.emit_event(GameEvent::time_expired(level_id, answered));
        self.finish(progress)
    }

    /// Applies every period the ticker has accumulated since the last call.
    pub fn sync_clock(&mut self, progress: &mut ProgressStore) -> Option<SessionResult> {
        let due = self.ticker.drain();
        for _ in 0..due {
            if let Some(result) = self.on_tick(progress) {
                return Some(result);
            }
        }
        None
    }

    /// Finishes the active session and credits the level. Calling it again
    /// returns the same result without crediting twice; while idle it
    /// returns `None`.
    pub fn end(&mut self, progress: &mut ProgressStore) -> Option<SessionResult> {
        match self.phase {
            SessionPhase::Idle => None,
            SessionPhase::Ended => self.last_result.clone(),
            SessionPhase::Active => self.finish(progress),
        }
    }

    /// Drops the session without crediting the level. Returns whether an
    /// active session was abandoned.
    pub fn abandon(&mut self) -> bool {
        let was_active = self.phase == SessionPhase::Active;
        if was_active {
            self.ticker.cancel();
            if let Some(session) = &self.session {
                info!("Session {} abandoned on level {}", session.id, session.level_id);
                let event = GameEvent::session_abandoned(session.level_id, session.current_index);
                self.emit_event(event);
            }
        }
        self.session = None;
        self.phase = SessionPhase::Idle;
        was_active
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(|s| SessionProgress {
            current_index: s.current_index,
            total_words: s.words.len(),
            score: s.score,
            remaining_time: s.remaining_time,
        })
    }

    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub fn events(&self) -> &EventLogger {
        &self.events
    }

    /// Ends the session and credits its level. Without session state there
    /// is nothing to credit, so the engine drops back to idle instead.
    fn finish(&mut self, progress: &mut ProgressStore) -> Option<SessionResult> {
        self.ticker.cancel();

        let Some(session) = self.session.as_mut() else {
            warn!("Active phase without a session; nothing to credit");
            self.phase = SessionPhase::Idle;
            return None;
        };
        session.active = false;
        self.phase = SessionPhase::Ended;

        let result = SessionResult {
            level_id: session.level_id,
            score: session.score,
            correct_answers: session.correct_answers,
            total_words: session.words.len(),
            stars: star_rating(session.score, session.words.len(), self.rules.points_per_correct),
        };

        progress.record_level_completion(result.level_id, result.score, result.stars);
        self.emit_event(GameEvent::session_ended(&result));
        info!(
            "Session ended on level {}: score {}, {}/{} correct, {} star(s)",
            result.level_id, result.score, result.correct_answers, result.total_words, result.stars
        );

        self.last_result = Some(result.clone());
        Some(result)
    }

    fn emit_event(&mut self, event: GameEvent) {
        self.events.handle_event(&event);
    }
}

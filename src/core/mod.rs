pub mod countdown;
pub mod events;
pub mod level;
pub mod progress;
pub mod session;
pub mod settings;

pub use countdown::{IntervalTicker, ManualTicker, Ticker, TICK_PERIOD};
pub use events::{EventLogger, GameEvent, GameEventHandler, GameEventType};
pub use level::{build_levels, Level, DEFAULT_LEVEL_NAME};
pub use progress::{LevelRecord, PlayerProgress, ProgressStore, ProgressSummary, PROGRESS_KEY};
pub use session::{
    star_rating, AnswerOption, AnswerResult, SessionEngine, SessionPhase, SessionProgress,
    SessionResult, SessionRules, SessionState,
};
pub use settings::{Settings, SettingsStore, SettingsUpdate, SETTINGS_KEY};

pub mod catalog;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;

pub use catalog::{CatalogLoader, WordEntry};
pub use config::Config;
pub use core::{Level, ProgressStore, SessionEngine, SessionResult, SettingsStore};
pub use ui::GameInterface;
pub use utils::{GameError, GameResult};

// Re-export commonly used types
pub type Result<T> = anyhow::Result<T>;

// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

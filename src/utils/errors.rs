use thiserror::Error;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Load error: {message}")]
    Load { message: String },

    #[error("Level not found: {level_id}")]
    UnknownLevel { level_id: u32 },

    #[error("Level {level_id} has {words} playable word(s), at least {required} required")]
    EmptyLevel {
        level_id: u32,
        words: usize,
        required: usize,
    },

    #[error("Level {level_id} is locked; finish the previous level first")]
    LevelLocked { level_id: u32 },

    #[error("Storage write error: {message}")]
    StorageWrite { message: String },

    #[error("Storage read error: {message}")]
    StorageRead { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl GameError {
    pub fn load<S: Into<String>>(message: S) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    pub fn unknown_level(level_id: u32) -> Self {
        Self::UnknownLevel { level_id }
    }

    pub fn empty_level(level_id: u32, words: usize, required: usize) -> Self {
        Self::EmptyLevel {
            level_id,
            words,
            required,
        }
    }

    pub fn level_locked(level_id: u32) -> Self {
        Self::LevelLocked { level_id }
    }

    pub fn storage_write<S: Into<String>>(message: S) -> Self {
        Self::StorageWrite {
            message: message.into(),
        }
    }

    pub fn storage_read<S: Into<String>>(message: S) -> Self {
        Self::StorageRead {
            message: message.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Errors the player can recover from without restarting.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Load { .. } | Self::Configuration { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = GameError::load("words.json missing");
        assert!(matches!(error, GameError::Load { .. }));
        assert_eq!(error.to_string(), "Load error: words.json missing");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_empty_level_error() {
        let error = GameError::empty_level(3, 0, 1);
        assert!(matches!(error, GameError::EmptyLevel { level_id: 3, .. }));
        assert_eq!(
            error.to_string(),
            "Level 3 has 0 playable word(s), at least 1 required"
        );
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_storage_errors_are_recoverable() {
        assert!(GameError::storage_write("quota exceeded").is_recoverable());
        assert!(GameError::storage_read("bad json").is_recoverable());
        assert!(GameError::unknown_level(9).is_recoverable());
    }

    #[test]
    fn test_level_locked_error() {
        let error = GameError::level_locked(2);
        assert!(matches!(error, GameError::LevelLocked { level_id: 2 }));
        assert_eq!(error.to_string(), "Level 2 is locked; finish the previous level first");
        assert!(error.is_recoverable());
    }
}

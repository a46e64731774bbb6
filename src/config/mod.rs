use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::AssetListFallback;
use crate::core::SessionRules;
use crate::utils::{GameError, GameResult};

/// Prefix for environment overrides, e.g. `WORD_GAME__GAMEPLAY__TIME_LIMIT_SECS=90`.
pub const ENV_PREFIX: &str = "WORD_GAME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gameplay: GameplayConfig,
    pub assets: AssetConfig,
    pub ui: UiConfig,
    pub paths: PathConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameplayConfig {
    pub time_limit_secs: u32,
    pub points_per_correct: u32,
    pub distractors: usize,
    pub min_words_per_level: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub on_list_unavailable: AssetListFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String,
    pub text_width: usize,
    pub feedback_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub catalog_file: PathBuf,
    pub asset_list_file: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        let rules = SessionRules::default();
        Self {
            gameplay: GameplayConfig {
                time_limit_secs: rules.time_limit_secs,
                points_per_correct: rules.points_per_correct,
                distractors: rules.distractors,
                min_words_per_level: rules.min_words_per_level,
            },
            assets: AssetConfig {
                on_list_unavailable: AssetListFallback::AssumeAllAvailable,
            },
            ui: UiConfig {
                theme: "default".to_string(),
                text_width: 80,
                feedback_delay_ms: 800,
            },
            paths: PathConfig {
                catalog_file: PathBuf::from("./data/words.json"),
                asset_list_file: PathBuf::from("./available-images.json"),
                data_dir: PathBuf::from("./.word-game"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Built-in defaults, then the TOML file at `path` if it exists, then
    /// `WORD_GAME__*` environment variables.
    pub fn load(path: Option<&Path>) -> GameResult<Self> {
        let mut builder = ::config::Config::builder().add_source(::config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| GameError::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| GameError::configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GameResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GameError::configuration(format!("Failed to create config directory: {}", e)))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .map_err(|e| GameError::configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_content)
            .map_err(|e| GameError::configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn session_rules(&self) -> SessionRules {
        SessionRules {
            time_limit_secs: self.gameplay.time_limit_secs,
            points_per_correct: self.gameplay.points_per_correct,
            distractors: self.gameplay.distractors,
            min_words_per_level: self.gameplay.min_words_per_level,
        }
    }

    pub fn validate(&self) -> GameResult<()> {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(GameError::configuration("Invalid logging level")),
        }

        if self.paths.catalog_file.as_os_str().is_empty() {
            return Err(GameError::configuration("Catalog file path cannot be empty"));
        }
        if self.paths.data_dir.as_os_str().is_empty() {
            return Err(GameError::configuration("Data directory path cannot be empty"));
        }

        if self.gameplay.time_limit_secs == 0 {
            return Err(GameError::configuration("Time limit must be greater than 0"));
        }
        if self.gameplay.points_per_correct == 0 {
            return Err(GameError::configuration("Points per correct answer must be greater than 0"));
        }
        if self.ui.text_width < 40 {
            return Err(GameError::configuration("Text width must be at least 40"));
        }

        Ok(())
    }

    pub fn merge_with_cli(&mut self, cli_config: CliConfig) {
        if let Some(catalog_file) = cli_config.catalog_file {
            self.paths.catalog_file = catalog_file;
        }
        if let Some(data_dir) = cli_config.data_dir {
            self.paths.data_dir = data_dir;
        }
        if let Some(log_level) = cli_config.log_level {
            self.logging.level = log_level;
        }
        if cli_config.debug {
            self.logging.level = "debug".to_string();
        }
        if let Some(theme) = cli_config.theme {
            self.ui.theme = theme;
        }
    }
}

// Configuration that can be overridden by CLI arguments
#[derive(Debug, Default)]
pub struct CliConfig {
    pub catalog_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub debug: bool,
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::tempdir;

    // Environment variables are process-wide; every test that reads them
    // through `Config::load` holds this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.gameplay.time_limit_secs, 60);
        assert_eq!(config.gameplay.points_per_correct, 10);
        assert_eq!(config.assets.on_list_unavailable, AssetListFallback::AssumeAllAvailable);
        assert_eq!(config.session_rules(), SessionRules::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.gameplay.time_limit_secs = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.ui.text_width = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut saved_config = Config::default();
        saved_config.gameplay.time_limit_secs = 90;
        saved_config.assets.on_list_unavailable = AssetListFallback::Fail;
        saved_config.save_to_file(&config_path).unwrap();

        let loaded_config = Config::from_file(&config_path).unwrap();
        assert_eq!(loaded_config.gameplay.time_limit_secs, 90);
        assert_eq!(loaded_config.assets.on_list_unavailable, AssetListFallback::Fail);
    }

    #[test]
    fn test_from_file_creates_missing_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested/config.toml");

        let config = Config::from_file(&config_path).unwrap();
        assert!(config_path.exists());
        assert_eq!(config.ui.text_width, 80);
    }

    #[test]
    fn test_layered_load_from_partial_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[gameplay]\ntime_limit_secs = 45\n\n[assets]\non_list_unavailable = \"fail\"\n",
        )
        .unwrap();

        let config = {
            let _env = env_guard();
            Config::load(Some(&config_path)).unwrap()
        };
        assert_eq!(config.gameplay.time_limit_secs, 45);
        assert_eq!(config.gameplay.points_per_correct, 10);
        assert_eq!(config.ui.feedback_delay_ms, 800);
        assert_eq!(config.assets.on_list_unavailable, AssetListFallback::Fail);
    }

    #[test]
    fn test_layered_load_rejects_invalid_values() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[gameplay]\ntime_limit_secs = 0\n").unwrap();

        let _env = env_guard();
        assert!(matches!(
            Config::load(Some(&config_path)).unwrap_err(),
            GameError::Configuration { .. }
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let config = {
            let _env = env_guard();
            std::env::set_var("WORD_GAME__UI__FEEDBACK_DELAY_MS", "5");
            let loaded = Config::load(None);
            std::env::remove_var("WORD_GAME__UI__FEEDBACK_DELAY_MS");
            loaded.unwrap()
        };

        assert_eq!(config.ui.feedback_delay_ms, 5);
    }

    #[test]
    fn test_cli_config_merge() {
        let mut config = Config::default();
        let cli_config = CliConfig {
            data_dir: Some(PathBuf::from("/tmp/progress")),
            debug: true,
            theme: Some("dark".to_string()),
            ..Default::default()
        };

        config.merge_with_cli(cli_config);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.ui.theme, "dark");
        assert_eq!(config.paths.data_dir, PathBuf::from("/tmp/progress"));
    }
}

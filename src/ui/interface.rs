use dialoguer::{Confirm, Select};
use std::time::Duration;
use tokio::time::sleep;

use crate::catalog::CatalogLoader;
use crate::config::Config;
use crate::core::{IntervalTicker, ProgressStore, SessionEngine, SessionResult, SettingsStore, SettingsUpdate};
use crate::ui::components::{level_label, option_label};
use crate::ui::{Display, ThemeManager};
use crate::utils::{FileStore, GameError, GameResult};
use tracing::{error, info, warn};

/// Wires the catalog, the stores and the session engine to the terminal.
pub struct GameInterface {
    config: Config,
    display: Display,
    loader: CatalogLoader,
    progress: ProgressStore,
    settings: SettingsStore,
    engine: SessionEngine,
}

impl GameInterface {
    pub async fn new(config: Config) -> GameResult<Self> {
        info!("Initializing game interface");

        let mut display = Display::new(ThemeManager::new(), config.ui.text_width)
            .map_err(|e| GameError::configuration(format!("Failed to create display: {}", e)))?;
        if !display.set_theme(&config.ui.theme) {
            warn!("Unknown theme '{}', using default", config.ui.theme);
        }

        let data_dir = &config.paths.data_dir;
        let progress = ProgressStore::open(Box::new(FileStore::new(data_dir)));
        let settings = SettingsStore::open(Box::new(FileStore::new(data_dir)));
        let engine = SessionEngine::new(config.session_rules(), Box::new(IntervalTicker::new()));
        let loader = CatalogLoader::new(
            &config.paths.catalog_file,
            &config.paths.asset_list_file,
            config.assets.on_list_unavailable,
        );

        Ok(Self {
            config,
            display,
            loader,
            progress,
            settings,
            engine,
        })
    }

    /// Reads the catalog and builds the levels. Returns the level count.
    pub async fn load_catalog(&mut self) -> GameResult<usize> {
        let catalog = self.loader.load().await?;
        let levels = self.progress.load(&catalog.entries, &catalog.availability);
        info!("{} level(s) available", levels.len());
        Ok(levels.len())
    }

    /// Keeps offering a retry while the catalog fails to load.
    pub async fn load_catalog_with_retry(&mut self) -> GameResult<usize> {
        loop {
            match self.load_catalog().await {
                Ok(count) => return Ok(count),
                Err(e @ GameError::Load { .. }) => {
                    error!("Catalog load failed: {}", e);
                    self.display.show_error(&format!("Could not load the word list: {}", e))?;

                    let retry = Confirm::new()
                        .with_prompt("Try again?")
                        .default(true)
                        .interact()
                        .map_err(|e| GameError::configuration(format!("Retry prompt error: {}", e)))?;
                    if !retry {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn run(&mut self) -> GameResult<()> {
        info!("Starting game interface");

        loop {
            match self.show_main_menu().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Main menu error: {}", e);
                    self.display.show_error(&format!("An error occurred: {}", e)).ok();
                    if !e.is_recoverable() {
                        return Err(e);
                    }
                    self.display.wait_for_enter().ok();
                }
            }
        }

        self.display.show_message("Thanks for playing. See you next time!", "success").ok();
        Ok(())
    }

    pub async fn show_main_menu(&mut self) -> GameResult<bool> {
        self.display.clear_screen().ok();
        self.show_game_title()?;

        let choices = vec![
            "🎮 Play",
            "📊 Statistics",
            "⚙️ Settings",
            "🧹 Reset Progress",
            "🚪 Exit",
        ];

        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(|e| GameError::configuration(format!("Menu selection error: {}", e)))?;

        match selection {
            0 => self.level_select_menu().await?,
            1 => self.statistics_menu()?,
            2 => self.settings_menu()?,
            3 => self.reset_progress_menu()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn show_game_title(&self) -> GameResult<()> {
        self.display.show_title("🖼  WORD MATCH")?;
        self.display.show_message("Match each word to its picture before the clock runs out.", "info")?;
        self.display.show_message(&format!("Version {}", crate::VERSION), "info")?;
        println!();

        let summary = self.progress.summary();
        self.display.show_message(
            &format!(
                "Score {}  │  Levels {}/{}  │  Accuracy {}%",
                summary.total_score, summary.completed_levels, summary.total_levels, summary.accuracy
            ),
            "stats",
        )?;
        println!();
        Ok(())
    }

    async fn level_select_menu(&mut self) -> GameResult<()> {
        let levels = self.progress.levels();
        if levels.is_empty() {
            self.display.show_warning("No levels loaded.")?;
            self.display.wait_for_enter()?;
            return Ok(());
        }

        let mut items: Vec<String> = levels
            .iter()
            .map(|level| level_label(level, self.progress.level_record(level.id)))
            .collect();
        let level_ids: Vec<u32> = levels.iter().map(|level| level.id).collect();
        items.push("🔙 Back".to_string());

        let selection = Select::new()
            .with_prompt("Choose a level")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| GameError::configuration(format!("Level selection error: {}", e)))?;

        let Some(&level_id) = level_ids.get(selection) else {
            return Ok(());
        };

        self.play_level(level_id).await
    }

    /// Starts a session on `level_id` if the level is unlocked. Every way
    /// into a level goes through here.
    fn begin_level(&mut self, level_id: u32) -> GameResult<()> {
        self.progress.ensure_unlocked(level_id)?;
        self.engine.start(&self.progress, level_id)
    }

    /// Plays one session on `level_id` through to its result screen.
    pub async fn play_level(&mut self, level_id: u32) -> GameResult<()> {
        if let Err(e) = self.begin_level(level_id) {
            warn!("Cannot start level {}: {}", level_id, e);
            match e {
                GameError::LevelLocked { .. } => self.display.show_warning(&e.to_string())?,
                _ => self.display.show_error(&e.to_string())?,
            }
            self.display.wait_for_enter()?;
            return Ok(());
        }

        let unlocked_before: Vec<u32> = self
            .progress
            .levels()
            .iter()
            .filter(|level| level.unlocked)
            .map(|level| level.id)
            .collect();

        if let Some(result) = self.play_loop().await? {
            self.show_session_result(&result, &unlocked_before)?;
        }
        Ok(())
    }

    async fn play_loop(&mut self) -> GameResult<Option<SessionResult>> {
        let level_name = self
            .engine
            .session()
            .and_then(|s| self.progress.level(s.level_id))
            .map(|level| level.display_name())
            .unwrap_or_default();
        let feedback_delay = Duration::from_millis(self.config.ui.feedback_delay_ms);

        loop {
            if let Some(result) = self.engine.sync_clock(&mut self.progress) {
                self.display.show_warning("Time's up!")?;
                return Ok(Some(result));
            }

            let options = self.engine.options(&mut self.progress);
            if options.is_empty() {
                return Ok(self.engine.last_result().cloned());
            }
            let (Some(word), Some(status)) = (self.engine.peek_word().cloned(), self.engine.progress()) else {
                return Ok(self.engine.last_result().cloned());
            };

            self.display.clear_screen().ok();
            self.display.show_session_header(&level_name, &status)?;
            self.display.show_word(&word)?;

            let mut items: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(index, option)| option_label(index, option))
                .collect();
            items.push("🚪 Quit level".to_string());

            let selection = Select::new()
                .with_prompt("Which picture matches?")
                .items(&items)
                .default(0)
                .interact()
                .map_err(|e| GameError::configuration(format!("Answer selection error: {}", e)))?;

            if let Some(result) = self.engine.sync_clock(&mut self.progress) {
                self.display.show_warning("Time's up! That answer came too late.")?;
                return Ok(Some(result));
            }

            let Some(option) = options.get(selection) else {
                if self.confirm_quit()? {
                    self.engine.abandon();
                    return Ok(None);
                }
                continue;
            };

            let outcome = self.engine.answer(&mut self.progress, option);
            self.display.show_feedback(&outcome)?;
            if self.settings.settings().sound_enabled {
                self.display.beep().ok();
            }
            sleep(feedback_delay).await;

            if let Some(result) = outcome.result {
                return Ok(Some(result));
            }
        }
    }

    fn show_session_result(&self, result: &SessionResult, unlocked_before: &[u32]) -> GameResult<()> {
        println!();
        self.display.show_result(result)?;

        for level in self.progress.levels() {
            if level.unlocked && !unlocked_before.contains(&level.id) {
                self.display.show_success(&format!("{} unlocked!", level.display_name()))?;
            }
        }
        if self.progress.storage_degraded() {
            self.display.show_warning("Progress could not be saved to disk this time.")?;
        }

        self.display.wait_for_enter()?;
        Ok(())
    }

    fn confirm_quit(&self) -> GameResult<bool> {
        let confirmed = Confirm::new()
            .with_prompt("Quit this level? This round will not count.")
            .default(false)
            .interact()
            .map_err(|e| GameError::configuration(format!("Quit confirmation error: {}", e)))?;

        Ok(confirmed)
    }

    fn statistics_menu(&self) -> GameResult<()> {
        self.display.clear_screen().ok();
        self.display.show_summary(&self.progress.summary())?;
        if self.progress.storage_degraded() {
            self.display.show_warning("Progress is currently kept in memory only.")?;
        }
        self.display.wait_for_enter()?;
        Ok(())
    }

    fn settings_menu(&mut self) -> GameResult<()> {
        loop {
            let current = self.settings.settings();
            let choices = vec![
                format!("🔊 Sound: {}", on_off(current.sound_enabled)),
                format!("🎵 Music: {}", on_off(current.music_enabled)),
                "🎨 Theme".to_string(),
                "🔙 Back".to_string(),
            ];

            let selection = Select::new()
                .with_prompt("Settings")
                .items(&choices)
                .interact()
                .map_err(|e| GameError::configuration(format!("Settings selection error: {}", e)))?;

            match selection {
                0 => {
                    self.settings.update(SettingsUpdate {
                        sound_enabled: Some(!current.sound_enabled),
                        ..Default::default()
                    });
                }
                1 => {
                    self.settings.update(SettingsUpdate {
                        music_enabled: Some(!current.music_enabled),
                        ..Default::default()
                    });
                }
                2 => self.change_theme()?,
                _ => break,
            }
        }

        Ok(())
    }

    fn change_theme(&mut self) -> GameResult<()> {
        let themes = self.display.get_available_themes();

        let selection = Select::new()
            .with_prompt("Choose theme")
            .items(&themes)
            .interact()
            .map_err(|e| GameError::configuration(format!("Theme selection error: {}", e)))?;

        let selected_theme = &themes[selection];
        if self.display.set_theme(selected_theme) {
            self.config.ui.theme = selected_theme.clone();
            self.display.show_success(&format!("Theme changed to '{}'", selected_theme))?;
        } else {
            self.display.show_error(&format!("Failed to set theme '{}'", selected_theme))?;
        }

        self.display.wait_for_enter()?;
        Ok(())
    }

    fn reset_progress_menu(&mut self) -> GameResult<()> {
        let confirmed = Confirm::new()
            .with_prompt("Reset all progress? This cannot be undone.")
            .default(false)
            .interact()
            .map_err(|e| GameError::configuration(format!("Reset confirmation error: {}", e)))?;

        if confirmed {
            self.reset_progress();
            self.display.show_success("Progress reset.")?;
        } else {
            self.display.show_message("Reset cancelled.", "info")?;
        }

        self.display.wait_for_enter()?;
        Ok(())
    }

    pub fn reset_progress(&mut self) {
        self.engine.abandon();
        self.progress.reset();
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

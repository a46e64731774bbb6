use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_THEME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: HashMap<String, ColorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    pub foreground: Option<String>,
    pub style: Vec<String>,
}

impl ColorConfig {
    fn new(foreground: &str, style: &[&str]) -> Self {
        Self {
            foreground: Some(foreground.to_string()),
            style: style.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    current_theme: String,
}

impl ThemeManager {
    pub fn new() -> Self {
        let mut manager = Self {
            themes: HashMap::new(),
            current_theme: DEFAULT_THEME.to_string(),
        };

        manager.load_default_themes();
        manager
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        if self.themes.contains_key(theme_name) {
            self.current_theme = theme_name.to_string();
            true
        } else {
            false
        }
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme
    }

    /// Looks the style up in the current theme, then in the default theme.
    fn lookup(&self, style_name: &str) -> Option<&ColorConfig> {
        self.themes
            .get(&self.current_theme)
            .and_then(|theme| theme.colors.get(style_name))
            .or_else(|| {
                self.themes
                    .get(DEFAULT_THEME)
                    .and_then(|theme| theme.colors.get(style_name))
            })
    }

    pub fn apply_style(&self, text: &str, style_name: &str) -> String {
        let Some(color_config) = self.lookup(style_name) else {
            return text.to_string();
        };

        let mut styled = text.normal();
        if let Some(color) = color_config.foreground.as_deref().and_then(parse_color) {
            styled = styled.color(color);
        }
        for style in &color_config.style {
            styled = match style.as_str() {
                "bold" => styled.bold(),
                "italic" => styled.italic(),
                "underline" => styled.underline(),
                "dimmed" => styled.dimmed(),
                _ => styled,
            };
        }
        styled.to_string()
    }

    pub fn list_themes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }

    fn insert_theme(&mut self, name: &str, colors: &[(&str, ColorConfig)]) {
        let colors = colors
            .iter()
            .map(|(key, config)| (key.to_string(), config.clone()))
            .collect();
        self.themes.insert(
            name.to_string(),
            Theme {
                name: name.to_string(),
                colors,
            },
        );
    }

    fn load_default_themes(&mut self) {
        self.insert_theme(
            DEFAULT_THEME,
            &[
                ("title", ColorConfig::new("cyan", &["bold"])),
                ("heading", ColorConfig::new("blue", &["bold"])),
                ("word", ColorConfig::new("white", &["bold"])),
                ("phonetic", ColorConfig::new("bright_black", &["italic"])),
                ("option", ColorConfig::new("green", &[])),
                ("level", ColorConfig::new("green", &[])),
                ("level_locked", ColorConfig::new("bright_black", &["dimmed"])),
                ("stars", ColorConfig::new("yellow", &["bold"])),
                ("stats", ColorConfig::new("yellow", &[])),
                ("timer", ColorConfig::new("cyan", &["bold"])),
                ("timer_low", ColorConfig::new("red", &["bold"])),
                ("error", ColorConfig::new("red", &["bold"])),
                ("success", ColorConfig::new("green", &["bold"])),
                ("warning", ColorConfig::new("yellow", &["bold"])),
                ("info", ColorConfig::new("blue", &[])),
                ("separator", ColorConfig::new("bright_black", &["dimmed"])),
            ],
        );

        self.insert_theme(
            "dark",
            &[
                ("title", ColorConfig::new("bright_cyan", &["bold"])),
                ("heading", ColorConfig::new("bright_blue", &["bold"])),
                ("word", ColorConfig::new("bright_white", &["bold"])),
                ("option", ColorConfig::new("bright_green", &[])),
                ("level", ColorConfig::new("bright_green", &[])),
                ("stars", ColorConfig::new("bright_yellow", &["bold"])),
                ("timer", ColorConfig::new("bright_cyan", &["bold"])),
                ("timer_low", ColorConfig::new("bright_red", &["bold"])),
            ],
        );

        self.insert_theme(
            "light",
            &[
                ("title", ColorConfig::new("blue", &["bold"])),
                ("heading", ColorConfig::new("magenta", &["bold"])),
                ("word", ColorConfig::new("black", &["bold"])),
                ("option", ColorConfig::new("blue", &[])),
                ("level", ColorConfig::new("blue", &[])),
            ],
        );
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_color(color_name: &str) -> Option<Color> {
    match color_name.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "bright_black" => Some(Color::BrightBlack),
        "bright_red" => Some(Color::BrightRed),
        "bright_green" => Some(Color::BrightGreen),
        "bright_yellow" => Some(Color::BrightYellow),
        "bright_blue" => Some(Color::BrightBlue),
        "bright_magenta" => Some(Color::BrightMagenta),
        "bright_cyan" => Some(Color::BrightCyan),
        "bright_white" => Some(Color::BrightWhite),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_manager_creation() {
        let manager = ThemeManager::new();
        assert_eq!(manager.current_theme_name(), DEFAULT_THEME);
        assert_eq!(manager.list_themes(), vec!["dark", "default", "light"]);
    }

    #[test]
    fn test_set_theme() {
        let mut manager = ThemeManager::new();

        assert!(manager.set_theme("dark"));
        assert_eq!(manager.current_theme_name(), "dark");

        assert!(!manager.set_theme("nonexistent"));
        assert_eq!(manager.current_theme_name(), "dark");
    }

    #[test]
    fn test_partial_theme_falls_back_to_default_styles() {
        let mut manager = ThemeManager::new();
        manager.set_theme("light");

        assert!(manager.lookup("timer_low").is_some());
        assert_eq!(manager.lookup("timer_low").and_then(|c| c.foreground.clone()), Some("red".to_string()));
    }

    #[test]
    fn test_apply_style() {
        colored::control::set_override(true);
        let manager = ThemeManager::new();

        let styled = manager.apply_style("Level 1", "title");
        assert!(styled.contains("Level 1"));
        assert_ne!(styled, "Level 1");

        assert_eq!(manager.apply_style("plain", "nonexistent"), "plain");
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("RED"), Some(Color::Red));
        assert_eq!(parse_color("bright_green"), Some(Color::BrightGreen));
        assert_eq!(parse_color("invalid"), None);
    }
}

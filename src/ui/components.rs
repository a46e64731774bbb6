use console::Term;
use std::io::{self, Write};

use crate::catalog::WordEntry;
use crate::core::{AnswerOption, AnswerResult, Level, LevelRecord, ProgressSummary, SessionProgress, SessionResult};
use crate::ui::ThemeManager;

/// Seconds left at which the timer switches to its warning style.
pub const LOW_TIME_SECS: u32 = 10;

pub struct Display {
    term: Term,
    theme_manager: ThemeManager,
    text_width: usize,
}

impl Display {
    pub fn new(theme_manager: ThemeManager, text_width: usize) -> io::Result<Self> {
        Ok(Self {
            term: Term::stdout(),
            theme_manager,
            text_width,
        })
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        self.term.clear_screen()
    }

    pub fn show_title(&self, title: &str) -> io::Result<()> {
        let styled_title = self.theme_manager.apply_style(title, "title");
        let border = "═".repeat(self.text_width);
        let styled_border = self.theme_manager.apply_style(&border, "separator");

        writeln!(io::stdout(), "{}", styled_title)?;
        writeln!(io::stdout(), "{}", styled_border)?;
        writeln!(io::stdout())?;
        Ok(())
    }

    /// Status line above each question: level, position, score and clock.
    pub fn show_session_header(&self, level_name: &str, progress: &SessionProgress) -> io::Result<()> {
        let heading = self.theme_manager.apply_style(level_name, "heading");
        let position = format!(
            "Word {}/{}",
            (progress.current_index + 1).min(progress.total_words),
            progress.total_words
        );
        let score = self
            .theme_manager
            .apply_style(&format!("Score: {}", progress.score), "stats");
        let timer = self.theme_manager.apply_style(
            &format!("⏱ {}", format_clock(progress.remaining_time)),
            timer_style(progress.remaining_time),
        );

        writeln!(io::stdout(), "{}  │  {}  │  {}  │  {}", heading, position, score, timer)?;
        self.show_separator()
    }

    pub fn show_word(&self, word: &WordEntry) -> io::Result<()> {
        writeln!(io::stdout())?;
        let styled_word = self.theme_manager.apply_style(&format!("   {}", word.word), "word");
        writeln!(io::stdout(), "{}", styled_word)?;
        if !word.phonetic.is_empty() {
            let phonetic = self.theme_manager.apply_style(&format!("   {}", word.phonetic), "phonetic");
            writeln!(io::stdout(), "{}", phonetic)?;
        }
        writeln!(io::stdout())?;
        Ok(())
    }

    pub fn show_feedback(&self, result: &AnswerResult) -> io::Result<()> {
        if result.correct {
            self.show_success(&format!("Correct! +{}", result.points_awarded))
        } else {
            let answer = result
                .correct_word
                .as_ref()
                .map(|word| format!("{} ({})", word.word, word.translation))
                .unwrap_or_default();
            self.show_error(&format!("Wrong! The answer was {}", answer))
        }
    }

    pub fn show_result(&self, result: &SessionResult) -> io::Result<()> {
        self.show_message("🏁 Level finished", "heading")?;
        self.show_separator()?;
        self.show_message(&format!("Score:    {}", result.score), "stats")?;
        self.show_message(
            &format!(
                "Correct:  {}/{} ({}%)",
                result.correct_answers,
                result.total_words,
                result.accuracy()
            ),
            "stats",
        )?;
        self.show_message(&format!("Rating:   {}", star_string(result.stars)), "stars")?;
        self.show_separator()
    }

    pub fn show_summary(&self, summary: &ProgressSummary) -> io::Result<()> {
        self.show_message("📊 Statistics", "heading")?;
        self.show_separator()?;
        self.show_message(&format!("Total score:       {}", summary.total_score), "info")?;
        self.show_message(
            &format!(
                "Levels completed:  {}/{}",
                summary.completed_levels, summary.total_levels
            ),
            "info",
        )?;
        self.show_message(&format!("Stars earned:      {}", summary.total_stars), "info")?;
        self.show_message(
            &format!(
                "Accuracy:          {}% over {} answer(s)",
                summary.accuracy, summary.total_attempts
            ),
            "info",
        )?;
        self.show_separator()
    }

    pub fn show_message(&self, message: &str, style: &str) -> io::Result<()> {
        let styled_message = self.theme_manager.apply_style(message, style);
        writeln!(io::stdout(), "{}", styled_message)?;
        Ok(())
    }

    pub fn show_error(&self, error: &str) -> io::Result<()> {
        self.show_message(&format!("❌ {}", error), "error")
    }

    pub fn show_success(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("✅ {}", message), "success")
    }

    pub fn show_warning(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("⚠️ {}", message), "warning")
    }

    pub fn show_separator(&self) -> io::Result<()> {
        let separator = "━".repeat(self.text_width);
        let styled = self.theme_manager.apply_style(&separator, "separator");
        writeln!(io::stdout(), "{}", styled)?;
        Ok(())
    }

    /// Terminal bell, the only sound a console can make.
    pub fn beep(&self) -> io::Result<()> {
        self.term.write_str("\u{7}")
    }

    pub fn wait_for_enter(&self) -> io::Result<()> {
        let styled_prompt = self.theme_manager.apply_style("Press Enter to continue...", "info");
        print!("{}", styled_prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(())
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        self.theme_manager.set_theme(theme_name)
    }

    pub fn get_available_themes(&self) -> Vec<String> {
        self.theme_manager.list_themes()
    }
}

/// Filled stars for the rating, hollow ones up to three.
pub fn star_string(stars: u8) -> String {
    let filled = usize::from(stars.min(3));
    format!("{}{}", "★".repeat(filled), "☆".repeat(3 - filled))
}

pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn timer_style(remaining: u32) -> &'static str {
    if remaining <= LOW_TIME_SECS {
        "timer_low"
    } else {
        "timer"
    }
}

/// One row of the level picker.
pub fn level_label(level: &Level, record: Option<&LevelRecord>) -> String {
    let stars = star_string(record.map_or(0, |r| r.stars));
    let lock = if level.unlocked { "  " } else { "🔒" };
    format!(
        "{} {:>2}. {} ({} words) {}",
        lock,
        level.id,
        level.display_name(),
        level.word_count(),
        stars
    )
}

/// Options are pictures; in the terminal a picture is its meaning plus file name.
pub fn option_label(index: usize, option: &AnswerOption) -> String {
    let picture = option.word.image.as_deref().unwrap_or("no image");
    let meaning = if option.word.translation.is_empty() {
        "?"
    } else {
        option.word.translation.as_str()
    };
    format!("{}. 🖼  {} [{}]", index + 1, meaning, picture)
}

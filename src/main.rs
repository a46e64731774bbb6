use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use word_match_game::config::CliConfig;
use word_match_game::{Config, GameInterface, VERSION};

const DEFAULT_CONFIG_FILE: &str = "word-game.toml";

#[derive(Parser)]
#[command(name = "word-game")]
#[command(about = "Match words to pictures against the clock")]
#[command(version = VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Word catalog to load instead of the configured one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory for saved progress and settings
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Level to play straight away
    #[arg(short, long)]
    level: Option<u32>,

    /// Clear saved progress before starting
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = Config::load(Some(&config_path))?;
    config.merge_with_cli(CliConfig {
        catalog_file: cli.catalog.clone(),
        data_dir: cli.data_dir.clone(),
        debug: cli.debug,
        ..Default::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(format!("word_match_game={},warn", config.logging.level))
        .init();

    info!("Starting Word Match v{}", VERSION);

    let mut game_interface = GameInterface::new(config).await?;
    game_interface.load_catalog_with_retry().await?;

    if cli.reset {
        info!("Resetting progress on request");
        game_interface.reset_progress();
    }

    if let Some(level_id) = cli.level {
        info!("Playing level {} directly", level_id);
        game_interface.play_level(level_id).await?;
    }

    if let Err(e) = game_interface.run().await {
        error!("Game error: {}", e);
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }

    info!("Game session ended");
    Ok(())
}

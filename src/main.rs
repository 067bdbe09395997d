//! NBA Win Probability CLI
//!
//! Reconstructs game states from play-by-play CSV logs, trains the win
//! probability model, and replays stored games through it.

use clap::{Parser, Subcommand};
use hoops::{Config, Result};

#[derive(Parser)]
#[command(name = "hoops")]
#[command(about = "NBA win probability from play-by-play logs", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct game states from a play-by-play CSV and store them
    Ingest {
        /// Path to the play-by-play CSV file
        csv: String,
    },
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Train the win-probability model
    Train {
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Override learning rate
        #[arg(long)]
        lr: Option<f64>,
    },
    /// Predict from a single game state
    Predict {
        /// Score margin (home minus away)
        #[arg(allow_negative_numbers = true)]
        margin: f32,
        /// True seconds remaining in regulation
        seconds: f32,
    },
    /// Replay a stored game through the model
    Replay {
        /// Game identifier
        game_id: String,
        /// Sample every Nth state
        #[arg(long, default_value = "5")]
        stride: usize,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Show database status
    Status,
    /// List stored games
    Games {
        /// Maximum games to list
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Ingest { csv } => commands::ingest(&config, &csv),
        Commands::Data { action } => match action {
            DataCommands::Status => commands::data_status(&config),
            DataCommands::Games { limit } => commands::data_games(&config, limit),
        },
        Commands::Train { epochs, lr } => commands::train(&config, epochs, lr),
        Commands::Predict { margin, seconds } => commands::predict(&config, margin, seconds),
        Commands::Replay {
            game_id,
            stride,
            format,
        } => commands::replay(&config, &game_id, stride, format),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;
    use hoops::data::database::WriteOptions;
    use hoops::data::{pbp, Database, StateDataset};
    use hoops::ingest;
    use hoops::predict::{replay, Predictor};
    use hoops::training::Trainer;
    use std::time::Duration;

    type Backend = NdArray<f32>;
    type AutodiffBackend = Autodiff<Backend>;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'hoops ingest <pbp.csv>' to reconstruct game states");
        println!("  3. Run 'hoops train' to train the model");
        println!("  4. Run 'hoops replay <game-id>' to watch a probability curve");

        Ok(())
    }

    pub fn ingest(config: &Config, csv: &str) -> Result<()> {
        println!("Reading play-by-play from {}...", csv);
        let loaded = pbp::read_events(csv)?;
        println!("Loaded {} events ({} rows skipped)", loaded.events.len(), loaded.skipped);

        println!("Reconstructing game states...");
        let output = ingest::build_game_states(loaded.events);
        println!("  {}", output.report);

        let mut db = Database::open(&config.data.database_path)?;
        let options = WriteOptions {
            chunk_size: config.ingest.chunk_size,
            attempts: config.ingest.write_attempts,
            retry_delay: Duration::from_millis(config.ingest.retry_delay_ms),
        };

        println!("Writing {} rows to {}...", output.states.len(), config.data.database_path);
        let written = db.replace_all(&output.states, options)?;
        println!("Done: {} rows stored across {} games", written, output.report.games);

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:    {}", config.data.database_path);
        println!("  Games:   {}", stats.game_count);
        println!("  States:  {}", stats.state_count);

        Ok(())
    }

    pub fn data_games(config: &Config, limit: usize) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let games = db.list_games(limit)?;

        if games.is_empty() {
            println!("No games stored. Run 'hoops ingest <pbp.csv>' first.");
            return Ok(());
        }

        for game in games {
            println!(
                "{}: {} vs {}",
                game.game_id,
                hoops::ingest::teams::display_name(game.home_team, "Home"),
                hoops::ingest::teams::display_name(game.away_team, "Away"),
            );
        }

        Ok(())
    }

    pub fn train(config: &Config, epochs: Option<usize>, lr: Option<f64>) -> Result<()> {
        let epochs = epochs.unwrap_or(config.training.epochs);
        let lr = lr.unwrap_or(config.training.learning_rate);

        println!("Initializing training...");

        let db = Database::open(&config.data.database_path)?;
        let rows = db.training_rows()?;
        if rows.is_empty() {
            return Err(hoops::HoopsError::Config(
                "No game states in database. Run 'hoops ingest' first.".to_string(),
            ));
        }
        println!("Loaded {} game states from database", rows.len());

        let (train_rows, val_rows) =
            StateDataset::split_rows_by_game(rows, config.training.train_ratio);
        let train_dataset = StateDataset::from_rows(&train_rows);
        let val_dataset = StateDataset::with_norm(&val_rows, train_dataset.norm.clone());
        println!("  {} training samples", train_dataset.len());
        println!("  {} validation samples", val_dataset.len());

        if train_dataset.is_empty() || val_dataset.is_empty() {
            return Err(hoops::HoopsError::Config(
                "Not enough games for a train/validation split.".to_string(),
            ));
        }

        let norm = train_dataset.norm.clone();
        let device = Default::default();
        let trainer = Trainer::<AutodiffBackend>::new(device, lr);

        println!("\nStarting training ({} epochs, lr {})...\n", epochs, lr);
        let (model, history) =
            trainer.train(train_dataset, val_dataset, epochs, config.training.early_stopping_patience)?;

        println!("\nSaving model to {}...", config.data.model_path);
        if let Some(parent) = std::path::Path::new(&config.data.model_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        model.save(&config.data.model_path)?;

        println!("\nTraining complete!");
        println!("  Best epoch:     {}", history.best_epoch + 1);
        println!("  Best val loss:  {:.4}", history.best_val_loss);
        println!(
            "  Final accuracy: {:.1}%",
            history.val_accuracies.last().unwrap_or(&0.0) * 100.0
        );

        // The classic sanity check: up 20 with two minutes left.
        let model = model.valid();
        let predictor = Predictor::new(model, norm, Default::default());
        println!(
            "  P(win | +20, 2:00 left): {:.1}%",
            predictor.win_probability(20.0, 120.0) * 100.0
        );

        Ok(())
    }

    pub fn predict(config: &Config, margin: f32, seconds: f32) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let device = Default::default();
        let predictor = Predictor::<Backend>::load(&db, &config.data.model_path, device)?;

        let prob = predictor.win_probability(margin, seconds);
        println!(
            "P(home win | margin {:+}, {} remaining) = {:.1}%",
            margin,
            hoops::ingest::clock::format_time_label(seconds.max(0.0) as u32),
            prob * 100.0
        );

        Ok(())
    }

    pub fn replay(
        config: &Config,
        game_id: &str,
        stride: usize,
        format: OutputFormat,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let states = db.game_states(game_id)?;
        if states.is_empty() {
            return Err(hoops::HoopsError::UnknownGame(game_id.to_string()));
        }

        let device = Default::default();
        let predictor = Predictor::<Backend>::load(&db, &config.data.model_path, device)?;
        let points = replay::replay_game(&states, &predictor, stride);

        let home = states[0].home_team;
        let away = states[0].away_team;

        match format {
            OutputFormat::Table => {
                print!("{}", replay::format_replay(&points, home, away));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&points).unwrap_or_default());
            }
            OutputFormat::Csv => {
                println!("elapsed_min,label,home_score,away_score,probability");
                for p in &points {
                    println!(
                        "{:.2},{},{},{},{:.4}",
                        p.elapsed_min, p.label, p.home_score, p.away_score, p.probability
                    );
                }
            }
        }

        Ok(())
    }
}

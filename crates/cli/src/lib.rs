pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cabby_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "cabby",
    about = "Compare ride fares across providers and book the cheapest",
    long_about = "Parse a free-text ride request, fetch quotes from every configured \
                  provider concurrently, rank them by price, and optionally book the winner.",
    after_help = "Examples:\n  cabby extract \"Go to airport as rickshaw\"\n  cabby compare --simulate \"3 people need premium car to airport\"\n  cabby book --simulate --yes \"go to station under ₹200\""
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a cabby.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Extract structured ride preferences from free text")]
    Extract { text: String },
    #[command(about = "Fetch quotes from all configured providers and rank them by price")]
    Compare {
        text: String,
        #[arg(long, help = "Pickup location (defaults to the current location)")]
        pickup: Option<String>,
        #[arg(long, help = "Use the built-in simulated automation backend")]
        simulate: bool,
    },
    #[command(about = "Compare quotes and book the cheapest eligible one")]
    Book {
        text: String,
        #[arg(long, help = "Pickup location (defaults to the current location)")]
        pickup: Option<String>,
        #[arg(long, help = "Use the built-in simulated automation backend")]
        simulate: bool,
        #[arg(long, help = "Confirm the booking; without this flag only the comparison runs")]
        yes: bool,
    },
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            let result =
                commands::CommandResult::failure("config", "configuration", error.to_string(), 2);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    init_logging(&config);

    let result = match cli.command {
        Command::Extract { text } => commands::extract::run(&text),
        Command::Compare { text, pickup, simulate } => {
            commands::compare::run(&config, &text, pickup.as_deref(), simulate)
        }
        Command::Book { text, pickup, simulate, yes } => {
            commands::book::run(&config, &text, pickup.as_deref(), simulate, yes)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hc")]
#[command(about = "hourcast: exchange calendar and hourly forecast slots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Print the day class and trading window for a date
    Classify {
        /// YYYY-MM-DD, exchange-local
        #[arg(long)]
        date: String,

        /// Layered config paths in merge order (falls back to HC_CONFIG)
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Place values onto consecutive trading hours and print JSON slots
    Allocate {
        /// Last known timestamp: 'YYYY-MM-DD HH:MM:SS' (exchange-local) or RFC 3339
        #[arg(long)]
        anchor: String,

        /// Start from the hour after the anchor instead of the anchor's own hour
        #[arg(long = "next-hour", default_value_t = false)]
        next_hour: bool,

        /// Comma-separated values, e.g. 1.5,2.0,2.25
        #[arg(long, conflicts_with = "values_file")]
        values: Option<String>,

        /// Path to a JSON array of numbers
        #[arg(long = "values-file", conflicts_with = "values")]
        values_file: Option<String>,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Build the model input from an ISS candles payload
    Prepare {
        /// Path to an ISS `{"candles": {...}}` JSON document
        #[arg(long)]
        candles: String,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Map model predictions onto trading slots after the candle history
    Forecast {
        #[arg(long)]
        candles: String,

        /// Path to a JSON array of predicted closes
        #[arg(long)]
        predictions: String,

        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

fn init_tracing() {
    // stdout carries command output; logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = hc_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Classify { date, config_paths } => {
            let cfg = commands::load_config(&config_paths)?;
            commands::schedule::classify(&cfg, &date)?;
        }

        Commands::Allocate {
            anchor,
            next_hour,
            values,
            values_file,
            config_paths,
        } => {
            let cfg = commands::load_config(&config_paths)?;
            let values = commands::load_values(values, values_file)?;
            commands::schedule::allocate(&cfg, &anchor, next_hour, &values)?;
        }

        Commands::Prepare {
            candles,
            config_paths,
        } => {
            let cfg = commands::load_config(&config_paths)?;
            commands::forecast::prepare(&cfg, &candles)?;
        }

        Commands::Forecast {
            candles,
            predictions,
            config_paths,
        } => {
            let cfg = commands::load_config(&config_paths)?;
            commands::forecast::forecast(&cfg, &candles, &predictions)?;
        }
    }

    Ok(())
}

//! Main entry point for the grimoire rating tool
//!
//! Loads a game log, solves the skill model and prints the evidence,
//! calibration figures and the rating table.

use anyhow::Result;
use clap::Parser;
use grimoire::config::{AppConfig, UnknownPlayerPolicy};
use grimoire::{FileGameSource, GameSource, RatingService};
use std::path::PathBuf;
use tracing::{error, info};

/// Grimoire - Expectation Propagation skill ratings for good-vs-evil games
#[derive(Parser)]
#[command(
    name = "grimoire",
    version,
    about = "Skill ratings and model evidence for good-vs-evil social deduction games",
    long_about = "Grimoire rates every player in a log of good-vs-evil team games with \
                 Expectation Propagation, and reports the model evidence, predictive \
                 likelihood and accuracy so that modelling choices can be compared."
)]
struct Args {
    /// Game log path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to the game log (JSON, TOML or YAML)"
    )]
    games: Option<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Unknown player policy override
    #[arg(
        long,
        value_name = "POLICY",
        help = "How unknown players are modelled (shared, fixed-zero, independent)"
    )]
    unknown_policy: Option<String>,

    /// Iteration cap override
    #[arg(long, value_name = "N", help = "Override the maximum number of EP sweeps")]
    max_iterations: Option<usize>,

    /// Print the report as JSON
    #[arg(long, help = "Print the report as JSON instead of text")]
    json: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without rating")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display the effective configuration
fn display_startup_banner(config: &AppConfig) {
    info!("Grimoire skill ratings v{}", grimoire::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Noise variance: {}", config.model.noise_variance);
    info!("   Unknown players: {}", config.model.unknown_player_policy);
    info!("   Min appearances: {}", config.model.min_appearances);
    info!(
        "   Max iterations: {} (tolerance {:e}, damping {})",
        config.solver.max_iterations, config.solver.tolerance, config.solver.damping
    );
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(policy) = &args.unknown_policy {
        config.model.unknown_player_policy = UnknownPlayerPolicy::parse(policy)
            .ok_or_else(|| anyhow::anyhow!("Unknown player policy {:?}", policy))?;
    }

    if let Some(max_iterations) = args.max_iterations {
        config.solver.max_iterations = max_iterations;
    }

    grimoire::config::validate_config(&config)?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Dry run completed - configuration is valid");
        return Ok(());
    }

    let Some(games_path) = &args.games else {
        error!("No game log given (use --games FILE)");
        std::process::exit(2);
    };

    let service = RatingService::new(&config)?;
    let source = FileGameSource::new(games_path)?;
    let run = match service.run(&source) {
        Ok(run) => run,
        Err(e) => {
            error!("Rating {} failed: {:#}", source.describe(), e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        print!("{}", run.report);
    }

    Ok(())
}

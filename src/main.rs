//! # Stairwell Command Line
//!
//! Generates a single dungeon level and prints it as ASCII or JSON.

use clap::Parser;
use log::{error, info};
use stairwell::{DungeonGenerator, GeneratedLevel, GenerationConfig, StairwellResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "stairwell")]
#[command(about = "Generates a connected dungeon level with linked stairs and a critical path")]
#[command(version)]
struct Args {
    /// Random seed for generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width in cells
    #[arg(long)]
    cols: Option<u32>,

    /// Map height in cells
    #[arg(long)]
    rows: Option<u32>,

    /// JSON configuration file; command line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum length of the path between the stairs
    #[arg(long)]
    min_path_len: Option<usize>,

    /// Skip the connectivity check
    #[arg(long)]
    no_verify: bool,

    /// Print the generated level as JSON
    #[arg(long)]
    json: bool,

    /// Draw the critical path on the map
    #[arg(long)]
    show_path: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> StairwellResult<()> {
    let config = build_config(args)?;
    info!(
        "Generating {}x{} level with seed {}",
        config.cols, config.rows, config.seed
    );

    let generated = stairwell::generation::generate_level(&config)?;
    let generator = DungeonGenerator::new();
    stairwell::Generator::validate(&generator, &generated, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&generated)?);
    } else {
        print_level(&generated, args.show_path);
    }
    Ok(())
}

/// Loads the configuration file, if any, and applies command line overrides.
fn build_config(args: &Args) -> StairwellResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(min_path_len) = args.min_path_len {
        config.min_path_len = min_path_len;
    }
    if args.no_verify {
        config.verify_connectivity = false;
    }
    Ok(config)
}

fn print_level(generated: &GeneratedLevel, show_path: bool) {
    let level = &generated.level;
    if show_path {
        print!("{}", level.to_ascii_with_path(&generated.critical_path));
    } else {
        print!("{}", level.to_ascii());
    }

    println!();
    println!("rooms:         {}", level.rooms.len());
    println!(
        "big rooms:     {}",
        generated
            .big_rooms
            .iter()
            .map(|big| format!("{:?}", big.kind))
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(theme) = generated.theme {
        println!("splash:        {:?}", theme);
    }
    println!("up stairs:     {}", generated.start_point);
    println!("down stairs:   {}", generated.end_point);
    println!("critical path: {}", generated.critical_path.len());
    println!("dead ends:     {:?}", generated.terms);
    println!("hazards:       {}", level.hazards.len());
    println!("attempts:      {}", generated.attempts);
}

/// Initializes logging at the given level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_timestamp(None)
            .init();
    }
}

#![deny(unsafe_code)]
//! CLI binary for the vector-field animations.
//!
//! Subcommands:
//! - `render <engine>`: simulate N frames offline, write a PNG
//! - `replay <seed.json>`: re-render a saved seed
//! - `list`: print available engines and wave presets
//! - `sample`: print the noise value and curl at one point

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vector_field_core::field_source::DEFAULT_CURL_EPS;
use vector_field_core::{curl_2d, NoiseField, Seed};
use vector_field_engines::{draw_frame, simulate, EngineKind};
use vector_field_waves::WavePreset;

#[derive(Parser)]
#[command(name = "vector-field", about = "Vector-field and wave animation CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` wins if set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate an engine for N frames and write a PNG snapshot.
    Render {
        /// Engine name (e.g. "vector-field").
        engine: String,

        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: usize,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: usize,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 600)]
        frames: usize,

        /// Simulated frame rate.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Pointer held at `x,y` for every frame.
        #[arg(long, value_parser = parse_pointer)]
        pointer: Option<[f64; 2]>,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Also write the seed as JSON, for `replay`.
        #[arg(long)]
        save_seed: Option<PathBuf>,
    },
    /// Re-render a seed file written by `render --save-seed`.
    Replay {
        /// Path to the seed JSON.
        seed_file: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List available engines and wave presets.
    List,
    /// Sample the seeded simplex noise and its curl at one point.
    Sample {
        /// Noise seed.
        #[arg(long, default_value_t = 42)]
        seed: i32,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,

        /// Third axis; the particle field uses it as time.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        z: f64,
    },
}

/// Parses `x,y` into a canvas position.
fn parse_pointer(raw: &str) -> Result<[f64; 2], String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{raw}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("'{}' is not a finite number", s.trim()))
    };
    Ok([parse(x)?, parse(y)?])
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second install (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_seed(path: &Path) -> Result<Seed, CliError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Input(format!("invalid seed file {}: {e}", path.display())))
}

/// Simulates a seed and writes its final frame.
fn render_seed(seed: &Seed, output: &Path) -> Result<(), CliError> {
    let engine = simulate(seed)?;
    let list = draw_frame(&engine, seed.width as f64, seed.height as f64);
    debug!(commands = list.len(), "frame collected");
    vector_field_engines::snapshot::render_png(&list, seed.width, seed.height, output)?;
    info!(engine = seed.engine.as_str(), output = %output.display(), "rendered");
    Ok(())
}

fn report(json: bool, seed: &Seed, output: &Path) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "seed": seed,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} frames at {} fps, seed {}) -> {}",
            seed.engine,
            seed.width,
            seed.height,
            seed.frames,
            seed.fps,
            seed.seed,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let presets: Vec<&str> = WavePreset::ALL.iter().map(|p| p.name()).collect();
            if cli.json {
                let info = serde_json::json!({
                    "engines": engines,
                    "presets": presets,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Wave presets:");
                println!("  {}", presets.join(", "));
            }
        }
        Command::Render {
            engine,
            width,
            height,
            frames,
            fps,
            seed,
            params,
            pointer,
            output,
            save_seed,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;

            let mut job = Seed::new(&engine, width, height, seed);
            job.params = params;
            job.frames = frames;
            job.fps = fps;
            job.pointer = pointer;

            render_seed(&job, &output)?;
            if let Some(path) = save_seed {
                std::fs::write(&path, serde_json::to_string_pretty(&job)?)?;
                debug!(path = %path.display(), "seed saved");
            }
            report(cli.json, &job, &output)?;
        }
        Command::Replay { seed_file, output } => {
            let job = read_seed(&seed_file)?;
            render_seed(&job, &output)?;
            report(cli.json, &job, &output)?;
        }
        Command::Sample { seed, x, y, z } => {
            let field = NoiseField::new(seed);
            let value = field.sample(x, y, z);
            let (cx, cy) = curl_2d(&field, x, y, z, DEFAULT_CURL_EPS);
            if cli.json {
                let info = serde_json::json!({
                    "seed": field.seed(),
                    "point": [x, y, z],
                    "noise": value,
                    "curl": [cx, cy],
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("noise({x}, {y}, {z}) = {value:.6}");
                println!("curl = ({cx:.6}, {cy:.6})");
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

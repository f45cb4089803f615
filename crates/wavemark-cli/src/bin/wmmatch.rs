//! wmmatch - match a probe clip against the reference library
//!
//! Usage:
//!   wmmatch <input_audio_path> <store_dir>
//!   wmmatch --analyze --threshold 0.1 <input_audio_path> <store_dir>

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::Path;
use wavemark_cli::output::{print_json_report, TrackMatch};
use wavemark_core::{
    analyze_sampling, compare_fingerprints, fingerprint_file, WavemarkConfig,
};
use wavemark_store::FsStore;

#[derive(Parser, Debug)]
#[command(name = "wmmatch")]
#[command(about = "Match an audio clip against stored fingerprints", long_about = None)]
struct Args {
    /// Probe audio file (wav, mp3, flac, ogg, m4a)
    input_audio_path: String,

    /// Fingerprint store directory
    store_dir: String,

    /// Confidence threshold override
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Classify confirmed matches as exact/sampled/referenced
    #[arg(short, long)]
    analyze: bool,

    /// Path to configuration file (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Off
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = match &args.config {
        Some(path) => WavemarkConfig::load(Path::new(path))?,
        None => WavemarkConfig::default(),
    };

    run_match(&args, &config)
}

fn run_match(args: &Args, config: &WavemarkConfig) -> Result<()> {
    let input_path = Path::new(&args.input_audio_path);
    let threshold = args
        .threshold
        .unwrap_or(config.matching.confidence_threshold);

    log::info!("Fingerprinting probe: {}", input_path.display());
    let probe = fingerprint_file(input_path, &config.fingerprint)
        .with_context(|| format!("Failed to fingerprint {}", input_path.display()))?;
    log::info!("Probe has {} hash triples", probe.len());

    let store = FsStore::open(Path::new(&args.store_dir))
        .with_context(|| format!("Failed to open store at {}", args.store_dir))?;

    let load_start = std::time::Instant::now();
    let library = store.load_all()?;
    log::info!(
        "Loaded {} stored fingerprints in {:.2}s",
        library.len(),
        load_start.elapsed().as_secs_f64()
    );

    // Embarrassingly parallel fan-out: one comparison per stored track
    let match_start = std::time::Instant::now();
    let frame_period = config.fingerprint.frame_period_s();

    let mut results: Vec<TrackMatch> = library
        .par_iter()
        .filter_map(|(key, stored)| {
            let outcome = compare_fingerprints(&probe, stored, threshold);
            if !outcome.matched {
                return None;
            }

            let sampling = if args.analyze {
                analyze_sampling(&probe, stored, key, &config.fingerprint)
            } else {
                None
            };

            Some(TrackMatch {
                track_key: key.clone(),
                confidence: outcome.confidence,
                offset_s: outcome.best_offset.map(|o| o as f64 * frame_period),
                sampling,
            })
        })
        .collect();

    log::info!(
        "Compared against {} tracks in {:.2}s, {} matched",
        library.len(),
        match_start.elapsed().as_secs_f64(),
        results.len()
    );

    print_json_report(&args.input_audio_path, &mut results);

    Ok(())
}

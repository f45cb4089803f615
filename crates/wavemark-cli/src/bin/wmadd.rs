//! wmadd - enroll a reference track
//!
//! Usage: wmadd <input_audio_path> <store_dir>

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use wavemark_core::{fingerprint_waveform, WavemarkConfig};
use wavemark_store::{content_key, FingerprintStore, FsStore, TrackInfo};

#[derive(Parser, Debug)]
#[command(name = "wmadd")]
#[command(about = "Fingerprint an audio file and add it to the reference library", long_about = None)]
struct Args {
    /// Input audio file (wav, mp3, flac, ogg, m4a)
    input_audio_path: String,

    /// Fingerprint store directory
    store_dir: String,

    /// Path to configuration file (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs (clean JSON output for parsing)
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

    run_add(&args.input_audio_path, &args.store_dir, &config)
}

fn run_add(input_path: &str, store_dir: &str, config: &WavemarkConfig) -> Result<()> {
    let input_path = Path::new(input_path);
    let fp_config = &config.fingerprint;

    let start = std::time::Instant::now();

    // Decode once; fingerprint and content key both come from the
    // canonical waveform
    let audio = wavemark_core::audio::decode_audio(input_path, fp_config.sample_rate)
        .with_context(|| format!("Failed to decode {}", input_path.display()))?;

    if audio.duration_s() > fp_config.max_duration_s {
        anyhow::bail!(
            "audio duration {:.1}s exceeds limit of {:.1}s",
            audio.duration_s(),
            fp_config.max_duration_s
        );
    }

    log::info!(
        "Decoded {}: {:.1}s, {} samples @ {}Hz",
        input_path.display(),
        audio.duration_s(),
        audio.samples.len(),
        audio.sample_rate
    );

    let fingerprint = fingerprint_waveform(&audio.samples, fp_config);
    let key = content_key(&audio.samples);

    log::info!(
        "Generated {} hash triples in {:.2}s",
        fingerprint.len(),
        start.elapsed().as_secs_f64()
    );

    let store = FsStore::open(Path::new(store_dir))
        .with_context(|| format!("Failed to open store at {}", store_dir))?;

    let info = TrackInfo {
        source_filename: input_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string(),
        sample_rate: audio.sample_rate,
        duration_ms: audio.duration_ms,
    };
    store.put(&key, &fingerprint, &info)?;

    let result = serde_json::json!({
        "status": "success",
        "input_file": input_path.display().to_string(),
        "track_key": key,
        "num_triples": fingerprint.len(),
        "duration_ms": audio.duration_ms,
        "processing_time_seconds": start.elapsed().as_secs_f64(),
    });
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

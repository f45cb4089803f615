//! wavemark-core - constellation audio fingerprinting
//!
//! Turns decoded audio into a compact set of landmark hash triples and
//! compares such fingerprints to decide identity, partial sampling, or no
//! relation.

pub mod audio;
pub mod config;
pub mod error;
pub mod hashing;
pub mod matching;
pub mod peaks;
pub mod sampling;
pub mod spectrogram;

pub use config::{FingerprintConfig, MatchConfig, WavemarkConfig};
pub use error::FingerprintError;
pub use hashing::{Fingerprint, HashGenerator, HashTriple};
pub use matching::{compare_fingerprints, MatchOutcome};
pub use peaks::{Peak, PeakExtractor};
pub use sampling::{analyze_sampling, MatchType, SamplingMatch};
pub use spectrogram::Spectrogram;

use std::path::Path;

/// Fingerprint an audio file: decode and resample to the canonical
/// waveform, then run the spectrogram, peak and hashing stages.
pub fn fingerprint_file(
    path: &Path,
    config: &FingerprintConfig,
) -> Result<Fingerprint, FingerprintError> {
    let audio = audio::decode_audio(path, config.sample_rate)?;

    if audio.duration_s() > config.max_duration_s {
        return Err(FingerprintError::TooLong {
            actual_s: audio.duration_s(),
            limit_s: config.max_duration_s,
        });
    }

    Ok(fingerprint_waveform(&audio.samples, config))
}

/// Fingerprint an already-canonical mono waveform at the configured sample
/// rate. Silent or degenerate input yields an empty fingerprint, which the
/// matcher treats as a normal no-match.
pub fn fingerprint_waveform(samples: &[f32], config: &FingerprintConfig) -> Fingerprint {
    let spectrogram = spectrogram::compute_spectrogram(samples, config);
    let peaks = PeakExtractor::new(config).extract(&spectrogram);
    log::debug!(
        "{} frames, {} peaks from {} samples",
        spectrogram.num_frames,
        peaks.len(),
        samples.len()
    );
    HashGenerator::new(config).generate(&peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// A few seconds of structured, non-silent audio
    fn test_signal(duration_s: f32, config: &FingerprintConfig) -> Vec<f32> {
        let n = (duration_s * config.sample_rate as f32) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / config.sample_rate as f32;
                // Chirp plus a steady tone so the spectrogram has landmarks
                0.5 * (2.0 * PI * (200.0 + 150.0 * t) * t).sin()
                    + 0.3 * (2.0 * PI * 1200.0 * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let config = FingerprintConfig::default();
        let samples = test_signal(3.0, &config);

        let a = fingerprint_waveform(&samples, &config);
        let b = fingerprint_waveform(&samples, &config);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_self_match_end_to_end() {
        let config = FingerprintConfig::default();
        let samples = test_signal(3.0, &config);
        let fp = fingerprint_waveform(&samples, &config);

        let outcome = compare_fingerprints(&fp, &fp, 0.05);
        assert!(outcome.matched);
        assert_eq!(outcome.confidence, 1.0);
    }

    #[test]
    fn test_silence_yields_empty_fingerprint() {
        let config = FingerprintConfig::default();
        let silence = vec![0.0f32; 3 * config.sample_rate as usize];
        assert!(fingerprint_waveform(&silence, &config).is_empty());
    }

    #[test]
    fn test_triple_constraint_on_real_signal() {
        let config = FingerprintConfig::default();
        let fp = fingerprint_waveform(&test_signal(3.0, &config), &config);

        let max_delta = 2 * config.target_zone_size as i64;
        for t in &fp {
            let delta = t.target as i64 - t.anchor as i64;
            assert!(delta > 0 && delta <= max_delta);
        }
    }

    #[test]
    fn test_perturbed_copy_still_matches() {
        // Stand-in for the WAV-vs-reencoded-MP3 scenario: mild amplitude
        // scaling and additive noise must not break the offset histogram
        let config = FingerprintConfig::default();
        let samples = test_signal(5.0, &config);
        let stored = fingerprint_waveform(&samples, &config);

        let noisy: Vec<f32> = samples
            .iter()
            .enumerate()
            .map(|(i, &s)| s * 0.9 + 0.002 * ((i as f32 * 0.71).sin()))
            .collect();
        let probe = fingerprint_waveform(&noisy, &config);

        let outcome = compare_fingerprints(&probe, &stored, 0.05);
        assert!(
            outcome.matched,
            "confidence {} below threshold",
            outcome.confidence
        );
    }
}

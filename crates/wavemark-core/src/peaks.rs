//! Constellation peak extraction
//!
//! A peak is a spectrogram cell that equals the maximum of its 30x30
//! neighborhood and also clears an adaptive per-frequency-row threshold.
//! Peaks come out sorted by descending amplitude so downstream pairing is
//! deterministic.

use crate::config::FingerprintConfig;
use crate::spectrogram::Spectrogram;

/// A constellation landmark: a (frequency bin, time frame) coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    pub freq: usize,
    pub time: usize,
}

/// Peak extractor with a fixed neighborhood and threshold ratio
pub struct PeakExtractor {
    neighborhood_size: usize,
    threshold: f32,
}

impl PeakExtractor {
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            neighborhood_size: config.neighborhood_size,
            threshold: config.peak_threshold,
        }
    }

    /// Extract peaks ordered by descending amplitude.
    ///
    /// Ties keep their row-major (frequency, time) discovery order; the sort
    /// is stable, so repeated runs on an identical spectrogram produce an
    /// identical sequence.
    pub fn extract(&self, spectrogram: &Spectrogram) -> Vec<Peak> {
        if spectrogram.is_empty() {
            return Vec::new();
        }

        let local_max = self.max_filter(spectrogram);
        let row_thresholds = self.row_thresholds(spectrogram);

        let mut peaks = Vec::new();
        for f in 0..spectrogram.num_bins {
            for t in 0..spectrogram.num_frames {
                let v = spectrogram.at(f, t);
                if v == local_max[f][t] && v > row_thresholds[f] {
                    peaks.push(Peak { freq: f, time: t });
                }
            }
        }

        peaks.sort_by(|a, b| {
            spectrogram
                .at(b.freq, b.time)
                .total_cmp(&spectrogram.at(a.freq, a.time))
        });

        peaks
    }

    /// Separable 2D max filter; windows clamp at the borders, which for a
    /// max filter is equivalent to reflect-mode padding
    fn max_filter(&self, spectrogram: &Spectrogram) -> Vec<Vec<f32>> {
        let num_bins = spectrogram.num_bins;
        let num_frames = spectrogram.num_frames;
        let half = self.neighborhood_size / 2;
        let span = self.neighborhood_size - half;

        // Pass 1: maximum along time within each frequency row
        let mut time_filtered = vec![vec![0.0f32; num_frames]; num_bins];
        for f in 0..num_bins {
            for t in 0..num_frames {
                let lo = t.saturating_sub(half);
                let hi = (t + span).min(num_frames);
                time_filtered[f][t] = (lo..hi)
                    .map(|ti| spectrogram.at(f, ti))
                    .fold(f32::NEG_INFINITY, f32::max);
            }
        }

        // Pass 2: maximum along frequency within each time column
        let mut filtered = vec![vec![0.0f32; num_frames]; num_bins];
        for f in 0..num_bins {
            let lo = f.saturating_sub(half);
            let hi = (f + span).min(num_bins);
            for t in 0..num_frames {
                filtered[f][t] = (lo..hi)
                    .map(|fi| time_filtered[fi][t])
                    .fold(f32::NEG_INFINITY, f32::max);
            }
        }

        filtered
    }

    /// Adaptive threshold per frequency row: row mean scaled by the
    /// threshold ratio
    fn row_thresholds(&self, spectrogram: &Spectrogram) -> Vec<f32> {
        spectrogram
            .values
            .iter()
            .map(|row| {
                let mean = row.iter().sum::<f32>() / row.len() as f32;
                mean * self.threshold
            })
            .collect()
    }
}

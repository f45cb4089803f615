//! Spectrogram construction
//!
//! Turns a mono waveform into a normalized time-frequency energy surface:
//! pre-emphasis, Hann-windowed STFT, squared magnitude, log-power scaling
//! referenced to the maximum, min-max normalization to [0,1], and a light
//! Gaussian blur across both axes.

use crate::config::FingerprintConfig;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Normalized power spectrogram, indexed `values[freq_bin][frame]`
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub values: Vec<Vec<f32>>,
    pub num_bins: usize,
    pub num_frames: usize,
}

impl Spectrogram {
    /// Value at a (frequency bin, time frame) coordinate
    #[inline]
    pub fn at(&self, freq: usize, time: usize) -> f32 {
        self.values[freq][time]
    }

    pub fn is_empty(&self) -> bool {
        self.num_frames == 0
    }
}

/// Build the normalized spectrogram for a mono waveform.
///
/// Waveforms shorter than one analysis window produce an empty spectrogram,
/// which flows through the rest of the pipeline as a no-peak, no-hash
/// fingerprint.
pub fn compute_spectrogram(samples: &[f32], config: &FingerprintConfig) -> Spectrogram {
    let window_size = config.window_size;
    let hop_size = config.hop_size;
    let num_bins = window_size / 2;

    if samples.len() < window_size {
        return Spectrogram {
            values: vec![Vec::new(); num_bins],
            num_bins,
            num_frames: 0,
        };
    }

    let emphasized = pre_emphasize(samples, config.pre_emphasis);
    let num_frames = (emphasized.len() - window_size) / hop_size + 1;

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(window_size);
    let window = hann_window(window_size);

    let mut values = vec![vec![0.0f32; num_frames]; num_bins];
    let mut frame = vec![Complex::new(0.0f32, 0.0); window_size];

    for t in 0..num_frames {
        let start = t * hop_size;
        for (i, slot) in frame.iter_mut().enumerate() {
            *slot = Complex::new(emphasized[start + i] * window[i], 0.0);
        }

        fft.process(&mut frame);

        for (f, row) in values.iter_mut().enumerate() {
            row[t] = frame[f].norm_sqr();
        }
    }

    power_to_db(&mut values);
    normalize(&mut values);
    gaussian_smooth(&mut values, config.smoothing_sigma);

    Spectrogram {
        values,
        num_bins,
        num_frames,
    }
}

/// High-frequency boost: y[n] = x[n] - coefficient * x[n-1]
fn pre_emphasize(samples: &[f32], coefficient: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    let mut prev = 0.0f32;
    for &s in samples {
        out.push(s - coefficient * prev);
        prev = s;
    }
    out
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let x = i as f32 / (size - 1) as f32;
            0.5 * (1.0 - (2.0 * PI * x).cos())
        })
        .collect()
}

/// Convert power values to dB referenced to the global maximum
fn power_to_db(values: &mut [Vec<f32>]) {
    const AMIN: f32 = 1e-10;

    let max_power = values
        .iter()
        .flat_map(|row| row.iter().copied())
        .fold(AMIN, f32::max);

    let ref_db = 10.0 * max_power.log10();
    for row in values.iter_mut() {
        for v in row.iter_mut() {
            *v = 10.0 * v.max(AMIN).log10() - ref_db;
        }
    }
}

/// Min-max normalize to [0,1]; a flat surface becomes all zeros
fn normalize(values: &mut [Vec<f32>]) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for row in values.iter() {
        for &v in row {
            min = min.min(v);
            max = max.max(v);
        }
    }

    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        for row in values.iter_mut() {
            row.fill(0.0);
        }
        return;
    }

    for row in values.iter_mut() {
        for v in row.iter_mut() {
            *v = (*v - min) / range;
        }
    }
}

/// Separable Gaussian blur across frequency and time axes.
///
/// Kernel radius is 4 sigma; at the borders the kernel is truncated and
/// renormalized over the in-bounds taps.
fn gaussian_smooth(values: &mut [Vec<f32>], sigma: f32) {
    if sigma <= 0.0 || values.is_empty() || values[0].is_empty() {
        return;
    }

    let radius = (4.0 * sigma).ceil() as usize;
    let kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let num_bins = values.len();
    let num_frames = values[0].len();

    // Along time, per frequency row
    for row in values.iter_mut() {
        let blurred = convolve_1d(row, &kernel, radius);
        *row = blurred;
    }

    // Along frequency, per time column
    let mut column = vec![0.0f32; num_bins];
    for t in 0..num_frames {
        for (f, slot) in column.iter_mut().enumerate() {
            *slot = values[f][t];
        }
        let blurred = convolve_1d(&column, &kernel, radius);
        for (f, v) in blurred.into_iter().enumerate() {
            values[f][t] = v;
        }
    }
}

fn convolve_1d(data: &[f32], kernel: &[f32], radius: usize) -> Vec<f32> {
    let n = data.len();
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius + 1).min(n);
        let mut acc = 0.0f32;
        let mut weight = 0.0f32;
        for j in lo..hi {
            let k = kernel[j + radius - i];
            acc += data[j] * k;
            weight += k;
        }
        out.push(acc / weight);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tone(freq_hz: f32, duration_s: f32, sample_rate: u32) -> Vec<f32> {
        let n = (duration_s * sample_rate as f32) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_hann_window_shape() {
        let window = hann_window(512);
        assert_eq!(window.len(), 512);
        assert_relative_eq!(window[0], 0.0, epsilon = 1e-3);
        assert_relative_eq!(window[256], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_short_input_yields_empty_spectrogram() {
        let config = FingerprintConfig::default();
        let spec = compute_spectrogram(&[0.0; 100], &config);
        assert!(spec.is_empty());
        assert_eq!(spec.num_bins, 1024);
    }

    #[test]
    fn test_values_are_normalized() {
        let config = FingerprintConfig::default();
        let samples = tone(1000.0, 1.0, config.sample_rate);
        let spec = compute_spectrogram(&samples, &config);

        assert_eq!(spec.num_bins, 1024);
        assert!(spec.num_frames > 0);
        for row in &spec.values {
            for &v in row {
                assert!((0.0..=1.0).contains(&v), "value out of range: {}", v);
            }
        }
    }

    #[test]
    fn test_silence_is_flat_zero() {
        let config = FingerprintConfig::default();
        let spec = compute_spectrogram(&vec![0.0; 22050], &config);
        for row in &spec.values {
            for &v in row {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn test_tone_energy_near_expected_bin() {
        let config = FingerprintConfig::default();
        let samples = tone(1000.0, 1.0, config.sample_rate);
        let spec = compute_spectrogram(&samples, &config);

        // 1 kHz at 22050 Hz with 2048-point window lands near bin 93
        let expected_bin = (1000.0 * config.window_size as f32 / config.sample_rate as f32) as usize;
        let mid_frame = spec.num_frames / 2;

        let (peak_bin, _) = (0..spec.num_bins)
            .map(|f| (f, spec.at(f, mid_frame)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();

        assert!((peak_bin as i64 - expected_bin as i64).abs() <= 2);
    }

    #[test]
    fn test_determinism() {
        let config = FingerprintConfig::default();
        let samples = tone(440.0, 0.5, config.sample_rate);
        let a = compute_spectrogram(&samples, &config);
        let b = compute_spectrogram(&samples, &config);
        assert_eq!(a.values, b.values);
    }
}

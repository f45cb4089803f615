//! Configuration parameters for the fingerprinting pipeline
//!
//! The DSP parameters are fixed per deployment, not per call: changing any
//! of them invalidates every stored fingerprint.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fingerprinting pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    // Audio processing
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    #[serde(default = "default_pre_emphasis")]
    pub pre_emphasis: f32,
    #[serde(default = "default_smoothing_sigma")]
    pub smoothing_sigma: f32,

    // Peak extraction
    #[serde(default = "default_peak_threshold")]
    pub peak_threshold: f32,
    #[serde(default = "default_neighborhood_size")]
    pub neighborhood_size: usize,

    // Hash generation
    #[serde(default = "default_fan_out")]
    pub fan_out: usize,
    #[serde(default = "default_target_zone_size")]
    pub target_zone_size: u32,

    // Resource limit: reject uploads longer than this before the
    // O(duration) spectrogram work
    #[serde(default = "default_max_duration_s")]
    pub max_duration_s: f64,
}

fn default_sample_rate() -> u32 {
    22050
}
fn default_window_size() -> usize {
    2048
}
fn default_hop_size() -> usize {
    512
}
fn default_pre_emphasis() -> f32 {
    0.97
}
fn default_smoothing_sigma() -> f32 {
    1.0
}
fn default_peak_threshold() -> f32 {
    0.3
}
fn default_neighborhood_size() -> usize {
    30
}
fn default_fan_out() -> usize {
    15
}
fn default_target_zone_size() -> u32 {
    5
}
fn default_max_duration_s() -> f64 {
    600.0
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            window_size: default_window_size(),
            hop_size: default_hop_size(),
            pre_emphasis: default_pre_emphasis(),
            smoothing_sigma: default_smoothing_sigma(),
            peak_threshold: default_peak_threshold(),
            neighborhood_size: default_neighborhood_size(),
            fan_out: default_fan_out(),
            target_zone_size: default_target_zone_size(),
            max_duration_s: default_max_duration_s(),
        }
    }
}

impl FingerprintConfig {
    /// Seconds covered by one spectrogram frame hop
    pub fn frame_period_s(&self) -> f64 {
        self.hop_size as f64 / self.sample_rate as f64
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_rate == 0 {
            anyhow::bail!("sample_rate must be > 0");
        }
        if self.window_size == 0 || !self.window_size.is_power_of_two() {
            anyhow::bail!("window_size must be a power of two");
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            anyhow::bail!("hop_size must be in 1..=window_size");
        }
        if self.fan_out < 2 {
            anyhow::bail!("fan_out must be >= 2");
        }
        if self.max_duration_s <= 0.0 {
            anyhow::bail!("max_duration_s must be > 0");
        }
        Ok(())
    }
}

/// Matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum combined confidence to report a match. Deliberately low by
    /// default; tune per deployment.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_confidence_threshold() -> f64 {
    0.05
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WavemarkConfig {
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    #[serde(default)]
    pub matching: MatchConfig,
}

impl WavemarkConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: WavemarkConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.fingerprint.validate()?;
        Ok(config)
    }
}

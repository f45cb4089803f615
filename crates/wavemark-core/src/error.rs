//! Error types for decoding and fingerprinting

use thiserror::Error;

/// Errors produced while turning an audio file into a fingerprint.
///
/// An empty fingerprint (silent or near-silent input) is a normal no-match
/// outcome, not an error.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// File extension is not in the supported set; rejected before any
    /// decode attempt
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Corrupt or undecodable audio data
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// Input exceeds the configured duration cap
    #[error("audio duration {actual_s:.1}s exceeds limit of {limit_s:.1}s")]
    TooLong { actual_s: f64, limit_s: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FingerprintError {
    pub(crate) fn decode(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

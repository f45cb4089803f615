//! Content-hash keys for stored tracks
//!
//! The key is the SHA-256 digest of the canonical mono 16-bit PCM rendering
//! of the decoded waveform, so the same recording maps to the same key
//! regardless of which container it was uploaded in.

use sha2::{Digest, Sha256};

/// Derive the storage key for a canonical mono waveform
pub fn content_key(samples: &[f32]) -> String {
    let mut hasher = Sha256::new();
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        hasher.update(quantized.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable() {
        let samples = vec![0.0, 0.5, -0.5, 1.0];
        assert_eq!(content_key(&samples), content_key(&samples));
    }

    #[test]
    fn test_key_is_hex_sha256() {
        let key = content_key(&[0.1, 0.2]);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_audio_different_key() {
        assert_ne!(content_key(&[0.0, 0.1]), content_key(&[0.1, 0.0]));
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        assert_eq!(content_key(&[1.0, -1.0]), content_key(&[1.5, -2.0]));
    }
}

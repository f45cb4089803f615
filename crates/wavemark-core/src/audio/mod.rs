//! Audio decoding and resampling
//!
//! Supports WAV, MP3, FLAC, OGG Vorbis and M4A/AAC using pure Rust decoders.
//! Every decode ends in the same canonical shape: mono f32 samples at the
//! configured sample rate.

mod decoder;
mod resample;

pub use decoder::{decode_audio, AudioData};
pub use resample::resample_to_target;

use std::path::Path;

/// Supported container formats, detected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    M4a,
    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") => AudioFormat::Ogg,
            Some("m4a") | Some("mp4") => AudioFormat::M4a,
            _ => AudioFormat::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioFormat::from_path(Path::new("a.wav")), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_path(Path::new("a.MP3")), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_path(Path::new("a.m4a")), AudioFormat::M4a);
        assert_eq!(
            AudioFormat::from_path(Path::new("a.txt")),
            AudioFormat::Unknown
        );
        assert_eq!(
            AudioFormat::from_path(Path::new("noext")),
            AudioFormat::Unknown
        );
    }
}

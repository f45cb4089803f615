//! Versioned JSON record format for stored fingerprints
//!
//! All triple fields are integers end to end; JSON round-trips them
//! exactly, which the matcher depends on.

use serde::{Deserialize, Serialize};
use std::path::Path;
use wavemark_core::HashTriple;

/// Bump on any change to the record layout or the landmark hash function
pub const FORMAT_VERSION: &str = "1.0";

/// Complete on-disk fingerprint record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub version: String,
    pub metadata: RecordMetadata,
    pub triples: Vec<HashTriple>,
}

/// Metadata about the track the record was built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Content-hash key; also the record's filename stem
    pub track_key: String,
    pub source_filename: String,
    pub sample_rate: u32,
    pub duration_ms: u32,
    pub created_at: String,
}

/// Track facts supplied at enrollment time
#[derive(Debug, Clone)]
pub struct TrackInfo {
    pub source_filename: String,
    pub sample_rate: u32,
    pub duration_ms: u32,
}

impl FingerprintRecord {
    pub fn new(track_key: &str, triples: Vec<HashTriple>, info: &TrackInfo) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            metadata: RecordMetadata {
                track_key: track_key.to_string(),
                source_filename: info.source_filename.clone(),
                sample_rate: info.sample_rate,
                duration_ms: info.duration_ms,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            triples,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), crate::StoreError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, crate::StoreError> {
        let json = std::fs::read_to_string(path)?;
        let record: FingerprintRecord = serde_json::from_str(&json)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TrackInfo {
        TrackInfo {
            source_filename: "clip.wav".to_string(),
            sample_rate: 22050,
            duration_ms: 10_000,
        }
    }

    #[test]
    fn test_json_round_trip_preserves_triples_exactly() {
        let triples = vec![
            HashTriple {
                anchor: 0,
                target: 7,
                hash: u32::MAX,
            },
            HashTriple {
                anchor: 4_294_967_290,
                target: 4_294_967_295,
                hash: 0,
            },
        ];
        let record = FingerprintRecord::new("abc123", triples.clone(), &info());

        let json = serde_json::to_string(&record).unwrap();
        let loaded: FingerprintRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.triples, triples);
        assert_eq!(loaded.version, FORMAT_VERSION);
        assert_eq!(loaded.metadata.track_key, "abc123");
    }
}

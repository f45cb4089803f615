//! Hash triple generation from constellation peaks
//!
//! Each anchor peak pairs with up to `fan_out - 1` of the peaks that follow
//! it in amplitude order, keeping only pairs whose time delta falls inside
//! the target zone. The 32-bit hash is CRC-32/ISO-HDLC over the encoded
//! `"freq_anchor|freq_target|time_delta"` string; fingerprints must be
//! comparable across processes, so a randomized or implementation-default
//! hash is not an option here.

use crate::config::FingerprintConfig;
use crate::peaks::Peak;
use crc::{Crc, CRC_32_ISO_HDLC};
use serde::{Deserialize, Serialize};

/// Fixed, versioned hash function for landmark pairs. Changing this
/// invalidates every stored fingerprint.
const LANDMARK_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// A single translation-invariant landmark pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HashTriple {
    /// Time frame of the anchor peak
    pub anchor: u32,
    /// Time frame of the target peak
    pub target: u32,
    /// 32-bit landmark hash of (freq_anchor, freq_target, time_delta)
    pub hash: u32,
}

/// An ordered sequence of hash triples; treated as a set during matching
pub type Fingerprint = Vec<HashTriple>;

/// Compute the landmark hash for an anchor/target frequency pair and their
/// time delta
pub fn landmark_hash(freq_anchor: usize, freq_target: usize, time_delta: u32) -> u32 {
    let encoded = format!("{}|{}|{}", freq_anchor, freq_target, time_delta);
    LANDMARK_CRC.checksum(encoded.as_bytes())
}

/// Hash generator with a fixed fan-out and target zone
pub struct HashGenerator {
    fan_out: usize,
    max_time_delta: u32,
}

impl HashGenerator {
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            fan_out: config.fan_out,
            // Twice the target zone size
            max_time_delta: config.target_zone_size * 2,
        }
    }

    /// Generate a fingerprint from an amplitude-ordered peak sequence.
    ///
    /// Output is sorted ascending by (anchor, target, hash) for
    /// determinism. An empty peak sequence yields an empty fingerprint.
    pub fn generate(&self, peaks: &[Peak]) -> Fingerprint {
        let mut triples = Vec::new();

        for (i, anchor) in peaks.iter().enumerate() {
            if i + 1 == peaks.len() {
                break;
            }

            for target in &peaks[i + 1..(i + self.fan_out).min(peaks.len())] {
                if target.time <= anchor.time {
                    continue;
                }
                let time_delta = (target.time - anchor.time) as u32;
                if time_delta > self.max_time_delta {
                    continue;
                }

                triples.push(HashTriple {
                    anchor: anchor.time as u32,
                    target: target.time as u32,
                    hash: landmark_hash(anchor.freq, target.freq, time_delta),
                });
            }
        }

        triples.sort_unstable();
        triples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> HashGenerator {
        HashGenerator::new(&FingerprintConfig::default())
    }

    #[test]
    fn test_landmark_hash_is_stable() {
        // Pinned value: CRC-32/ISO-HDLC of "100|200|5". Guards against an
        // accidental change of hash function, which would orphan every
        // stored fingerprint.
        assert_eq!(landmark_hash(100, 200, 5), 0x5495_ffa4);
        assert_eq!(landmark_hash(100, 200, 5), landmark_hash(100, 200, 5));
        assert_ne!(landmark_hash(100, 200, 5), landmark_hash(200, 100, 5));
    }

    #[test]
    fn test_empty_peaks_yield_empty_fingerprint() {
        assert!(generator().generate(&[]).is_empty());
        assert!(generator()
            .generate(&[Peak { freq: 10, time: 3 }])
            .is_empty());
    }

    #[test]
    fn test_time_delta_constraint_holds() {
        let peaks: Vec<Peak> = (0..60)
            .map(|i| Peak {
                freq: (i * 13) % 512,
                time: (i * 3) % 40,
            })
            .collect();

        let fingerprint = generator().generate(&peaks);
        assert!(!fingerprint.is_empty());
        for triple in &fingerprint {
            let delta = triple.target as i64 - triple.anchor as i64;
            assert!(delta > 0, "non-positive time delta: {}", delta);
            assert!(delta <= 10, "time delta beyond target zone: {}", delta);
        }
    }

    #[test]
    fn test_backward_pairs_are_skipped() {
        // Amplitude order puts a later peak before an earlier one
        let peaks = vec![
            Peak { freq: 50, time: 8 },
            Peak { freq: 60, time: 2 },
        ];
        assert!(generator().generate(&peaks).is_empty());
    }

    #[test]
    fn test_fan_out_limits_pairings() {
        // 20 peaks at the same time step spacing; the first anchor may
        // reach at most fan_out - 1 targets
        let peaks: Vec<Peak> = (0..20)
            .map(|i| Peak {
                freq: 100 + i,
                time: i,
            })
            .collect();

        let fingerprint = generator().generate(&peaks);
        let from_first = fingerprint.iter().filter(|t| t.anchor == 0).count();
        // Delta cap of 10 binds before the fan-out of 15 here
        assert_eq!(from_first, 10);
    }

    #[test]
    fn test_output_is_sorted_and_deterministic() {
        let peaks: Vec<Peak> = (0..30)
            .map(|i| Peak {
                freq: (i * 37) % 512,
                time: (i * 5) % 25,
            })
            .collect();

        let a = generator().generate(&peaks);
        let b = generator().generate(&peaks);
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(a, sorted);
    }
}

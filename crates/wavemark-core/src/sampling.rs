//! Sampling classification for confirmed matches
//!
//! Treats both fingerprints as unordered sets of exact hash triples and
//! classifies the overlap: a direct copy, a lifted sample, or a loose
//! reference. Temporal placement of the sampled region comes from the same
//! offset histogram the matcher votes with.

use crate::config::FingerprintConfig;
use crate::hashing::HashTriple;
use crate::matching::{aligned_span, compare_fingerprints};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Overlap above this ratio is a direct copy
pub const EXACT_OVERLAP: f64 = 0.95;
/// Overlap at or above this ratio counts as a detection
pub const DETECTION_OVERLAP: f64 = 0.7;

/// How a probe relates to the original it matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Direct copy
    Exact,
    /// Modified sample
    Sampled,
    /// Similar but not sampled; only reachable at exactly the detection
    /// boundary with the current thresholds
    Referenced,
}

/// Classification of a confirmed match against one original track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingMatch {
    pub original_track: String,
    pub match_type: MatchType,
    /// Triple-set overlap ratio in [0,1]
    pub confidence: f64,
    /// Estimated position of the probe within the original, in seconds.
    /// Negative when the probe starts before the original.
    pub time_offset_s: f64,
    /// Estimated duration of the aligned region, in seconds
    pub duration_s: f64,
}

/// Classify how `input` relates to `original`.
///
/// Returns `None` when the triple-set overlap stays below
/// [`DETECTION_OVERLAP`]: an explicit no-result, distinct from a populated
/// record with low confidence.
pub fn analyze_sampling(
    input: &[HashTriple],
    original: &[HashTriple],
    original_track: &str,
    config: &FingerprintConfig,
) -> Option<SamplingMatch> {
    let overlap = if input == original && !input.is_empty() {
        1.0
    } else {
        overlap_ratio(input, original)?
    };

    if overlap < DETECTION_OVERLAP {
        return None;
    }

    let match_type = if overlap > EXACT_OVERLAP {
        MatchType::Exact
    } else if overlap > DETECTION_OVERLAP {
        MatchType::Sampled
    } else {
        MatchType::Referenced
    };

    let (time_offset_s, duration_s) = estimate_alignment(input, original, config);

    Some(SamplingMatch {
        original_track: original_track.to_string(),
        match_type,
        confidence: overlap,
        time_offset_s,
        duration_s,
    })
}

/// |intersection| / min(|input|, |original|) over exact triples; None for
/// degenerate empty inputs
fn overlap_ratio(input: &[HashTriple], original: &[HashTriple]) -> Option<f64> {
    if input.is_empty() || original.is_empty() {
        return None;
    }

    let input_set: HashSet<&HashTriple> = input.iter().collect();
    let original_set: HashSet<&HashTriple> = original.iter().collect();
    let common = input_set.intersection(&original_set).count();

    Some(common as f64 / input_set.len().min(original_set.len()) as f64)
}

/// Derive (offset, duration) in seconds from the offset histogram: the
/// probe sits at `-best_offset` frames inside the original, and the
/// duration is the anchor span of the votes at that offset
fn estimate_alignment(
    input: &[HashTriple],
    original: &[HashTriple],
    config: &FingerprintConfig,
) -> (f64, f64) {
    let frame_period = config.frame_period_s();

    let outcome = compare_fingerprints(input, original, 0.0);
    let Some(offset) = outcome.best_offset else {
        return (0.0, 0.0);
    };

    let time_offset_s = -(offset as f64) * frame_period;
    let duration_s = match aligned_span(input, original, offset) {
        Some((lo, hi)) => (hi - lo + 1) as f64 * frame_period,
        None => 0.0,
    };

    (time_offset_s, duration_s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(anchor: u32, hash: u32) -> HashTriple {
        HashTriple {
            anchor,
            target: anchor + 2,
            hash,
        }
    }

    fn fingerprint(len: usize) -> Vec<HashTriple> {
        (0..len as u32).map(|i| triple(i * 4, 0xB000 + i)).collect()
    }

    /// Replace the last `n` triples with foreign ones so exactly
    /// `len - n` of `len` overlap
    fn corrupted(fp: &[HashTriple], n: usize) -> Vec<HashTriple> {
        let mut out = fp.to_vec();
        let len = out.len();
        for (i, t) in out[len - n..].iter_mut().enumerate() {
            *t = triple(t.anchor, 0xC000 + i as u32);
        }
        out
    }

    #[test]
    fn test_identical_fingerprints_classify_exact() {
        let fp = fingerprint(50);
        let config = FingerprintConfig::default();

        let result = analyze_sampling(&fp, &fp, "track-a", &config).unwrap();
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.original_track, "track-a");
    }

    #[test]
    fn test_96_percent_overlap_is_exact() {
        let original = fingerprint(100);
        let input = corrupted(&original, 4);
        let config = FingerprintConfig::default();

        let result = analyze_sampling(&input, &original, "t", &config).unwrap();
        assert_eq!(result.match_type, MatchType::Exact);
        assert!((result.confidence - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_80_percent_overlap_is_sampled() {
        let original = fingerprint(100);
        let input = corrupted(&original, 20);
        let config = FingerprintConfig::default();

        let result = analyze_sampling(&input, &original, "t", &config).unwrap();
        assert_eq!(result.match_type, MatchType::Sampled);
        assert!((result.confidence - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_50_percent_overlap_yields_no_result() {
        let original = fingerprint(100);
        let input = corrupted(&original, 50);
        let config = FingerprintConfig::default();

        assert!(analyze_sampling(&input, &original, "t", &config).is_none());
    }

    #[test]
    fn test_exact_detection_boundary_is_referenced() {
        let original = fingerprint(100);
        let input = corrupted(&original, 30);
        let config = FingerprintConfig::default();

        let result = analyze_sampling(&input, &original, "t", &config).unwrap();
        assert_eq!(result.match_type, MatchType::Referenced);
        assert!((result.confidence - 0.70).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_yield_no_result() {
        let fp = fingerprint(10);
        let config = FingerprintConfig::default();

        assert!(analyze_sampling(&[], &fp, "t", &config).is_none());
        assert!(analyze_sampling(&fp, &[], "t", &config).is_none());
        assert!(analyze_sampling(&[], &[], "t", &config).is_none());
    }

    #[test]
    fn test_alignment_is_derived_from_offset_histogram() {
        let original = fingerprint(100);
        // Probe is the original delayed by 10 frames, with a corrupted
        // tail small enough to stay in the Exact band
        let delayed: Vec<HashTriple> = original
            .iter()
            .map(|t| HashTriple {
                anchor: t.anchor + 10,
                target: t.target + 10,
                hash: t.hash,
            })
            .collect();

        let config = FingerprintConfig::default();
        let frame_period = config.frame_period_s();

        // Delayed copy has no exact-set overlap (anchors moved), so drive
        // the estimator directly
        let (offset_s, duration_s) = estimate_alignment(&delayed, &original, &config);
        assert!((offset_s - (-10.0 * frame_period)).abs() < 1e-9);
        assert!(duration_s > 0.0);
    }
}

//! Fingerprint comparison via time-offset histogram voting
//!
//! A genuine match produces many hash collisions concentrated at one
//! consistent time offset; unrelated audio spreads its collisions thinly
//! across offsets. Confidence blends the histogram peak (alignment) with
//! the raw collision count (overlap).

use crate::hashing::HashTriple;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;


/// Weight of the strongest histogram bucket in the combined confidence
const ALIGNMENT_WEIGHT: f64 = 0.6;
/// Weight of the raw collision ratio in the combined confidence
const OVERLAP_WEIGHT: f64 = 0.4;

/// Result of comparing one input fingerprint against one stored fingerprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// True when confidence reached the configured threshold
    pub matched: bool,
    /// Combined confidence in [0,1]
    pub confidence: f64,
    /// Winning histogram offset in frames (input anchor minus stored
    /// anchor); None when no hash collided at all
    pub best_offset: Option<i64>,
    /// Votes in the winning histogram bucket
    pub aligned_votes: usize,
    /// Total hash collisions across all offsets
    pub total_votes: usize,
}

impl MatchOutcome {
    fn no_match() -> Self {
        Self {
            matched: false,
            confidence: 0.0,
            best_offset: None,
            aligned_votes: 0,
            total_votes: 0,
        }
    }
}

/// Compare two fingerprints and report whether they match at `threshold`.
///
/// Raising the threshold can only turn matches into non-matches: the
/// confidence value depends on the fingerprints alone.
pub fn compare_fingerprints(
    input: &[HashTriple],
    stored: &[HashTriple],
    threshold: f64,
) -> MatchOutcome {
    if input.is_empty() || stored.is_empty() {
        return MatchOutcome::no_match();
    }

    // Fast path: element-wise identical sequences
    if input == stored {
        return MatchOutcome {
            matched: true,
            confidence: 1.0,
            best_offset: Some(0),
            aligned_votes: input.len(),
            total_votes: input.len(),
        };
    }

    // Inverted lookup: hash -> stored anchor frames
    let mut lookup: HashMap<u32, Vec<u32>> = HashMap::new();
    for triple in stored {
        lookup.entry(triple.hash).or_default().push(triple.anchor);
    }

    let mut histogram: HashMap<i64, usize> = HashMap::new();
    let mut total_votes = 0usize;

    for triple in input {
        if let Some(anchors) = lookup.get(&triple.hash) {
            for &stored_anchor in anchors {
                let offset = triple.anchor as i64 - stored_anchor as i64;
                *histogram.entry(offset).or_insert(0) += 1;
                total_votes += 1;
            }
        }
    }

    if total_votes == 0 {
        return MatchOutcome::no_match();
    }

    // Deterministic winner: highest count, smallest offset on ties
    let (best_offset, aligned_votes) = histogram
        .iter()
        .map(|(&offset, &count)| (offset, count))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .unwrap_or((0, 0));

    let alignment_ratio = aligned_votes as f64 / input.len() as f64;
    let overlap_ratio = total_votes as f64 / input.len().min(stored.len()) as f64;
    let confidence = ALIGNMENT_WEIGHT * alignment_ratio + OVERLAP_WEIGHT * overlap_ratio;

    MatchOutcome {
        matched: confidence >= threshold,
        confidence,
        best_offset: Some(best_offset),
        aligned_votes,
        total_votes,
    }
}

/// Input anchor-frame span of the votes cast at `offset`, as
/// (earliest, latest). Used to estimate how long the aligned region is.
pub fn aligned_span(input: &[HashTriple], stored: &[HashTriple], offset: i64) -> Option<(u32, u32)> {
    let mut lookup: HashMap<u32, Vec<u32>> = HashMap::new();
    for triple in stored {
        lookup.entry(triple.hash).or_default().push(triple.anchor);
    }

    let mut span: Option<(u32, u32)> = None;
    for triple in input {
        if let Some(anchors) = lookup.get(&triple.hash) {
            let aligned = anchors
                .iter()
                .any(|&a| triple.anchor as i64 - a as i64 == offset);
            if aligned {
                span = Some(match span {
                    Some((lo, hi)) => (lo.min(triple.anchor), hi.max(triple.anchor)),
                    None => (triple.anchor, triple.anchor),
                });
            }
        }
    }

    span
}

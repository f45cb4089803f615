//! JSON output formatting for the match binary

use serde::Serialize;
use wavemark_core::SamplingMatch;

/// One matched reference track
#[derive(Debug, Clone, Serialize)]
pub struct TrackMatch {
    pub track_key: String,
    pub confidence: f64,
    /// Winning time offset in seconds (probe anchor minus stored anchor)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_s: Option<f64>,
    /// Present only when sampling analysis was requested and detected
    /// something
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingMatch>,
}

#[derive(Serialize)]
struct MatchReport<'a> {
    query_path: &'a str,
    detections: usize,
    results: &'a [TrackMatch],
}

/// Print all matches for a probe as a single JSON document, sorted by
/// confidence descending
pub fn print_json_report(query_path: &str, results: &mut Vec<TrackMatch>) {
    results.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let report = MatchReport {
        query_path,
        detections: results.len(),
        results: results.as_slice(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}

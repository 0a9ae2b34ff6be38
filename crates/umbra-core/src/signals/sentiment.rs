use serde::Serialize;

use crate::UtcDateTime;

/// Score used when no sentiment snapshot is available.
pub const NEUTRAL_SCORE: f64 = 0.0;

/// Headline sentiment as aggregated upstream. Only `average_score` feeds the
/// fusion score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSnapshot {
    pub generated_at: Option<UtcDateTime>,
    pub headline_count: usize,
    pub average_score: f64,
    pub headline_scores: Vec<f64>,
}

/// `average_score` of the snapshot, or [`NEUTRAL_SCORE`] when absent.
pub fn score(snapshot: Option<&SentimentSnapshot>) -> f64 {
    snapshot.map_or(NEUTRAL_SCORE, |snapshot| snapshot.average_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_average_through() {
        let snapshot = SentimentSnapshot {
            generated_at: None,
            headline_count: 3,
            average_score: 0.333,
            headline_scores: vec![1.0, 0.0, 0.0],
        };
        assert_eq!(score(Some(&snapshot)), 0.333);
    }

    #[test]
    fn absent_snapshot_is_neutral() {
        assert_eq!(score(None), 0.0);
    }
}

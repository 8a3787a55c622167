//! Ordering extracted candidates by funding evidence.

pub mod classifier;
mod score;

use serde::Serialize;

use crate::extract::{ExtractedIntel, parse_amount};
use crate::search::SearchResult;

pub use classifier::classify_funding_intent;

/// Results surfaced per response.
pub const TOP_N: usize = 10;

pub const SELECTED_REASONING: &str = "Selected by LLM based on funding likelihood";

/// A search hit whose source produced non-empty intel.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub hit: SearchResult,
    pub intel: ExtractedIntel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub hit: SearchResult,
    #[serde(flatten)]
    pub intel: ExtractedIntel,
    /// `intel.amount` normalized to a whole number, when it parses.
    pub amount_value: Option<u64>,
    pub info_score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingStrategy {
    /// Additive points per recovered field, plus model confidence.
    Weighted,
    /// Items with an amount first; model-selected links get full confidence.
    AmountPresence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Candidates scored, before truncation.
    pub total_hits: usize,
    pub results: Vec<RankedResult>,
}

impl RankingStrategy {
    /// Scores every candidate, sorts by `info_score` descending and keeps
    /// the top [`TOP_N`]. The sort is stable, so equal scores keep
    /// arrival order.
    pub fn rank(self, candidates: Vec<Candidate>) -> Ranking {
        let mut results: Vec<RankedResult> = candidates
            .into_iter()
            .map(|candidate| self.score(candidate))
            .collect();
        let total_hits = results.len();

        results.sort_by(|a, b| b.info_score.total_cmp(&a.info_score));
        results.truncate(TOP_N);

        Ranking {
            total_hits,
            results,
        }
    }

    fn score(self, Candidate { hit, mut intel }: Candidate) -> RankedResult {
        let amount_value = intel.amount.as_deref().and_then(parse_amount);
        let (info_score, reasoning) = match self {
            RankingStrategy::Weighted => score::weighted(&intel),
            RankingStrategy::AmountPresence => {
                // Placeholder: the selector gives no per-link confidence.
                intel.confidence = 1.0;
                let has_amount = if intel.amount.is_some() { 1.0 } else { 0.0 };
                (has_amount, SELECTED_REASONING.to_string())
            }
        };

        RankedResult {
            hit,
            intel,
            amount_value,
            info_score,
            reasoning,
        }
    }
}

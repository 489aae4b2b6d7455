use serde::{Deserialize, Serialize};

/// Score of one response, pointing back to its position in the input list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// Position in the original response list.
    pub index: usize,
    /// Composite score in [0, 1], rounded to two decimals.
    pub score: f64,
    /// Short explanation of the score.
    pub reasoning: String,
}

/// Outcome of ranking one query round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterEvaluation {
    /// Equals `rankings[0].index`.
    pub best_index: usize,
    pub reasoning: String,
    /// Sorted by descending score.
    pub rankings: Vec<RankingEntry>,
    pub evaluation_time_ms: u64,
}

impl MasterEvaluation {
    /// Ranking entry of the response at `index`, if it was ranked.
    pub fn entry_for(&self, index: usize) -> Option<&RankingEntry> {
        self.rankings.iter().find(|entry| entry.index == index)
    }

    /// 1-based rank of the response at `index`.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.rankings
            .iter()
            .position(|entry| entry.index == index)
            .map(|pos| pos + 1)
    }
}

/// The parts a composite score is made of, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub length: f64,
    pub confidence: f64,
    pub speed: f64,
    pub composite: f64,
}

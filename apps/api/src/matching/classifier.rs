//! Score tiers shared by every results view: card color, badge label and the
//! "match rate" headline all read from `TIERS`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Strong,
    Good,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub tier: MatchTier,
    /// Lowest score (inclusive) that lands in this tier.
    pub min_score: u8,
    pub label: &'static str,
    pub color: &'static str,
}

/// Ordered from highest threshold to lowest.
pub const TIERS: [TierInfo; 3] = [
    TierInfo {
        tier: MatchTier::Strong,
        min_score: 80,
        label: "Strong Match",
        color: "#10b981",
    },
    TierInfo {
        tier: MatchTier::Good,
        min_score: 60,
        label: "Good Match",
        color: "#f59e0b",
    },
    TierInfo {
        tier: MatchTier::Partial,
        min_score: 0,
        label: "Partial Match",
        color: "#ef4444",
    },
];

pub fn classify(score: u8) -> &'static TierInfo {
    TIERS
        .iter()
        .find(|t| score >= t.min_score)
        .unwrap_or(&TIERS[TIERS.len() - 1])
}

/// Scores at or above this count as "matched" in the match rate.
pub fn strong_threshold() -> u8 {
    TIERS[0].min_score
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRate {
    pub matched: usize,
    pub total: usize,
    pub percentage: u8,
}

pub fn match_rate(scores: &[u8]) -> MatchRate {
    let total = scores.len();
    let matched = scores.iter().filter(|&&s| s >= strong_threshold()).count();
    let percentage = if total == 0 {
        0
    } else {
        ((matched as f64 / total as f64) * 100.0).round() as u8
    };
    MatchRate {
        matched,
        total,
        percentage,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBucket {
    pub name: &'static str,
    pub count: usize,
}

/// Same buckets as the statistics page: 0–50, 51–75, 76–100.
const DISTRIBUTION_BUCKETS: [(&str, u8, u8); 3] =
    [("0-50", 0, 50), ("51-75", 51, 75), ("76-100", 76, 100)];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub rate: MatchRate,
    pub average: f64,
    pub distribution: Vec<ScoreBucket>,
}

pub fn summarize(scores: &[u8]) -> ScoreSummary {
    let average = if scores.is_empty() {
        0.0
    } else {
        let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
        (f64::from(sum) / scores.len() as f64 * 10.0).round() / 10.0
    };

    let distribution = DISTRIBUTION_BUCKETS
        .iter()
        .map(|&(name, lo, hi)| ScoreBucket {
            name,
            count: scores.iter().filter(|&&s| (lo..=hi).contains(&s)).count(),
        })
        .collect();

    ScoreSummary {
        rate: match_rate(scores),
        average,
        distribution,
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopJob {
    pub job_id: String,
    pub title: String,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvgScoreComponents {
    pub industry: f64,
    pub tech: f64,
    pub jd: f64,
}

/// Aggregate numbers served by `GET /statistics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    #[serde(rename = "totalCVs")]
    pub total_cvs: u64,
    pub total_jobs: u64,
    pub total_users: u64,
    pub avg_match_score: f64,
    pub score_distribution: BTreeMap<String, u64>,
    pub top_jobs_by_avg_score: Vec<TopJob>,
    pub avg_score_components: AvgScoreComponents,
    pub roles_distribution: BTreeMap<String, u64>,
}

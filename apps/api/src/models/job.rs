use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::skills::allocator::SkillWeight;

/// A job posting as stored by the matching backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "jobTitle")]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technical_skills: Vec<SkillWeight>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applicants: u32,
}

/// Body returned by `POST /job-postings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJob {
    pub job_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

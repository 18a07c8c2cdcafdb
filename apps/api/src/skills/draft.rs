//! Job draft: the two-step job definition flow (info, then weighted skills).
//!
//! The skill budget is loose while editing and strict at the save gate:
//! `save_ready` refuses any draft whose weights do not total exactly 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::job::JobPosting;
use crate::skills::allocator::{AllocationError, SkillAllocation, TOTAL_WEIGHT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStage {
    #[default]
    Info,
    Skills,
}

/// Descriptive fields of a job. Title, company, industry and description are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub title: String,
    pub company: String,
    pub industry: String,
    pub location: String,
    pub description: String,
}

/// Partial update for `JobInfo`; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfoPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please complete all required fields.")]
    MissingFields(Vec<&'static str>),

    #[error("Total skill weight must be 100%. Current: {0}%")]
    WeightTotal(u32),

    #[error("Skills can only be edited on the skills step.")]
    WrongStage,

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    /// Set when editing an existing job; `None` for a new one.
    pub job_id: Option<String>,
    pub stage: DraftStage,
    pub info: JobInfo,
    pub skills: SkillAllocation,
    #[serde(skip)]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    stamp: DraftStamp,
}

/// Identifies one version of one draft: a fresh session per started draft,
/// a new revision per applied edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftStamp {
    session: Uuid,
    revision: u64,
}

impl DraftStamp {
    fn fresh() -> Self {
        Self {
            session: Uuid::new_v4(),
            revision: 0,
        }
    }
}

impl JobDraft {
    pub fn new() -> Self {
        Self {
            stamp: DraftStamp::fresh(),
            ..Self::default()
        }
    }

    pub fn stamp(&self) -> DraftStamp {
        self.stamp
    }

    /// Marks the draft as changed since its last stamp.
    pub fn touch(&mut self) {
        self.stamp.revision = self.stamp.revision.wrapping_add(1);
    }

    /// Loads a stored job for editing.
    pub fn from_posting(job: JobPosting) -> Self {
        Self {
            job_id: job.id,
            stage: DraftStage::Info,
            info: JobInfo {
                title: job.title,
                company: job.company,
                industry: job.industry,
                location: job.location,
                description: job.description,
            },
            skills: SkillAllocation::from_entries(job.technical_skills),
            created_at: job.created_at,
            stamp: DraftStamp::fresh(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.job_id.is_some()
    }

    pub fn apply_info(&mut self, patch: JobInfoPatch) {
        let JobInfoPatch {
            title,
            company,
            industry,
            location,
            description,
        } = patch;
        if let Some(v) = title {
            self.info.title = v;
        }
        if let Some(v) = company {
            self.info.company = v;
        }
        if let Some(v) = industry {
            self.info.industry = v;
        }
        if let Some(v) = location {
            self.info.location = v;
        }
        if let Some(v) = description {
            self.info.description = v;
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.info.title),
            ("company", &self.info.company),
            ("industry", &self.info.industry),
            ("description", &self.info.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Moves from the info step to the skills step.
    pub fn advance(&mut self) -> Result<DraftStage, DraftError> {
        if self.stage == DraftStage::Info {
            let missing = self.missing_fields();
            if !missing.is_empty() {
                return Err(DraftError::MissingFields(missing));
            }
            self.stage = DraftStage::Skills;
        }
        Ok(self.stage)
    }

    pub fn step_back(&mut self) -> DraftStage {
        self.stage = DraftStage::Info;
        self.stage
    }

    pub fn add_skill(&mut self, label: &str, weight: u32) -> Result<(), DraftError> {
        self.require_skills_stage()?;
        Ok(self.skills.add(label, weight)?)
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<(), DraftError> {
        self.require_skills_stage()?;
        self.skills.remove(index)?;
        Ok(())
    }

    pub fn set_skill_weight(&mut self, index: usize, weight: u32) -> Result<(), DraftError> {
        self.require_skills_stage()?;
        Ok(self.skills.set_weight(index, weight)?)
    }

    /// The save gate: required fields filled and weights totalling exactly 100.
    pub fn save_ready(&self) -> Result<(), DraftError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }
        let total = self.skills.total();
        if total != TOTAL_WEIGHT {
            return Err(DraftError::WeightTotal(total));
        }
        Ok(())
    }

    /// Builds the posting sent to the backend. Call after `save_ready`.
    pub fn to_posting(&self, user_id: &str, now: DateTime<Utc>) -> JobPosting {
        JobPosting {
            id: self.job_id.clone(),
            title: self.info.title.trim().to_string(),
            company: self.info.company.trim().to_string(),
            industry: self.info.industry.trim().to_string(),
            location: self.info.location.trim().to_string(),
            description: self.info.description.trim().to_string(),
            technical_skills: self.skills.entries().to_vec(),
            user_id: Some(user_id.to_string()),
            created_at: Some(self.created_at.unwrap_or(now)),
            updated_at: Some(now),
            applicants: 0,
        }
    }

    fn require_skills_stage(&self) -> Result<(), DraftError> {
        if self.stage != DraftStage::Skills {
            return Err(DraftError::WrongStage);
        }
        Ok(())
    }
}

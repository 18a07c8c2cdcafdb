//! Wire shapes of the matching backend's match endpoints.

use serde::Deserialize;

use crate::backend_client::BackendError;
use crate::matching::models::{normalize_score, ComponentScores, MatchResult};

/// One job ranked for a CV (`/searchjobsforcv`, `/searchjobsforcv/bytext`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchWire {
    pub job_title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    pub match_score: f64,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tech_score: Option<f64>,
    #[serde(default)]
    pub industry_score: Option<f64>,
    #[serde(default)]
    pub jd_score: Option<f64>,
}

/// One stored CV ranked for a job (`/job-postings/{id}/matches`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateWire {
    #[serde(alias = "cvName")]
    pub file_name: String,
    pub score: f64,
    #[serde(default)]
    pub tech_score: Option<f64>,
    #[serde(default)]
    pub industry_score: Option<f64>,
    #[serde(default)]
    pub jd_score: Option<f64>,
    #[serde(default)]
    pub explanation: Option<String>,
}

fn component(raw: Option<f64>) -> u8 {
    raw.and_then(normalize_score).unwrap_or(0)
}

fn overall(label: &str, raw: f64) -> Result<u8, BackendError> {
    normalize_score(raw).ok_or_else(|| BackendError::InvalidScore {
        label: label.to_string(),
        score: raw,
    })
}

impl TryFrom<JobMatchWire> for MatchResult {
    type Error = BackendError;

    fn try_from(wire: JobMatchWire) -> Result<Self, Self::Error> {
        let score = overall(&wire.job_title, wire.match_score)?;
        Ok(MatchResult {
            score,
            components: ComponentScores {
                technical: component(wire.tech_score),
                experience: component(wire.industry_score),
                education_or_jd: component(wire.jd_score),
            },
            company: wire.company.filter(|c| !c.trim().is_empty()),
            industry: wire.industry.filter(|i| !i.trim().is_empty()),
            explanation: wire.explanation,
            label: wire.job_title,
        })
    }
}

impl TryFrom<CandidateWire> for MatchResult {
    type Error = BackendError;

    fn try_from(wire: CandidateWire) -> Result<Self, Self::Error> {
        let score = overall(&wire.file_name, wire.score)?;
        Ok(MatchResult {
            score,
            components: ComponentScores {
                technical: component(wire.tech_score),
                experience: component(wire.industry_score),
                education_or_jd: component(wire.jd_score),
            },
            company: None,
            industry: None,
            explanation: wire.explanation,
            label: wire.file_name,
        })
    }
}

/// Converts a whole response; one bad score fails the unit it belongs to.
pub fn into_results<W>(wire: Vec<W>) -> Result<Vec<MatchResult>, BackendError>
where
    MatchResult: TryFrom<W, Error = BackendError>,
{
    wire.into_iter().map(MatchResult::try_from).collect()
}

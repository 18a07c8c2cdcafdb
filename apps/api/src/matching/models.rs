use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::matching::classifier::{classify, MatchTier};
use crate::models::cv::CvRecord;

/// CV file extensions the matching backend can extract text from.
pub const ACCEPTED_CV_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// The stored-CV catalog also takes plain text.
pub const CATALOG_CV_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// Direction of a match run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Rank jobs for each queued CV.
    CvToJobs,
    /// Rank stored candidates for one selected job.
    #[default]
    JobsToCv,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Unsupported file type for '{name}'. Please upload a {accepted} file.")]
    WrongFileType { name: String, accepted: String },

    #[error("File '{0}' is empty.")]
    EmptyFile(String),
}

/// A CV file uploaded for a single run. The bytes live only as long as the run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    pub handle: Uuid,
    pub name: String,
    pub size: u64,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl FileInput {
    /// A CV queued for matching: PDF, DOC or DOCX.
    pub fn new(
        name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
    ) -> Result<Self, InputError> {
        Self::with_extensions(name, content_type, bytes, ACCEPTED_CV_EXTENSIONS)
    }

    pub fn with_extensions(
        name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
        accepted: &[&str],
    ) -> Result<Self, InputError> {
        let name = name.into();
        if !has_extension(&name, accepted) {
            return Err(InputError::WrongFileType {
                name,
                accepted: describe_extensions(accepted),
            });
        }
        if bytes.is_empty() {
            return Err(InputError::EmptyFile(name));
        }
        Ok(Self {
            handle: Uuid::new_v4(),
            size: bytes.len() as u64,
            name,
            content_type,
            bytes,
        })
    }
}

fn has_extension(name: &str, accepted: &[&str]) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty() && accepted.iter().any(|a| ext.eq_ignore_ascii_case(a))
        })
        .unwrap_or(false)
}

/// `["pdf", "doc", "docx"]` reads as "PDF, DOC or DOCX".
fn describe_extensions(accepted: &[&str]) -> String {
    let upper: Vec<String> = accepted.iter().map(|e| e.to_ascii_uppercase()).collect();
    match upper.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

/// A CV already stored by the backend, matched by its extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRecordInput {
    pub id: String,
    pub file_name: String,
    #[serde(skip)]
    pub content_text: String,
}

impl From<CvRecord> for DatabaseRecordInput {
    fn from(cv: CvRecord) -> Self {
        Self {
            id: cv.id,
            file_name: cv.file_name,
            content_text: cv.content_text,
        }
    }
}

/// One queued CV. The orchestrator dispatches on the variant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchInputUnit {
    File(FileInput),
    Record(DatabaseRecordInput),
}

impl MatchInputUnit {
    pub fn source_label(&self) -> &str {
        match self {
            MatchInputUnit::File(file) => &file.name,
            MatchInputUnit::Record(record) => &record.file_name,
        }
    }

    pub fn source_id(&self) -> String {
        match self {
            MatchInputUnit::File(file) => file.handle.to_string(),
            MatchInputUnit::Record(record) => record.id.clone(),
        }
    }
}

/// Per-dimension scores reported by the matcher. Independent of the overall score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub technical: u8,
    /// Industry/experience fit.
    pub experience: u8,
    pub education_or_jd: u8,
}

/// One scored pairing: a job (CV→Jobs) or a candidate CV (Jobs→CV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub label: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    pub score: u8,
    pub components: ComponentScores,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub source_label: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum OutcomeResult {
    Matches(Vec<MatchResult>),
    Failed(ErrorDetail),
}

/// Result of one match request, aligned with the input it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub source_label: String,
    pub result: OutcomeResult,
}

impl MatchOutcome {
    pub fn matches(source_label: impl Into<String>, matches: Vec<MatchResult>) -> Self {
        Self {
            source_label: source_label.into(),
            result: OutcomeResult::Matches(matches),
        }
    }

    pub fn failed(source_label: impl Into<String>, message: impl Into<String>) -> Self {
        let source_label = source_label.into();
        Self {
            result: OutcomeResult::Failed(ErrorDetail {
                source_label: source_label.clone(),
                message: message.into(),
            }),
            source_label,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.result, OutcomeResult::Failed(_))
    }
}

/// What a run was about, for labelling the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSource {
    pub id: String,
    pub name: String,
}

/// Complete aggregate of one orchestration run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRun {
    pub mode: SearchMode,
    pub source: RunSource,
    pub outcomes: Vec<MatchOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntry {
    /// Label of the outcome this match came from.
    pub origin: String,
    pub tier: MatchTier,
    #[serde(flatten)]
    pub result: MatchResult,
}

/// A row in a results view: one match, or the error placeholder of a failed unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultEntry {
    Match(MatchEntry),
    Error(ErrorDetail),
}

impl MatchRun {
    /// Flattens outcomes into display rows, keeping outcome order and each
    /// outcome's internal order.
    pub fn entries(&self) -> Vec<ResultEntry> {
        let mut entries = Vec::new();
        for outcome in &self.outcomes {
            match &outcome.result {
                OutcomeResult::Matches(matches) => {
                    entries.extend(matches.iter().map(|m| {
                        ResultEntry::Match(MatchEntry {
                            origin: outcome.source_label.clone(),
                            tier: classify(m.score).tier,
                            result: m.clone(),
                        })
                    }))
                }
                OutcomeResult::Failed(detail) => entries.push(ResultEntry::Error(detail.clone())),
            }
        }
        entries
    }

    pub fn scores(&self) -> Vec<u8> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                OutcomeResult::Matches(matches) => Some(matches.iter().map(|m| m.score)),
                OutcomeResult::Failed(_) => None,
            })
            .flatten()
            .collect()
    }
}

/// Rounds a raw matcher score into 0..=100. Non-finite scores are rejected.
pub fn normalize_score(raw: f64) -> Option<u8> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

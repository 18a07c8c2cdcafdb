//! Match Request Orchestrator: fans match requests out to the matching
//! backend and folds the answers back into one ordered aggregate.
//!
//! CV→Jobs issues one request per queued CV, all concurrently; Jobs→CV issues a
//! single request for the selected job. A failed request becomes an error
//! placeholder at its input's position and never aborts the run.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend_client::BackendError;
use crate::matching::models::{
    FileInput, MatchInputUnit, MatchOutcome, MatchResult, MatchRun, RunSource, SearchMode,
};

/// The external matcher. Scores are opaque; this only says how to ask for them.
///
/// Carried in `AppState` behind the orchestrator as `Arc<dyn MatchService>`.
#[async_trait]
pub trait MatchService: Send + Sync {
    /// Jobs ranked for an uploaded CV file.
    async fn match_cv_file(&self, file: &FileInput) -> Result<Vec<MatchResult>, BackendError>;

    /// Jobs ranked for CV text the backend already extracted.
    async fn match_cv_text(&self, text: &str) -> Result<Vec<MatchResult>, BackendError>;

    /// Stored CVs ranked for one job.
    async fn match_candidates_for_job(&self, job_id: &str)
        -> Result<Vec<MatchResult>, BackendError>;
}

/// A run that cannot start. Raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please add at least one CV before searching.")]
    NoInputs,

    #[error("Please select a job before searching.")]
    NoJobSelected,
}

/// The job a Jobs→CV run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSelection {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl JobSelection {
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

#[derive(Clone)]
pub struct MatchRequestOrchestrator {
    service: Arc<dyn MatchService>,
}

impl MatchRequestOrchestrator {
    pub fn new(service: Arc<dyn MatchService>) -> Self {
        Self { service }
    }

    /// Runs one search. Returns only once every request has resolved.
    pub async fn run(
        &self,
        mode: SearchMode,
        inputs: &[MatchInputUnit],
        job: Option<&JobSelection>,
    ) -> Result<MatchRun, PreconditionError> {
        match mode {
            SearchMode::CvToJobs => self.run_cv_to_jobs(inputs).await,
            SearchMode::JobsToCv => {
                let job = job.ok_or(PreconditionError::NoJobSelected)?;
                Ok(self.run_jobs_to_cv(job).await)
            }
        }
    }

    async fn run_cv_to_jobs(&self, inputs: &[MatchInputUnit]) -> Result<MatchRun, PreconditionError> {
        let first = inputs.first().ok_or(PreconditionError::NoInputs)?;
        info!("Dispatching {} CV-to-jobs match request(s)", inputs.len());

        let mut pending = inputs
            .iter()
            .enumerate()
            .map(|(index, unit)| async move { (index, self.match_unit(unit).await) })
            .collect::<FuturesUnordered<_>>();

        // Completion order is arbitrary; restore input order before publishing.
        let mut completed = Vec::with_capacity(inputs.len());
        while let Some(done) = pending.next().await {
            completed.push(done);
        }
        completed.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<MatchOutcome> = completed.into_iter().map(|(_, o)| o).collect();

        let failed = outcomes.iter().filter(|o| o.is_error()).count();
        info!(
            "CV-to-jobs run finished: {} succeeded, {} failed",
            outcomes.len() - failed,
            failed
        );

        let name = match inputs.len() {
            1 => first.source_label().to_string(),
            n => format!("{} and {} more", first.source_label(), n - 1),
        };

        Ok(MatchRun {
            mode: SearchMode::CvToJobs,
            source: RunSource {
                id: first.source_id(),
                name,
            },
            outcomes,
        })
    }

    async fn match_unit(&self, unit: &MatchInputUnit) -> MatchOutcome {
        let label = unit.source_label();
        let result = match unit {
            MatchInputUnit::File(file) => {
                debug!("Matching uploaded file '{}' ({} bytes)", file.name, file.size);
                self.service.match_cv_file(file).await
            }
            MatchInputUnit::Record(record) => {
                if record.content_text.trim().is_empty() {
                    warn!("Stored CV {} has no extracted text, skipping", record.id);
                    return MatchOutcome::failed(label, "This CV has no extracted text to match.");
                }
                debug!("Matching stored CV {} by text", record.id);
                self.service.match_cv_text(&record.content_text).await
            }
        };

        match result {
            Ok(matches) => MatchOutcome::matches(label, matches),
            Err(e) => {
                warn!("Match request for '{}' failed: {}", label, e);
                MatchOutcome::failed(label, e.to_string())
            }
        }
    }

    async fn run_jobs_to_cv(&self, job: &JobSelection) -> MatchRun {
        let label = job.display_name().to_string();
        info!("Requesting candidates for job {}", job.id);

        let outcome = match self.service.match_candidates_for_job(&job.id).await {
            Ok(mut candidates) => {
                // Stable: equal scores keep the backend's order.
                candidates.sort_by(|a, b| b.score.cmp(&a.score));
                MatchOutcome::matches(&label, candidates)
            }
            Err(e) => {
                warn!("Candidate request for job {} failed: {}", job.id, e);
                MatchOutcome::failed(&label, e.to_string())
            }
        };

        MatchRun {
            mode: SearchMode::JobsToCv,
            source: RunSource {
                id: job.id.clone(),
                name: label,
            },
            outcomes: vec![outcome],
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::matching::models::{ComponentScores, DatabaseRecordInput, OutcomeResult};

    /// Scripted matcher: each key (file name, CV text or job id) answers after
    /// `delay_ms` with either jobs/candidates at the given scores or an error.
    #[derive(Default)]
    pub(crate) struct ScriptedMatcher {
        script: HashMap<String, (u64, Result<Vec<u8>, String>)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedMatcher {
        pub(crate) fn answer(mut self, key: &str, delay_ms: u64, scores: &[u8]) -> Self {
            self.script
                .insert(key.to_string(), (delay_ms, Ok(scores.to_vec())));
            self
        }

        pub(crate) fn fail(mut self, key: &str, delay_ms: u64, message: &str) -> Self {
            self.script
                .insert(key.to_string(), (delay_ms, Err(message.to_string())));
            self
        }

        async fn respond(&self, call: String, key: &str) -> Result<Vec<MatchResult>, BackendError> {
            self.calls.lock().unwrap().push(call);
            let (delay, answer) = self
                .script
                .get(key)
                .cloned()
                .unwrap_or((0, Err(format!("no script for {key}"))));
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match answer {
                Ok(scores) => Ok(scores
                    .iter()
                    .enumerate()
                    .map(|(i, &score)| sample_result(&format!("{key}#{i}"), score))
                    .collect()),
                Err(message) => Err(BackendError::Api {
                    status: 500,
                    message,
                }),
            }
        }
    }

    #[async_trait]
    impl MatchService for ScriptedMatcher {
        async fn match_cv_file(&self, file: &FileInput) -> Result<Vec<MatchResult>, BackendError> {
            self.respond(format!("file:{}", file.name), &file.name).await
        }

        async fn match_cv_text(&self, text: &str) -> Result<Vec<MatchResult>, BackendError> {
            self.respond(format!("text:{text}"), text).await
        }

        async fn match_candidates_for_job(
            &self,
            job_id: &str,
        ) -> Result<Vec<MatchResult>, BackendError> {
            self.respond(format!("job:{job_id}"), job_id).await
        }
    }

    pub(crate) fn sample_result(label: &str, score: u8) -> MatchResult {
        MatchResult {
            label: label.to_string(),
            company: None,
            industry: None,
            score,
            components: ComponentScores {
                technical: 70,
                experience: 60,
                education_or_jd: 50,
            },
            explanation: None,
        }
    }

    pub(crate) fn file_unit(name: &str) -> MatchInputUnit {
        MatchInputUnit::File(FileInput::new(name, None, Bytes::from_static(b"%PDF-1.4")).unwrap())
    }

    pub(crate) fn record_unit(id: &str, text: &str) -> MatchInputUnit {
        MatchInputUnit::Record(DatabaseRecordInput {
            id: id.to_string(),
            file_name: format!("{id}.pdf"),
            content_text: text.to_string(),
        })
    }

    fn orchestrator(matcher: ScriptedMatcher) -> (MatchRequestOrchestrator, Arc<ScriptedMatcher>) {
        let matcher = Arc::new(matcher);
        (MatchRequestOrchestrator::new(matcher.clone()), matcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_unit_keeps_its_position_for_any_completion_order() {
        let delay_orders: [[u64; 3]; 6] = [
            [10, 20, 30],
            [10, 30, 20],
            [20, 10, 30],
            [20, 30, 10],
            [30, 10, 20],
            [30, 20, 10],
        ];

        for [a, b, c] in delay_orders {
            let (orch, _) = orchestrator(
                ScriptedMatcher::default()
                    .answer("A.pdf", a, &[90])
                    .fail("B.pdf", b, "backend down")
                    .answer("C.pdf", c, &[55, 40]),
            );
            let inputs = vec![file_unit("A.pdf"), file_unit("B.pdf"), file_unit("C.pdf")];

            let run = orch.run(SearchMode::CvToJobs, &inputs, None).await.unwrap();

            assert_eq!(run.outcomes.len(), 3);
            assert_eq!(run.outcomes[0].source_label, "A.pdf");
            assert!(matches!(&run.outcomes[0].result, OutcomeResult::Matches(m) if m.len() == 1));
            match &run.outcomes[1].result {
                OutcomeResult::Failed(detail) => {
                    assert_eq!(detail.source_label, "B.pdf");
                    assert!(detail.message.contains("backend down"));
                }
                other => panic!("expected failure at index 1, got {other:?}"),
            }
            assert!(matches!(&run.outcomes[2].result, OutcomeResult::Matches(m) if m.len() == 2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_run_concurrently() {
        let (orch, _) = orchestrator(
            ScriptedMatcher::default()
                .answer("A.pdf", 1_000, &[80])
                .answer("B.pdf", 1_000, &[70])
                .answer("C.pdf", 1_000, &[60]),
        );
        let inputs = vec![file_unit("A.pdf"), file_unit("B.pdf"), file_unit("C.pdf")];

        let started = tokio::time::Instant::now();
        orch.run(SearchMode::CvToJobs, &inputs, None).await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn test_mixed_inputs_dispatch_per_unit() {
        let (orch, matcher) = orchestrator(
            ScriptedMatcher::default()
                .answer("upload.pdf", 0, &[81])
                .answer("Rust, Tokio, Axum", 0, &[64]),
        );
        let inputs = vec![file_unit("upload.pdf"), record_unit("cv-42", "Rust, Tokio, Axum")];

        let run = orch.run(SearchMode::CvToJobs, &inputs, None).await.unwrap();
        assert!(run.outcomes.iter().all(|o| !o.is_error()));

        let mut calls = matcher.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["file:upload.pdf", "text:Rust, Tokio, Axum"]);
        assert_eq!(run.source.name, "upload.pdf and 1 more");
    }

    #[tokio::test]
    async fn test_record_without_text_fails_without_request() {
        let (orch, matcher) = orchestrator(ScriptedMatcher::default());
        let inputs = vec![record_unit("cv-7", "   ")];

        let run = orch.run(SearchMode::CvToJobs, &inputs, None).await.unwrap();
        assert!(run.outcomes[0].is_error());
        assert!(matcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_inputs_is_precondition_error() {
        let (orch, matcher) = orchestrator(ScriptedMatcher::default());
        let err = orch.run(SearchMode::CvToJobs, &[], None).await.unwrap_err();
        assert_eq!(err, PreconditionError::NoInputs);
        assert!(matcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_jobs_to_cv_requires_job() {
        let (orch, _) = orchestrator(ScriptedMatcher::default());
        let inputs = vec![file_unit("ignored.pdf")];
        let err = orch.run(SearchMode::JobsToCv, &inputs, None).await.unwrap_err();
        assert_eq!(err, PreconditionError::NoJobSelected);
    }

    #[tokio::test]
    async fn test_jobs_to_cv_single_request_ranked_by_score() {
        let (orch, matcher) = orchestrator(
            ScriptedMatcher::default().answer("job-123", 0, &[51, 91, 68, 91, 39]),
        );
        let job = JobSelection {
            id: "job-123".into(),
            title: Some("Senior Frontend Developer".into()),
        };

        let run = orch.run(SearchMode::JobsToCv, &[], Some(&job)).await.unwrap();

        assert_eq!(matcher.calls.lock().unwrap().len(), 1);
        assert_eq!(run.source.name, "Senior Frontend Developer");
        assert_eq!(run.outcomes.len(), 1);
        assert_eq!(run.scores(), vec![91, 91, 68, 51, 39]);
        // Ties keep backend order: job-123#1 came before job-123#3.
        match &run.outcomes[0].result {
            OutcomeResult::Matches(m) => {
                assert_eq!(m[0].label, "job-123#1");
                assert_eq!(m[1].label, "job-123#3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_jobs_to_cv_failure_is_placeholder() {
        let (orch, _) =
            orchestrator(ScriptedMatcher::default().fail("job-9", 0, "connection refused"));
        let job = JobSelection {
            id: "job-9".into(),
            title: None,
        };

        let run = orch.run(SearchMode::JobsToCv, &[], Some(&job)).await.unwrap();
        assert_eq!(run.source.name, "job-9");
        assert!(run.outcomes[0].is_error());
    }
}

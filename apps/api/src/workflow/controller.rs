//! Match workflow controller: owns the search mode, the queued CV inputs,
//! the selected job, navigation and the results pager.
//!
//! A run is split in three so the lock is never held across network I/O:
//! `begin_run` (under lock) → `MatchRequestOrchestrator::run` (no lock) →
//! `complete_run` (under lock). Each run carries the epoch it started in; a run
//! that finishes after the epoch moved on (a newer run or a mode switch) is
//! dropped instead of overwriting newer state.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::matching::classifier::{summarize, ScoreSummary};
use crate::matching::models::{
    DatabaseRecordInput, FileInput, InputError, MatchInputUnit, MatchRun, ResultEntry, RunSource,
    SearchMode,
};
use crate::matching::orchestrator::{JobSelection, MatchRequestOrchestrator, PreconditionError};
use crate::matching::pager::{PageView, ResultsPager};
use crate::workflow::navigation::{NavPayload, NavigationStateMachine, Page};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("No queued CV at position {index} (have {len}).")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A multipart file as received: name, content type, body.
pub type UploadedFile = (String, Option<String>, bytes::Bytes);

/// Everything a run needs, captured when it starts.
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub epoch: u64,
    pub mode: SearchMode,
    pub inputs: Vec<MatchInputUnit>,
    pub job: Option<JobSelection>,
    /// Uploaded files this run consumes; released from the queue on publish.
    pub files: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunDisposition {
    Published { page: Page, entries: usize },
    /// The workflow moved on while the run was in flight.
    Discarded,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub mode: SearchMode,
    pub source: RunSource,
    pub failed_units: usize,
    pub summary: ScoreSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView<'a> {
    pub run: Option<&'a RunSummary>,
    #[serde(flatten)]
    pub page: PageView<'a, ResultEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot<'a> {
    pub navigation: &'a NavigationStateMachine,
    pub mode: SearchMode,
    pub inputs: &'a [MatchInputUnit],
    pub selected_job: Option<&'a JobSelection>,
}

#[derive(Debug, Default)]
pub struct MatchWorkflowController {
    mode: SearchMode,
    inputs: Vec<MatchInputUnit>,
    selected_job: Option<JobSelection>,
    navigation: NavigationStateMachine,
    pager: ResultsPager<ResultEntry>,
    last_run: Option<RunSummary>,
    epoch: u64,
}

impl MatchWorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn inputs(&self) -> &[MatchInputUnit] {
        &self.inputs
    }

    pub fn selected_job(&self) -> Option<&JobSelection> {
        self.selected_job.as_ref()
    }

    pub fn navigation(&self) -> &NavigationStateMachine {
        &self.navigation
    }

    pub fn snapshot(&self) -> WorkflowSnapshot<'_> {
        WorkflowSnapshot {
            navigation: &self.navigation,
            mode: self.mode,
            inputs: &self.inputs,
            selected_job: self.selected_job.as_ref(),
        }
    }

    /// Switches direction. Leaving CV→Jobs drops the queued CVs so they cannot
    /// leak into a Jobs→CV run; the selected job is kept.
    pub fn set_mode(&mut self, mode: SearchMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == SearchMode::CvToJobs && !self.inputs.is_empty() {
            info!("Leaving CV-to-jobs mode, dropping {} queued CV(s)", self.inputs.len());
            self.inputs.clear();
        }
        self.mode = mode;
        self.epoch += 1;
    }

    /// Queues uploaded files. Every file is checked first; one bad file
    /// rejects the whole batch and leaves the queue unchanged.
    pub fn add_files(&mut self, files: Vec<UploadedFile>) -> Result<usize, WorkflowError> {
        let checked = files
            .into_iter()
            .map(|(name, content_type, bytes)| FileInput::new(name, content_type, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let count = checked.len();
        self.inputs.extend(checked.into_iter().map(MatchInputUnit::File));
        Ok(count)
    }

    /// Queues a stored CV. Returns false if that CV is already queued.
    pub fn add_record(&mut self, record: DatabaseRecordInput) -> bool {
        let duplicate = self
            .inputs
            .iter()
            .any(|unit| matches!(unit, MatchInputUnit::Record(r) if r.id == record.id));
        if duplicate {
            return false;
        }
        self.inputs.push(MatchInputUnit::Record(record));
        true
    }

    pub fn remove_input(&mut self, index: usize) -> Result<MatchInputUnit, WorkflowError> {
        if index >= self.inputs.len() {
            return Err(WorkflowError::IndexOutOfRange {
                index,
                len: self.inputs.len(),
            });
        }
        Ok(self.inputs.remove(index))
    }

    pub fn select_job(&mut self, job: JobSelection) {
        self.selected_job = Some(job);
    }

    pub fn clear_job(&mut self) {
        self.selected_job = None;
    }

    pub fn navigate(&mut self, page: Page, payload: &NavPayload) {
        self.navigation.navigate(page, payload);
    }

    pub fn back(&mut self, from: Page) -> Page {
        self.navigation.back(from)
    }

    /// Checks preconditions and captures the inputs for a new run. Any run
    /// still in flight becomes stale.
    pub fn begin_run(&mut self) -> Result<RunTicket, PreconditionError> {
        match self.mode {
            SearchMode::CvToJobs if self.inputs.is_empty() => {
                return Err(PreconditionError::NoInputs)
            }
            SearchMode::JobsToCv if self.selected_job.is_none() => {
                return Err(PreconditionError::NoJobSelected)
            }
            _ => {}
        }

        self.epoch += 1;
        let inputs = match self.mode {
            SearchMode::CvToJobs => self.inputs.clone(),
            SearchMode::JobsToCv => Vec::new(),
        };
        let files = inputs
            .iter()
            .filter_map(|unit| match unit {
                MatchInputUnit::File(file) => Some(file.handle),
                MatchInputUnit::Record(_) => None,
            })
            .collect();
        Ok(RunTicket {
            epoch: self.epoch,
            mode: self.mode,
            inputs,
            job: self.selected_job.clone(),
            files,
        })
    }

    /// Publishes a finished run and moves to its results page, unless the
    /// workflow has moved on since the run began.
    pub fn complete_run(&mut self, ticket: &RunTicket, run: MatchRun) -> RunDisposition {
        if ticket.epoch != self.epoch {
            info!(
                "Discarding stale {:?} run (epoch {}, current {})",
                run.mode, ticket.epoch, self.epoch
            );
            return RunDisposition::Discarded;
        }

        let entries = run.entries();
        let count = entries.len();
        self.pager.replace(entries);
        self.last_run = Some(RunSummary {
            mode: run.mode,
            failed_units: run.outcomes.iter().filter(|o| o.is_error()).count(),
            summary: summarize(&run.scores()),
            source: run.source.clone(),
        });

        let (page, payload) = match run.mode {
            SearchMode::CvToJobs => (
                Page::JobMatches,
                NavPayload {
                    search_type: Some(SearchMode::CvToJobs),
                    cv_id: Some(run.source.id),
                    cv_name: Some(run.source.name),
                },
            ),
            SearchMode::JobsToCv => (
                Page::JobMatching,
                NavPayload {
                    search_type: Some(SearchMode::JobsToCv),
                    ..Default::default()
                },
            ),
        };
        self.navigation.navigate(page, &payload);

        // Files queued while the run was in flight stay for the next one.
        self.inputs.retain(|unit| match unit {
            MatchInputUnit::File(file) => !ticket.files.contains(&file.handle),
            MatchInputUnit::Record(_) => true,
        });

        info!("Published {count} result row(s) to {page}");
        RunDisposition::Published {
            page,
            entries: count,
        }
    }

    pub fn show_more(&mut self) {
        self.pager.show_more();
    }

    pub fn results(&self) -> ResultsView<'_> {
        ResultsView {
            run: self.last_run.as_ref(),
            page: self.pager.view(),
        }
    }
}

/// Runs the current search end to end without holding the lock during I/O.
pub async fn run_search(
    workflow: &Mutex<MatchWorkflowController>,
    orchestrator: &MatchRequestOrchestrator,
) -> Result<RunDisposition, PreconditionError> {
    let ticket = workflow.lock().await.begin_run()?;
    let run = orchestrator
        .run(ticket.mode, &ticket.inputs, ticket.job.as_ref())
        .await?;
    Ok(workflow.lock().await.complete_run(&ticket, run))
}

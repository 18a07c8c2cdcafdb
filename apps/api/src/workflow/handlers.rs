use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::matching::models::{DatabaseRecordInput, SearchMode};
use crate::matching::orchestrator::JobSelection;
use crate::routes::render;
use crate::state::AppState;
use crate::workflow::controller::{
    run_search, ResultsView, RunDisposition, UploadedFile, WorkflowSnapshot,
};
use crate::workflow::navigation::{NavPayload, Page};
use crate::workflow::notice::{notify, Notice};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkflowView<'a> {
    #[serde(flatten)]
    snapshot: WorkflowSnapshot<'a>,
    notice: Option<Notice>,
}

async fn workflow_view(state: &AppState) -> Result<Json<Value>, AppError> {
    let workflow = state.workflow.lock().await;
    let notice = state.notices.lock().await.active().cloned();
    render(&WorkflowView {
        snapshot: workflow.snapshot(),
        notice,
    })
}

/// GET /api/v1/workflow
pub async fn handle_get_workflow(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    workflow_view(&state).await
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: Page,
    #[serde(flatten)]
    pub payload: NavPayload,
}

/// POST /api/v1/workflow/navigate
pub async fn handle_navigate(
    State(state): State<AppState>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<Value>, AppError> {
    state.workflow.lock().await.navigate(req.page, &req.payload);
    workflow_view(&state).await
}

#[derive(Deserialize, Default)]
pub struct BackRequest {
    /// Page being left. Defaults to the current page.
    #[serde(default)]
    pub from: Option<String>,
}

/// POST /api/v1/workflow/back
pub async fn handle_back(
    State(state): State<AppState>,
    Json(req): Json<BackRequest>,
) -> Result<Json<Value>, AppError> {
    {
        let mut workflow = state.workflow.lock().await;
        let from = match req.from.as_deref() {
            Some(name) => name.parse::<Page>()?,
            None => workflow.navigation().current(),
        };
        let to = workflow.back(from);
        info!("Back from {from} to {to}");
    }
    workflow_view(&state).await
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: SearchMode,
}

/// PUT /api/v1/workflow/mode
pub async fn handle_set_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<Value>, AppError> {
    state.workflow.lock().await.set_mode(req.mode);
    workflow_view(&state).await
}

const NO_FILE: &str = "Please choose a CV file to upload.";

/// POST /api/v1/workflow/inputs/file: multipart, one or more `file` fields.
pub async fn handle_add_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut files: Vec<UploadedFile> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        files.push((name, content_type, bytes));
    }

    if files.is_empty() {
        state.notices.lock().await.raise(Notice::error(NO_FILE));
        return Err(AppError::Validation(NO_FILE.into()));
    }

    let queued = state.workflow.lock().await.add_files(files);
    match queued {
        Ok(count) => info!("Queued {count} uploaded CV(s)"),
        Err(e) => return Err(notify(&state.notices, e).await.into()),
    }
    workflow_view(&state).await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecordRequest {
    pub cv_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecordResponse {
    pub added: bool,
    pub queued: usize,
}

/// POST /api/v1/workflow/inputs/record
pub async fn handle_add_record(
    State(state): State<AppState>,
    Json(req): Json<AddRecordRequest>,
) -> Result<Json<AddRecordResponse>, AppError> {
    let record = state
        .backend
        .find_cv(&req.cv_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {} not found", req.cv_id)))?;

    let mut workflow = state.workflow.lock().await;
    let added = workflow.add_record(DatabaseRecordInput::from(record));
    Ok(Json(AddRecordResponse {
        added,
        queued: workflow.inputs().len(),
    }))
}

/// DELETE /api/v1/workflow/inputs/:index
pub async fn handle_remove_input(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Value>, AppError> {
    let removed = state.workflow.lock().await.remove_input(index);
    if let Err(e) = removed {
        return Err(notify(&state.notices, e).await.into());
    }
    workflow_view(&state).await
}

/// PUT /api/v1/workflow/job: without a title, the job is looked up to label the run.
pub async fn handle_select_job(
    State(state): State<AppState>,
    Json(mut job): Json<JobSelection>,
) -> Result<Json<Value>, AppError> {
    if job.title.is_none() {
        job.title = Some(state.backend.get_job(&job.id).await?.title);
    }
    state.workflow.lock().await.select_job(job);
    workflow_view(&state).await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse<'a> {
    disposition: RunDisposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultsView<'a>>,
}

/// POST /api/v1/workflow/search
pub async fn handle_search(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let disposition = match run_search(&state.workflow, &state.orchestrator).await {
        Ok(d) => d,
        Err(e) => return Err(notify(&state.notices, e).await.into()),
    };

    let workflow = state.workflow.lock().await;
    render(&SearchResponse {
        disposition,
        results: match disposition {
            RunDisposition::Published { .. } => Some(workflow.results()),
            RunDisposition::Discarded => None,
        },
    })
}

/// GET /api/v1/results
pub async fn handle_get_results(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let workflow = state.workflow.lock().await;
    render(&workflow.results())
}

/// POST /api/v1/results/more
pub async fn handle_show_more(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut workflow = state.workflow.lock().await;
    workflow.show_more();
    render(&workflow.results())
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::skills::draft::{DraftError, JobDraft, JobInfoPatch};
use crate::state::AppState;
use crate::workflow::notice::{notify_draft, Notice};

/// A draft plus the budget figures the skills step displays.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    #[serde(flatten)]
    pub draft: JobDraft,
    pub total_weight: u32,
    pub remaining_weight: i64,
    pub balanced: bool,
}

impl From<&JobDraft> for DraftView {
    fn from(draft: &JobDraft) -> Self {
        Self {
            total_weight: draft.skills.total(),
            remaining_weight: draft.skills.remaining(),
            balanced: draft.skills.is_balanced(),
            draft: draft.clone(),
        }
    }
}

fn no_draft() -> AppError {
    AppError::NotFound("No job draft in progress".to_string())
}

/// Applies `edit` to the current draft. Draft failures raise a notice.
async fn edit_draft<F>(state: &AppState, edit: F) -> Result<Json<DraftView>, AppError>
where
    F: FnOnce(&mut JobDraft) -> Result<(), DraftError>,
{
    let mut slot = state.draft.lock().await;
    let draft = slot.as_mut().ok_or_else(no_draft)?;
    if let Err(e) = edit(&mut *draft) {
        return Err(notify_draft(&state.notices, e).await.into());
    }
    draft.touch();
    Ok(Json(DraftView::from(&*draft)))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartDraftRequest {
    /// Existing job to edit. Omit to define a new job.
    #[serde(default)]
    pub job_id: Option<String>,
}

/// POST /api/v1/job-draft: starts a new draft, replacing any draft in progress.
pub async fn handle_start_draft(
    State(state): State<AppState>,
    Json(req): Json<StartDraftRequest>,
) -> Result<(StatusCode, Json<DraftView>), AppError> {
    let draft = match req.job_id {
        Some(id) => {
            let job = state.backend.get_job(&id).await?;
            info!("Editing job {id}");
            JobDraft::from_posting(job)
        }
        None => JobDraft::new(),
    };
    let view = DraftView::from(&draft);
    *state.draft.lock().await = Some(draft);
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/job-draft
pub async fn handle_get_draft(State(state): State<AppState>) -> Result<Json<DraftView>, AppError> {
    let slot = state.draft.lock().await;
    let draft = slot.as_ref().ok_or_else(no_draft)?;
    Ok(Json(DraftView::from(draft)))
}

/// PATCH /api/v1/job-draft/info
pub async fn handle_patch_info(
    State(state): State<AppState>,
    Json(patch): Json<JobInfoPatch>,
) -> Result<Json<DraftView>, AppError> {
    edit_draft(&state, |draft| {
        draft.apply_info(patch);
        Ok(())
    })
    .await
}

#[derive(Deserialize)]
pub struct AddSkillRequest {
    pub skill: String,
    pub weight: u32,
}

/// POST /api/v1/job-draft/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(req): Json<AddSkillRequest>,
) -> Result<Json<DraftView>, AppError> {
    edit_draft(&state, |draft| draft.add_skill(&req.skill, req.weight)).await
}

#[derive(Deserialize)]
pub struct SetWeightRequest {
    pub weight: u32,
}

/// PUT /api/v1/job-draft/skills/:index
pub async fn handle_set_skill_weight(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<SetWeightRequest>,
) -> Result<Json<DraftView>, AppError> {
    edit_draft(&state, |draft| draft.set_skill_weight(index, req.weight)).await
}

/// DELETE /api/v1/job-draft/skills/:index
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<DraftView>, AppError> {
    edit_draft(&state, |draft| draft.remove_skill(index)).await
}

/// POST /api/v1/job-draft/advance
pub async fn handle_advance(State(state): State<AppState>) -> Result<Json<DraftView>, AppError> {
    edit_draft(&state, |draft| draft.advance().map(|_| ())).await
}

/// POST /api/v1/job-draft/back
pub async fn handle_step_back(State(state): State<AppState>) -> Result<Json<DraftView>, AppError> {
    edit_draft(&state, |draft| {
        draft.step_back();
        Ok(())
    })
    .await
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftResponse {
    pub job_id: String,
    pub message: String,
}

/// POST /api/v1/job-draft/save: creates or updates the job, then clears the
/// draft unless it was replaced or edited while the backend call ran.
pub async fn handle_save_draft(
    State(state): State<AppState>,
) -> Result<Json<SaveDraftResponse>, AppError> {
    let (posting, stamp) = {
        let slot = state.draft.lock().await;
        let draft = slot.as_ref().ok_or_else(no_draft)?;
        if let Err(e) = draft.save_ready() {
            drop(slot);
            return Err(notify_draft(&state.notices, e).await.into());
        }
        (
            draft.to_posting(&state.config.default_user_id, Utc::now()),
            draft.stamp(),
        )
    };

    let (job_id, message) = match posting.id.clone() {
        Some(id) => {
            state.backend.update_job(&id, &posting).await?;
            info!("Updated job {id}");
            (id, "Job updated successfully".to_string())
        }
        None => {
            let created = state.backend.create_job(&posting).await?;
            info!("Created job {}", created.job_id);
            let message = created
                .message
                .unwrap_or_else(|| "Job created successfully".to_string());
            (created.job_id, message)
        }
    };

    {
        let mut slot = state.draft.lock().await;
        if slot.as_ref().is_some_and(|draft| draft.stamp() == stamp) {
            *slot = None;
        } else {
            info!("Draft changed while saving job {job_id}, keeping it");
        }
    }
    state
        .notices
        .lock()
        .await
        .raise(Notice::success(message.clone()));

    Ok(Json(SaveDraftResponse { job_id, message }))
}

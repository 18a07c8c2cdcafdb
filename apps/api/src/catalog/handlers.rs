use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::job_filter::{filter_jobs, unique_industries, JobFilter, JobSort};
use crate::errors::AppError;
use crate::matching::models::{FileInput, CATALOG_CV_EXTENSIONS};
use crate::models::cv::CvRecord;
use crate::models::job::JobPosting;
use crate::models::statistics::Statistics;
use crate::state::AppState;
use crate::workflow::notice::notify;

/// GET /api/v1/cvs
pub async fn handle_list_cvs(State(state): State<AppState>) -> Result<Json<Vec<CvRecord>>, AppError> {
    Ok(Json(state.backend.list_cvs().await?))
}

/// POST /api/v1/cvs: multipart `file`, optional `userId`.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CvRecord>), AppError> {
    let mut file: Option<FileInput> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                let checked =
                    FileInput::with_extensions(name, content_type, bytes, CATALOG_CV_EXTENSIONS);
                match checked {
                    Ok(f) => file = Some(f),
                    Err(e) => return Err(notify(&state.notices, e).await.into()),
                }
            }
            Some("userId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                user_id = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let user_id = user_id.unwrap_or_else(|| state.config.default_user_id.clone());
    let record = state.backend.upload_cv(&file, Some(&user_id)).await?;
    info!("Uploaded CV '{}' as {}", record.file_name, record.id);
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/cvs/:id
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.backend.delete_cv(&id).await?;
    info!("Deleted CV {id}");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sort: JobSort,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobPosting>,
    /// Industries across all of the user's jobs, before filtering.
    pub industries: Vec<String>,
}

/// GET /api/v1/jobs: jobs owned by `userId` (or the default user), narrowed by
/// `search` and `industry` and ordered by `sort`.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let user_id = query
        .user_id
        .unwrap_or_else(|| state.config.default_user_id.clone());
    let all = state.backend.list_jobs(&user_id).await?;
    let industries = unique_industries(&all);
    let filter = JobFilter {
        search: query.search,
        industry: query.industry,
        sort: query.sort,
    };
    Ok(Json(JobListResponse {
        jobs: filter_jobs(all, &filter),
        industries,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPosting>, AppError> {
    Ok(Json(state.backend.get_job(&id).await?))
}

/// DELETE /api/v1/jobs/:id: also deselects the job if a search targets it.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.backend.delete_job(&id).await?;
    let mut workflow = state.workflow.lock().await;
    if workflow.selected_job().is_some_and(|job| job.id == id) {
        workflow.clear_job();
    }
    info!("Deleted job {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/statistics
pub async fn handle_get_statistics(
    State(state): State<AppState>,
) -> Result<Json<Statistics>, AppError> {
    Ok(Json(state.backend.get_statistics().await?))
}

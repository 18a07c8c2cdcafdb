pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::handlers as catalog;
use crate::errors::AppError;
use crate::skills::handlers as draft;
use crate::state::AppState;
use crate::workflow::handlers as workflow;

/// Serializes a view that borrows from a locked state while the lock is held.
pub(crate) fn render<T: Serialize>(value: &T) -> Result<Json<Value>, AppError> {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| AppError::Internal(e.into()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Match workflow
        .route("/api/v1/workflow", get(workflow::handle_get_workflow))
        .route("/api/v1/workflow/navigate", post(workflow::handle_navigate))
        .route("/api/v1/workflow/back", post(workflow::handle_back))
        .route("/api/v1/workflow/mode", put(workflow::handle_set_mode))
        .route("/api/v1/workflow/inputs/file", post(workflow::handle_add_file))
        .route(
            "/api/v1/workflow/inputs/record",
            post(workflow::handle_add_record),
        )
        .route(
            "/api/v1/workflow/inputs/:index",
            delete(workflow::handle_remove_input),
        )
        .route("/api/v1/workflow/job", put(workflow::handle_select_job))
        .route("/api/v1/workflow/search", post(workflow::handle_search))
        .route("/api/v1/results", get(workflow::handle_get_results))
        .route("/api/v1/results/more", post(workflow::handle_show_more))
        // Job definition
        .route(
            "/api/v1/job-draft",
            post(draft::handle_start_draft).get(draft::handle_get_draft),
        )
        .route("/api/v1/job-draft/info", patch(draft::handle_patch_info))
        .route("/api/v1/job-draft/skills", post(draft::handle_add_skill))
        .route(
            "/api/v1/job-draft/skills/:index",
            put(draft::handle_set_skill_weight).delete(draft::handle_remove_skill),
        )
        .route("/api/v1/job-draft/advance", post(draft::handle_advance))
        .route("/api/v1/job-draft/back", post(draft::handle_step_back))
        .route("/api/v1/job-draft/save", post(draft::handle_save_draft))
        // Catalog pass-through
        .route(
            "/api/v1/cvs",
            get(catalog::handle_list_cvs).post(catalog::handle_upload_cv),
        )
        .route("/api/v1/cvs/:id", delete(catalog::handle_delete_cv))
        .route("/api/v1/jobs", get(catalog::handle_list_jobs))
        .route(
            "/api/v1/jobs/:id",
            get(catalog::handle_get_job).delete(catalog::handle_delete_job),
        )
        .route("/api/v1/statistics", get(catalog::handle_get_statistics))
        .with_state(state)
}

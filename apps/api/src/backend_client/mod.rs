/// Backend Client: the single point of entry for all calls to the matching backend.
///
/// ARCHITECTURAL RULE: No other module may talk to the backend over HTTP.
/// CV storage, job storage, statistics and match scoring all go through here.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matching::models::{FileInput, MatchResult};
use crate::matching::orchestrator::MatchService;
use crate::models::cv::{CvRecord, UploadedCv};
use crate::models::job::{CreatedJob, JobPosting};
use crate::models::statistics::Statistics;

pub mod wire;

use wire::{into_results, CandidateWire, JobMatchWire};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend returned an invalid score {score} for '{label}'")]
    InvalidScore { label: String, score: f64 },
}

/// Error bodies the backend sends: `{"error": ...}` or `{"message": ...}`.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// The single backend client used by all services.
/// Wraps the backend's REST API with retry logic and typed helpers.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request built by `build`, retrying on transport errors, 429 and
    /// 5xx with exponential backoff. `build` runs once per attempt because
    /// multipart bodies cannot be replayed. The last attempt's error is returned.
    async fn send<F>(&self, build: F) -> Result<Response, BackendError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let error = match build(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let body = response.text().await.unwrap_or_default();
                    let error = BackendError::Api {
                        status: status.as_u16(),
                        message: extract_error_message(&body),
                    };
                    if status.as_u16() != 429 && !status.is_server_error() {
                        return Err(error);
                    }
                    warn!("Backend returned {}: {}", status, body);
                    error
                }
                Err(e) => BackendError::Http(e),
            };

            if attempt >= MAX_RETRIES {
                return Err(error);
            }

            // Exponential backoff: 1s, 2s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "Backend call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.url(path);
        debug!("GET {url}");
        let response = self.send(|c| c.get(&url)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), BackendError> {
        let url = self.url(path);
        debug!("DELETE {url}");
        self.send(|c| c.delete(&url)).await?;
        Ok(())
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {url}");
        let response = self.send(|c| c.post(&url).json(body)).await?;
        Ok(response.json().await?)
    }

    async fn post_form<T, F>(&self, path: &str, form: F) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        F: Fn() -> multipart::Form + Send + Sync,
    {
        let url = self.url(path);
        debug!("POST {url} (multipart)");
        let response = self.send(|c| c.post(&url).multipart(form())).await?;
        Ok(response.json().await?)
    }

    // ── CVs ─────────────────────────────────────────────────────────────────

    pub async fn list_cvs(&self) -> Result<Vec<CvRecord>, BackendError> {
        self.get_json("cvs").await
    }

    /// Finds one stored CV by id in the full listing (the backend has no single-CV endpoint).
    pub async fn find_cv(&self, cv_id: &str) -> Result<Option<CvRecord>, BackendError> {
        Ok(self.list_cvs().await?.into_iter().find(|cv| cv.id == cv_id))
    }

    pub async fn upload_cv(
        &self,
        file: &FileInput,
        user_id: Option<&str>,
    ) -> Result<CvRecord, BackendError> {
        let uploaded: UploadedCv = self
            .post_form("cvs", || {
                let form = multipart::Form::new().part("file", file_part(file));
                match user_id {
                    Some(id) => form.text("userId", id.to_string()),
                    None => form,
                }
            })
            .await?;
        Ok(uploaded.into())
    }

    pub async fn delete_cv(&self, cv_id: &str) -> Result<(), BackendError> {
        self.delete(&format!("cvs/{cv_id}")).await
    }

    // ── Jobs ────────────────────────────────────────────────────────────────

    pub async fn list_jobs(&self, user_id: &str) -> Result<Vec<JobPosting>, BackendError> {
        self.get_json(&format!("job-postings/user/{user_id}")).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<JobPosting, BackendError> {
        self.get_json(&format!("job-postings/{job_id}")).await
    }

    pub async fn create_job(&self, job: &JobPosting) -> Result<CreatedJob, BackendError> {
        self.post_json("job-postings", job).await
    }

    pub async fn update_job(&self, job_id: &str, job: &JobPosting) -> Result<(), BackendError> {
        let url = self.url(&format!("job-postings/{job_id}"));
        debug!("PUT {url}");
        self.send(|c| c.put(&url).json(job)).await?;
        Ok(())
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), BackendError> {
        self.delete(&format!("job-postings/{job_id}")).await
    }

    pub async fn get_statistics(&self) -> Result<Statistics, BackendError> {
        self.get_json("statistics").await
    }
}

fn file_part(file: &FileInput) -> multipart::Part {
    let build = || multipart::Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
    match file.content_type.as_deref() {
        // An unparseable content type is dropped rather than failing the upload.
        Some(mime) => build().mime_str(mime).unwrap_or_else(|_| build()),
        None => build(),
    }
}

#[async_trait]
impl MatchService for BackendClient {
    async fn match_cv_file(&self, file: &FileInput) -> Result<Vec<MatchResult>, BackendError> {
        let wire: Vec<JobMatchWire> = self
            .post_form("searchjobsforcv", || {
                multipart::Form::new().part("file", file_part(file))
            })
            .await?;
        into_results(wire)
    }

    async fn match_cv_text(&self, text: &str) -> Result<Vec<MatchResult>, BackendError> {
        let wire: Vec<JobMatchWire> = self
            .post_form("searchjobsforcv/bytext", || {
                multipart::Form::new().text("cvText", text.to_string())
            })
            .await?;
        into_results(wire)
    }

    async fn match_candidates_for_job(
        &self,
        job_id: &str,
    ) -> Result<Vec<MatchResult>, BackendError> {
        let wire: Vec<CandidateWire> = self
            .get_json(&format!("job-postings/{job_id}/matches"))
            .await?;
        into_results(wire)
    }
}

/// Pulls a human-readable message out of an error body, falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<BackendErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| body.trim().to_string())
}

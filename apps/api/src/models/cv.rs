use serde::{Deserialize, Serialize};

/// A CV stored by the matching backend. `content_text` is the text the backend
/// extracted at upload time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub content_text: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// Body returned by `POST /cvs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedCv {
    pub cv_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub cv_text: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

impl From<UploadedCv> for CvRecord {
    fn from(uploaded: UploadedCv) -> Self {
        CvRecord {
            id: uploaded.cv_id,
            user_id: uploaded.user_id,
            file_name: uploaded.file_name,
            content_text: uploaded.cv_text,
            uploaded_at: uploaded.uploaded_at,
        }
    }
}

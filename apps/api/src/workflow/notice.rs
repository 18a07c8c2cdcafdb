use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::skills::draft::DraftError;

/// How long a validation message stays up.
const VALIDATION_TTL_SECS: i64 = 3;
/// The weight-total gate message stays longer; it carries the current total.
const WEIGHT_GATE_TTL_SECS: i64 = 5;
const SUCCESS_TTL_SECS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Success,
}

/// A self-dismissing inline message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_ttl(NoticeLevel::Error, message, VALIDATION_TTL_SECS)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_ttl(NoticeLevel::Success, message, SUCCESS_TTL_SECS)
    }

    /// Error notice for a draft failure, with the longer lifetime for the save gate.
    pub fn for_draft_error(err: &DraftError) -> Self {
        let ttl = match err {
            DraftError::WeightTotal(_) => WEIGHT_GATE_TTL_SECS,
            _ => VALIDATION_TTL_SECS,
        };
        Self::with_ttl(NoticeLevel::Error, err.to_string(), ttl)
    }

    fn with_ttl(level: NoticeLevel, message: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            level,
            message: message.into(),
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Holds at most one notice; a newer one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct NoticeSlot {
    current: Option<Notice>,
}

impl NoticeSlot {
    pub fn raise(&mut self, notice: Notice) {
        self.current = Some(notice);
    }

    /// The current notice if it has not expired. Expired notices are dropped.
    pub fn active_at(&mut self, now: DateTime<Utc>) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .is_some_and(|n| !n.is_active_at(now))
        {
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn active(&mut self) -> Option<&Notice> {
        self.active_at(Utc::now())
    }
}

/// Raises an error notice for `err` and hands it back for propagation.
pub async fn notify<E: std::fmt::Display>(notices: &Mutex<NoticeSlot>, err: E) -> E {
    notices.lock().await.raise(Notice::error(err.to_string()));
    err
}

/// Same as `notify`, with the draft-specific notice lifetime.
pub async fn notify_draft(notices: &Mutex<NoticeSlot>, err: DraftError) -> DraftError {
    notices.lock().await.raise(Notice::for_draft_error(&err));
    err
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub type JobId = u64;
pub type RequestSeq = u64;

/// Body of `GET /api/job/{id}/progress`.
///
/// The endpoint omits fields freely (an inactive job only carries `active`,
/// `status`, `progress` and `message`; a missing job only `error`), so every
/// field defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressPayload {
    pub active: bool,
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub current_url: Option<String>,
    pub message: Option<String>,
    pub pages_processed: Option<u64>,
    pub total_pages: Option<u64>,
    pub started_at: Option<String>,
    pub updated_at: Option<String>,
    pub error: Option<String>,
}

/// Body of `GET /job/{id}/export/preview`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewPayload {
    pub job_info: Option<PreviewJobInfoPayload>,
    pub data_size_estimate: Option<String>,
    pub sample_pages: Vec<SamplePagePayload>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewJobInfoPayload {
    pub name: String,
    pub status: String,
    pub created_at: Option<String>,
    pub total_pages: u64,
    pub total_links: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplePagePayload {
    pub url: String,
    pub title: Option<String>,
    pub status_code: u16,
    pub content: Option<PageContentPayload>,
    /// Only the length is shown; link objects stay opaque.
    pub links: Vec<serde_json::Value>,
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContentPayload {
    pub word_count: Option<u64>,
}

/// One entry of `GET /api/jobs/active`, which is keyed by job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub job_id: JobId,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PollTick,
    ElapsedTick {
        elapsed: Duration,
    },
    ProgressFetched {
        job_id: JobId,
        seq: RequestSeq,
        result: Result<ProgressPayload, PollError>,
    },
    PreviewFetched {
        job_id: JobId,
        result: Result<PreviewPayload, PollError>,
    },
    ActiveJobsFetched {
        result: Result<Vec<ActiveJob>, PollError>,
    },
    JobDeleted {
        job_id: JobId,
        result: Result<(), PollError>,
    },
    /// A delay scheduled with [`crate::EngineHandle::schedule`] ran out.
    Scheduled(ScheduledEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    Reload,
    ToastExpired { toast_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unreadable response body: {0}")]
    Decode(String),
}

impl PollError {
    /// The request completed but its body could not be used.
    pub fn is_decode(&self) -> bool {
        matches!(self, PollError::Decode(_))
    }
}

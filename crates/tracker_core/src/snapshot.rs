use std::fmt;

pub type JobId = u64;

/// Per-job request counter attached to every progress fetch.
pub type RequestSeq = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Running,
    Processing,
    Completed,
    Failed,
    /// Any status string the console does not recognise, kept verbatim.
    Unknown(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "starting" => Self::Starting,
            "running" => Self::Running,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown(raw) => raw,
        }
    }

    /// `completed` and `failed` end polling regardless of the `active` flag.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress response for a tracked job.
///
/// Every descriptive field is optional; rendering substitutes fallback text
/// for anything absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobProgressSnapshot {
    pub job_id: JobId,
    pub active: bool,
    pub status: Option<JobStatus>,
    pub progress: Option<i64>,
    pub current_url: Option<String>,
    pub message: Option<String>,
    pub pages_processed: Option<u64>,
    pub total_pages: Option<u64>,
    pub updated_at: Option<String>,
    /// Endpoint-reported failure; distinct from `status: failed`.
    pub error: Option<String>,
}

impl JobProgressSnapshot {
    pub fn new(job_id: JobId, active: bool) -> Self {
        Self {
            job_id,
            active,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.as_ref().is_some_and(JobStatus::is_terminal)
    }
}

/// A fetch that never produced a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The request itself failed (connection refused, timeout, ...).
    Transport(String),
    /// A response arrived but its body was not a progress payload.
    Decode(String),
}

impl fmt::Display for PollFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollFailure::Transport(detail) => write!(f, "transport failure: {detail}"),
            PollFailure::Decode(detail) => write!(f, "unreadable response: {detail}"),
        }
    }
}

/// A job row as listed by the dashboard page at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    pub job_id: JobId,
    /// Text of the row's status badge.
    pub status_badge: String,
}

impl PageRow {
    pub fn new(job_id: JobId, status_badge: impl Into<String>) -> Self {
        Self {
            job_id,
            status_badge: status_badge.into(),
        }
    }

    /// Rows whose badge names a job still in flight are tracked at page load.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            JobStatus::parse(self.status_badge.trim()),
            JobStatus::Starting | JobStatus::Running | JobStatus::Processing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{JobProgressSnapshot, JobStatus, PageRow};

    #[test]
    fn unknown_status_keeps_raw_text() {
        let status = JobStatus::parse("paused");
        assert_eq!(status, JobStatus::Unknown("paused".to_string()));
        assert_eq!(status.as_str(), "paused");
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(!JobProgressSnapshot::new(1, true).is_terminal());
    }

    #[test]
    fn page_rows_track_in_flight_badges_only() {
        assert!(PageRow::new(1, " running ").is_in_flight());
        assert!(PageRow::new(2, "starting").is_in_flight());
        assert!(!PageRow::new(3, "completed").is_in_flight());
        assert!(!PageRow::new(4, "").is_in_flight());
    }
}

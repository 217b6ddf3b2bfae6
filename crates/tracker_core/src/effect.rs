use std::time::Duration;

use crate::{JobId, RequestSeq};

/// Delay between a terminal status and the page reload.
pub const RELOAD_DELAY: Duration = Duration::from_millis(3000);
/// How long a completion toast stays on screen.
pub const TOAST_LIFETIME: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the repeating poll timer and, optionally, the elapsed-time timer.
    StartTimers {
        poll_interval: Duration,
        elapsed_interval: Option<Duration>,
    },
    FetchProgress {
        job_id: JobId,
        seq: RequestSeq,
    },
    /// Cancel every running timer. Must be safe when nothing is running.
    CancelTimers,
    ScheduleReload {
        delay: Duration,
    },
    Reload,
    ScheduleToastExpiry {
        toast_id: u64,
        delay: Duration,
    },
}

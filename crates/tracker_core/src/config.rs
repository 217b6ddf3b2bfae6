use std::time::Duration;

/// Which page layout the poller renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Job-details page: one progress card for a single job.
    SingleJob,
    /// Dashboard: one progress bar per job row plus an active-jobs banner.
    Dashboard,
}

/// Parameters that distinguish the single-job and dashboard pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub view: ViewKind,
    pub poll_interval: Duration,
    /// `Some` starts a second timer that only refreshes the elapsed-time region.
    pub elapsed_interval: Option<Duration>,
    /// Schedule a reload after a job reaches `completed`/`failed`.
    pub reload_on_terminal: bool,
    /// Reload immediately once the last tracked job reports `active: false`.
    pub reload_when_drained: bool,
}

impl PollerConfig {
    pub fn single_job() -> Self {
        Self {
            view: ViewKind::SingleJob,
            poll_interval: Duration::from_millis(2000),
            elapsed_interval: Some(Duration::from_millis(1000)),
            reload_on_terminal: true,
            reload_when_drained: false,
        }
    }

    pub fn dashboard() -> Self {
        Self {
            view: ViewKind::Dashboard,
            poll_interval: Duration::from_millis(5000),
            elapsed_interval: None,
            reload_on_terminal: true,
            reload_when_drained: true,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn show_elapsed_time(&self) -> bool {
        self.elapsed_interval.is_some()
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::single_job()
    }
}

use std::collections::BTreeMap;

use crate::view_model::{Toast, ViewCommand};
use crate::{JobId, JobStatus, PollerConfig, RequestSeq};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollerPhase {
    #[default]
    Idle,
    Polling,
    Terminal,
}

/// Why the poller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    Completed,
    Failed,
    /// Every tracked job went inactive without a terminal status.
    Drained,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct TrackedJob {
    pub(crate) issued_seq: RequestSeq,
    pub(crate) applied_seq: RequestSeq,
    pub(crate) last_status: Option<JobStatus>,
    pub(crate) last_progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollerState {
    config: PollerConfig,
    phase: PollerPhase,
    tracked: BTreeMap<JobId, TrackedJob>,
    outcome: Option<TerminalOutcome>,
    toasts: Vec<Toast>,
    next_toast_id: u64,
    /// Highest request sequence handed out so far, across every job.
    last_issued_seq: RequestSeq,
    pending_view: Vec<ViewCommand>,
}

/// Read-only summary of the poller for hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerView {
    pub phase: PollerPhase,
    pub tracked_jobs: Vec<JobId>,
    pub outcome: Option<TerminalOutcome>,
    pub toasts: Vec<Toast>,
    /// Last rendered progress per tracked job, already clamped.
    pub progress: Vec<(JobId, u8)>,
}

impl PollerState {
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Fresh state for a reloaded page. Request sequences continue after
    /// `previous`, so responses still in flight from the old page stay stale.
    pub fn reloaded(config: PollerConfig, previous: &PollerState) -> Self {
        Self {
            config,
            last_issued_seq: previous.last_issued_seq,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn phase(&self) -> PollerPhase {
        self.phase
    }

    pub fn is_tracking(&self, job_id: JobId) -> bool {
        self.tracked.contains_key(&job_id)
    }

    pub fn view(&self) -> PollerView {
        PollerView {
            phase: self.phase,
            tracked_jobs: self.tracked.keys().copied().collect(),
            outcome: self.outcome,
            toasts: self.toasts.clone(),
            progress: self
                .tracked
                .iter()
                .map(|(job_id, job)| (*job_id, job.last_progress))
                .collect(),
        }
    }

    /// Drains the view commands produced since the last call.
    pub fn take_view_commands(&mut self) -> Vec<ViewCommand> {
        std::mem::take(&mut self.pending_view)
    }

    pub(crate) fn begin_polling(&mut self, jobs: impl IntoIterator<Item = JobId>) -> Vec<JobId> {
        let floor = self.last_issued_seq;
        for job_id in jobs {
            self.tracked.entry(job_id).or_insert_with(|| TrackedJob {
                issued_seq: floor,
                applied_seq: floor,
                ..TrackedJob::default()
            });
        }
        if !self.tracked.is_empty() {
            self.phase = PollerPhase::Polling;
        }
        self.tracked.keys().copied().collect()
    }

    pub(crate) fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    pub(crate) fn job_mut(&mut self, job_id: JobId) -> Option<&mut TrackedJob> {
        self.tracked.get_mut(&job_id)
    }

    /// Bumps every tracked job's request counter and returns the new values.
    pub(crate) fn issue_requests(&mut self) -> Vec<(JobId, RequestSeq)> {
        let issued: Vec<_> = self
            .tracked
            .iter_mut()
            .map(|(job_id, job)| {
                job.issued_seq += 1;
                (*job_id, job.issued_seq)
            })
            .collect();
        if let Some(highest) = issued.iter().map(|(_, seq)| *seq).max() {
            self.last_issued_seq = self.last_issued_seq.max(highest);
        }
        issued
    }

    /// Removes a job from the registration set; `false` when it was not tracked.
    pub(crate) fn untrack(&mut self, job_id: JobId) -> bool {
        self.tracked.remove(&job_id).is_some()
    }

    pub(crate) fn finish(&mut self, outcome: TerminalOutcome) {
        self.phase = PollerPhase::Terminal;
        self.outcome = Some(outcome);
        self.tracked.clear();
    }

    pub(crate) fn push_toast(&mut self, build: impl FnOnce(u64) -> Option<Toast>) -> Option<u64> {
        let id = self.next_toast_id + 1;
        let toast = build(id)?;
        self.next_toast_id = id;
        self.pending_view.push(ViewCommand::ShowToast(toast.clone()));
        self.toasts.push(toast);
        Some(id)
    }

    pub(crate) fn remove_toast(&mut self, toast_id: u64) {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != toast_id);
        if self.toasts.len() != before {
            self.pending_view.push(ViewCommand::RemoveToast { toast_id });
        }
    }

    pub(crate) fn emit(&mut self, commands: impl IntoIterator<Item = ViewCommand>) {
        self.pending_view.extend(commands);
    }
}

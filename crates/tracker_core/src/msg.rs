use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Job-details page loaded for one job; `is_job_active` comes from the host page.
    Attach {
        job_id: crate::JobId,
        is_job_active: bool,
    },
    /// Dashboard page loaded with these job rows.
    PageLoaded { rows: Vec<crate::PageRow> },
    /// Poll timer fired.
    PollTick,
    /// Elapsed-time timer fired; `elapsed` is measured since tracking began.
    ElapsedTick { elapsed: Duration },
    /// A progress fetch finished, successfully or not.
    ProgressReceived {
        job_id: crate::JobId,
        seq: crate::RequestSeq,
        result: Result<crate::JobProgressSnapshot, crate::PollFailure>,
    },
    /// A toast's lifetime ran out.
    ToastExpired { toast_id: u64 },
    /// User closed a toast before it expired.
    ToastDismissed { toast_id: u64 },
}

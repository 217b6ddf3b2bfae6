//! Snapshot → view-command rendering.
//!
//! Every function here is total: unknown statuses, out-of-range progress and
//! missing fields all map to a defined display value.

use std::borrow::Cow;
use std::time::Duration;

use crate::view_model::{RegionId, Toast, ToastKind, ViewCommand};
use crate::{JobProgressSnapshot, JobStatus, TerminalOutcome};

pub const CONNECTION_ERROR_MESSAGE: &str = "Server connection error";
const FETCH_ERROR_PREFIX: &str = "Failed to fetch progress: ";

const FALLBACK_URL: &str = "Not specified";
const FALLBACK_UPDATED_AT: &str = "Just now";
const FALLBACK_MESSAGE: &str = "Running job...";
const FALLBACK_STATUS: &str = "running";
const UNKNOWN_LABEL: &str = "Unknown";

const RELOAD_NOTICE: &str = "The page will refresh in a few seconds...";

pub fn clamp_progress(progress: Option<i64>) -> u8 {
    // clamp keeps the value in 0..=100, so the narrowing cast is lossless
    progress.unwrap_or(0).clamp(0, 100) as u8
}

pub fn status_label(status: Option<&JobStatus>) -> Cow<'static, str> {
    match status {
        Some(JobStatus::Starting) => Cow::Borrowed("Starting"),
        Some(JobStatus::Running) => Cow::Borrowed("Running"),
        Some(JobStatus::Processing) => Cow::Borrowed("Processing"),
        Some(JobStatus::Completed) => Cow::Borrowed("Completed"),
        Some(JobStatus::Failed) => Cow::Borrowed("Failed"),
        Some(JobStatus::Unknown(raw)) if !raw.is_empty() => Cow::Owned(raw.clone()),
        Some(JobStatus::Unknown(_)) | None => Cow::Borrowed(UNKNOWN_LABEL),
    }
}

pub fn status_badge_class(status: Option<&JobStatus>) -> &'static str {
    match status {
        Some(JobStatus::Starting) => "bg-info",
        Some(JobStatus::Running) => "bg-warning",
        Some(JobStatus::Processing) => "bg-primary",
        Some(JobStatus::Completed) => "bg-success",
        Some(JobStatus::Failed) => "bg-danger",
        Some(JobStatus::Unknown(_)) | None => "bg-secondary",
    }
}

pub fn status_alert_class(status: Option<&JobStatus>) -> &'static str {
    match status {
        Some(JobStatus::Starting) => "alert-info",
        Some(JobStatus::Running) => "alert-warning",
        Some(JobStatus::Processing) => "alert-primary",
        Some(JobStatus::Completed) => "alert-success",
        Some(JobStatus::Failed) => "alert-danger",
        Some(JobStatus::Unknown(_)) | None => "alert-info",
    }
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn active_jobs_banner_text(count: usize) -> String {
    format!("You have {count} active jobs. Progress updates automatically.")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

/// Progress card of the job-details page.
pub(crate) fn render_job_card(snapshot: &JobProgressSnapshot) -> Vec<ViewCommand> {
    let status = snapshot.status.as_ref();
    let status_name = status
        .map(JobStatus::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_STATUS);
    let progress = clamp_progress(snapshot.progress);
    let percent_text = format!("{progress}%");
    let badge_class = format!("badge {}", status_badge_class(status));

    vec![
        ViewCommand::visible(RegionId::ProgressCard, true),
        ViewCommand::class(
            RegionId::ProgressCard,
            format!("card progress-card mb-4 {status_name}"),
        ),
        ViewCommand::width(RegionId::ProgressBar, progress),
        ViewCommand::text(RegionId::ProgressText, percent_text.clone()),
        ViewCommand::text(RegionId::ProgressPercentage, percent_text),
        ViewCommand::text(RegionId::CurrentStatus, status_label(status)),
        ViewCommand::class(RegionId::CurrentStatus, badge_class.clone()),
        ViewCommand::text(
            RegionId::CurrentUrl,
            non_empty(snapshot.current_url.as_deref()).unwrap_or(FALLBACK_URL),
        ),
        ViewCommand::text(
            RegionId::PagesProcessed,
            snapshot.pages_processed.unwrap_or(0).to_string(),
        ),
        ViewCommand::text(
            RegionId::TotalPages,
            snapshot.total_pages.unwrap_or(0).to_string(),
        ),
        ViewCommand::text(
            RegionId::LastUpdate,
            non_empty(snapshot.updated_at.as_deref()).unwrap_or(FALLBACK_UPDATED_AT),
        ),
        ViewCommand::text(
            RegionId::ProgressMessage,
            non_empty(snapshot.message.as_deref()).unwrap_or(FALLBACK_MESSAGE),
        ),
        ViewCommand::text(RegionId::JobStatus, status_name),
        ViewCommand::class(RegionId::JobStatus, badge_class),
        ViewCommand::class(
            RegionId::StatusAlert,
            format!("alert {} mb-0", status_alert_class(status)),
        ),
    ]
}

/// Dashboard row progress bar plus the running-jobs counter.
pub(crate) fn render_job_row(
    snapshot: &JobProgressSnapshot,
    running_jobs: usize,
) -> Vec<ViewCommand> {
    let progress = clamp_progress(snapshot.progress);
    let row = RegionId::RowProgress(snapshot.job_id);
    vec![
        ViewCommand::width(row, progress),
        ViewCommand::text(row, format!("{progress}%")),
        ViewCommand::text(RegionId::RunningJobsCount, running_jobs.to_string()),
    ]
}

pub(crate) fn render_poll_error(message: String) -> Vec<ViewCommand> {
    vec![
        ViewCommand::text(RegionId::ProgressMessage, message),
        ViewCommand::class(RegionId::StatusAlert, "alert alert-danger mb-0"),
    ]
}

pub(crate) fn endpoint_error_message(error: &str) -> String {
    format!("{FETCH_ERROR_PREFIX}{error}")
}

pub(crate) fn render_active_jobs_banner(count: usize) -> Vec<ViewCommand> {
    vec![
        ViewCommand::text(RegionId::ActiveJobsText, active_jobs_banner_text(count)),
        ViewCommand::visible(RegionId::ActiveJobsAlert, true),
    ]
}

pub(crate) fn render_terminal_banner(outcome: TerminalOutcome) -> Vec<ViewCommand> {
    let title = match outcome {
        TerminalOutcome::Completed => "Job completed successfully",
        TerminalOutcome::Failed => "Job finished with an error",
        TerminalOutcome::Drained => return Vec::new(),
    };
    vec![
        ViewCommand::visible(RegionId::ProgressSpinner, false),
        ViewCommand::text(RegionId::ProgressTitle, title),
    ]
}

pub(crate) fn completion_toast(id: u64, outcome: TerminalOutcome) -> Option<Toast> {
    let (kind, title) = match outcome {
        TerminalOutcome::Completed => (ToastKind::Success, "Job completed successfully!"),
        TerminalOutcome::Failed => (ToastKind::Failure, "Job finished with an error!"),
        TerminalOutcome::Drained => return None,
    };
    Some(Toast {
        id,
        kind,
        title: title.to_string(),
        detail: RELOAD_NOTICE.to_string(),
    })
}

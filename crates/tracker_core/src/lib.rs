//! Tracker core: pure progress-poller state machine and view-model helpers.
//!
//! Nothing in this crate performs IO or reads a clock. Time enters as
//! messages (`Msg::PollTick`, `Msg::ElapsedTick`) and leaves as effects
//! (`Effect::StartTimers`, `Effect::ScheduleReload`, ...).
mod config;
mod effect;
mod msg;
mod preview;
mod render;
mod snapshot;
mod state;
mod update;
mod validation;
mod view_model;

pub use config::{PollerConfig, ViewKind};
pub use effect::{Effect, RELOAD_DELAY, TOAST_LIFETIME};
pub use msg::Msg;
pub use preview::{
    render_preview, truncate_for_cell, ExportPreview, JobInfoCard, PreviewFailure, PreviewJobInfo,
    PreviewSummary, PreviewView, SamplePage, SampleRow, StatusCodeClass, TruncatedText,
    VolumeCard, PREVIEW_SAMPLE_LIMIT, TITLE_CELL_LIMIT, URL_CELL_LIMIT,
};
pub use render::{
    active_jobs_banner_text, clamp_progress, format_elapsed, status_alert_class,
    status_badge_class, status_label, CONNECTION_ERROR_MESSAGE,
};
pub use snapshot::{JobId, JobProgressSnapshot, JobStatus, PageRow, PollFailure, RequestSeq};
pub use state::{PollerPhase, PollerState, PollerView, TerminalOutcome};
pub use update::update;
pub use validation::{
    validate_start_url, ButtonState, CreateJobForm, DeleteDialog, FieldError, FieldValidity,
    FormField, JobLimits, SubmitDecision, URL_SCHEME_MESSAGE,
};
pub use view_model::{
    apply_view_commands, RegionId, RegionMap, RegionUpdate, RegionValue, Toast, ToastKind,
    ViewBinder, ViewCommand,
};

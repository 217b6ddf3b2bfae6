use std::time::Duration;

use tracker_core::RegionId;

/// Regions of the job-details page.
pub const SINGLE_JOB_REGIONS: &[RegionId] = &[
    RegionId::ProgressCard,
    RegionId::ProgressBar,
    RegionId::ProgressText,
    RegionId::ProgressPercentage,
    RegionId::ProgressSpinner,
    RegionId::ProgressTitle,
    RegionId::CurrentStatus,
    RegionId::CurrentUrl,
    RegionId::PagesProcessed,
    RegionId::TotalPages,
    RegionId::LastUpdate,
    RegionId::ProgressMessage,
    RegionId::ExecutionTime,
    RegionId::JobStatus,
    RegionId::StatusAlert,
];

/// Fixed regions of the dashboard; row bars are added per listed job.
pub const DASHBOARD_REGIONS: &[RegionId] = &[
    RegionId::ActiveJobsAlert,
    RegionId::ActiveJobsText,
    RegionId::RunningJobsCount,
];

/// Regions whose text changes are printed as their own line instead of
/// being folded into the status line.
pub const ANNOUNCED_REGIONS: &[RegionId] = &[RegionId::ProgressTitle, RegionId::ActiveJobsText];

pub const BAR_WIDTH: usize = 20;
pub const CLOCK_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
pub const CLOCK_REFRESH: Duration = Duration::from_secs(1);
pub const PLACEHOLDER: &str = "-";

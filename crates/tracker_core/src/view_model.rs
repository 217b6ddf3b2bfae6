use std::collections::BTreeMap;

use crate::JobId;

/// A named page region the poller writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    ProgressCard,
    ProgressBar,
    ProgressText,
    ProgressPercentage,
    ProgressSpinner,
    ProgressTitle,
    CurrentStatus,
    CurrentUrl,
    PagesProcessed,
    TotalPages,
    LastUpdate,
    ProgressMessage,
    ExecutionTime,
    JobStatus,
    StatusAlert,
    ActiveJobsAlert,
    ActiveJobsText,
    RunningJobsCount,
    /// Per-row progress bar on the dashboard.
    RowProgress(JobId),
}

impl RegionId {
    /// Element id the server-rendered page uses for this region.
    pub fn element_id(&self) -> String {
        let fixed = match self {
            RegionId::ProgressCard => "progress-card",
            RegionId::ProgressBar => "progress-bar",
            RegionId::ProgressText => "progress-text",
            RegionId::ProgressPercentage => "progress-percentage",
            RegionId::ProgressSpinner => "progress-spinner",
            RegionId::ProgressTitle => "progress-title",
            RegionId::CurrentStatus => "current-status",
            RegionId::CurrentUrl => "current-url",
            RegionId::PagesProcessed => "pages-processed",
            RegionId::TotalPages => "total-pages",
            RegionId::LastUpdate => "last-update",
            RegionId::ProgressMessage => "progress-message",
            RegionId::ExecutionTime => "execution-time",
            RegionId::JobStatus => "job-status",
            RegionId::StatusAlert => "status-alert",
            RegionId::ActiveJobsAlert => "active-jobs-alert",
            RegionId::ActiveJobsText => "active-jobs-text",
            RegionId::RunningJobsCount => "running-jobs",
            RegionId::RowProgress(job_id) => return format!("progress-{job_id}"),
        };
        fixed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionUpdate {
    Text(String),
    Class(String),
    /// Progress-bar width, already clamped to 0..=100.
    WidthPercent(u8),
    Visible(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Region {
        region: RegionId,
        update: RegionUpdate,
    },
    ShowToast(Toast),
    RemoveToast {
        toast_id: u64,
    },
}

impl ViewCommand {
    pub fn text(region: RegionId, text: impl Into<String>) -> Self {
        Self::Region {
            region,
            update: RegionUpdate::Text(text.into()),
        }
    }

    pub fn class(region: RegionId, class: impl Into<String>) -> Self {
        Self::Region {
            region,
            update: RegionUpdate::Class(class.into()),
        }
    }

    pub fn width(region: RegionId, percent: u8) -> Self {
        Self::Region {
            region,
            update: RegionUpdate::WidthPercent(percent),
        }
    }

    pub fn visible(region: RegionId, visible: bool) -> Self {
        Self::Region {
            region,
            update: RegionUpdate::Visible(visible),
        }
    }
}

/// Host-side sink for view commands.
///
/// `update_region` returns `false` when the page has no such region; the
/// caller moves on to the next command.
pub trait ViewBinder {
    fn update_region(&mut self, region: RegionId, update: &RegionUpdate) -> bool;
    fn show_toast(&mut self, toast: &Toast);
    fn remove_toast(&mut self, toast_id: u64);
}

/// Applies each command independently. Returns how many region updates landed.
pub fn apply_view_commands(binder: &mut dyn ViewBinder, commands: &[ViewCommand]) -> usize {
    let mut applied = 0;
    for command in commands {
        match command {
            ViewCommand::Region { region, update } => {
                if binder.update_region(*region, update) {
                    applied += 1;
                } else {
                    tracker_logging::tracker_trace!(
                        "region {} absent, skipped",
                        region.element_id()
                    );
                }
            }
            ViewCommand::ShowToast(toast) => binder.show_toast(toast),
            ViewCommand::RemoveToast { toast_id } => binder.remove_toast(*toast_id),
        }
    }
    applied
}

/// Current contents of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionValue {
    pub text: Option<String>,
    pub class: Option<String>,
    pub width_percent: Option<u8>,
    pub visible: bool,
}

impl Default for RegionValue {
    fn default() -> Self {
        Self {
            text: None,
            class: None,
            width_percent: None,
            visible: true,
        }
    }
}

/// Optional-reference map of page regions.
///
/// Only regions registered up front exist; updates to anything else are
/// reported as absent rather than created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionMap {
    regions: BTreeMap<RegionId, RegionValue>,
    toasts: Vec<Toast>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions(regions: impl IntoIterator<Item = RegionId>) -> Self {
        let mut map = Self::new();
        for region in regions {
            map.insert(region);
        }
        map
    }

    pub fn insert(&mut self, region: RegionId) {
        self.regions.entry(region).or_default();
    }

    pub fn get(&self, region: RegionId) -> Option<&RegionValue> {
        self.regions.get(&region)
    }

    pub fn text(&self, region: RegionId) -> Option<&str> {
        self.get(region).and_then(|value| value.text.as_deref())
    }

    pub fn class(&self, region: RegionId) -> Option<&str> {
        self.get(region).and_then(|value| value.class.as_deref())
    }

    pub fn regions(&self) -> impl Iterator<Item = (&RegionId, &RegionValue)> {
        self.regions.iter()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}

impl ViewBinder for RegionMap {
    fn update_region(&mut self, region: RegionId, update: &RegionUpdate) -> bool {
        let Some(value) = self.regions.get_mut(&region) else {
            return false;
        };
        match update {
            RegionUpdate::Text(text) => value.text = Some(text.clone()),
            RegionUpdate::Class(class) => value.class = Some(class.clone()),
            RegionUpdate::WidthPercent(percent) => value.width_percent = Some(*percent),
            RegionUpdate::Visible(visible) => value.visible = *visible,
        }
        true
    }

    fn show_toast(&mut self, toast: &Toast) {
        self.toasts.push(toast.clone());
    }

    fn remove_toast(&mut self, toast_id: u64) {
        self.toasts.retain(|toast| toast.id != toast_id);
    }
}

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, NaiveDateTime, TimeZone};
use tracker_core::{
    clamp_progress, status_label, FormField, JobProgressSnapshot, PageRow, PreviewSummary,
    PreviewView, RegionId, RegionMap, RegionUpdate, Toast, ToastKind, ViewBinder,
};

use super::constants::*;

const ROW_BAR_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Blank,
    SingleJob,
    Dashboard,
}

/// Terminal rendition of a page: a status line redrawn in place, with
/// toasts and banners printed above it.
pub struct TerminalView<W: Write> {
    layout: Layout,
    heading: String,
    regions: RegionMap,
    out: W,
    line_width: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            layout: Layout::Blank,
            heading: String::new(),
            regions: RegionMap::new(),
            out,
            line_width: 0,
        }
    }

    pub fn show_single_job(&mut self, job_id: u64) {
        self.layout = Layout::SingleJob;
        self.heading = format!("Job #{job_id}");
        self.regions = RegionMap::with_regions(SINGLE_JOB_REGIONS.iter().copied());
    }

    pub fn show_dashboard(&mut self, rows: &[PageRow]) {
        self.layout = Layout::Dashboard;
        self.heading = "Dashboard".to_string();
        self.regions = RegionMap::with_regions(
            DASHBOARD_REGIONS
                .iter()
                .copied()
                .chain(rows.iter().map(|row| RegionId::RowProgress(row.job_id))),
        );
    }

    #[cfg(test)]
    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    pub fn redraw(&mut self, clock: &str) -> io::Result<()> {
        let body = match self.layout {
            Layout::Blank => return Ok(()),
            Layout::SingleJob => job_status_line(&self.regions),
            Layout::Dashboard => dashboard_status_line(&self.regions),
        };
        let line = format!("[{clock}] {} | {body}", self.heading);
        let width = line.chars().count();
        let pad = self.line_width.saturating_sub(width);
        write!(self.out, "\r{line}{:pad$}", "")?;
        self.out.flush()?;
        self.line_width = width;
        Ok(())
    }

    /// Prints `text` on its own line, clearing the status line first.
    pub fn print_line(&mut self, text: &str) -> io::Result<()> {
        if self.line_width > 0 {
            write!(self.out, "\r{:width$}\r", "", width = self.line_width)?;
            self.line_width = 0;
        }
        writeln!(self.out, "{text}")
    }

    /// Leaves the cursor below the last status line.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.line_width > 0 {
            writeln!(self.out)?;
            self.line_width = 0;
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ViewBinder for TerminalView<W> {
    fn update_region(&mut self, region: RegionId, update: &RegionUpdate) -> bool {
        if !self.regions.update_region(region, update) {
            return false;
        }
        if let RegionUpdate::Text(text) = update {
            if ANNOUNCED_REGIONS.contains(&region) && !text.is_empty() {
                let _ = self.print_line(text);
            }
        }
        true
    }

    fn show_toast(&mut self, toast: &Toast) {
        self.regions.show_toast(toast);
        let _ = self.print_line(&toast_line(toast));
    }

    fn remove_toast(&mut self, toast_id: u64) {
        self.regions.remove_toast(toast_id);
    }
}

pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn region_text(regions: &RegionMap, region: RegionId) -> &str {
    regions
        .text(region)
        .filter(|text| !text.is_empty())
        .unwrap_or(PLACEHOLDER)
}

pub fn job_status_line(regions: &RegionMap) -> String {
    if regions
        .get(RegionId::ProgressCard)
        .is_some_and(|card| !card.visible)
    {
        return "no longer active".to_string();
    }
    let percent = regions
        .get(RegionId::ProgressBar)
        .and_then(|bar| bar.width_percent)
        .unwrap_or(0);
    let text = |region| region_text(regions, region);
    format!(
        "{status} {bar} {pct} | pages {done}/{total} | {url} | {message} | elapsed {elapsed} | updated {updated}",
        status = text(RegionId::CurrentStatus),
        bar = progress_bar(percent, BAR_WIDTH),
        pct = text(RegionId::ProgressPercentage),
        done = text(RegionId::PagesProcessed),
        total = text(RegionId::TotalPages),
        url = text(RegionId::CurrentUrl),
        message = text(RegionId::ProgressMessage),
        elapsed = text(RegionId::ExecutionTime),
        updated = text(RegionId::LastUpdate),
    )
}

pub fn dashboard_status_line(regions: &RegionMap) -> String {
    let rows: Vec<String> = regions
        .regions()
        .filter_map(|(region, value)| match region {
            RegionId::RowProgress(job_id) => Some(format!(
                "#{job_id} {} {}",
                progress_bar(value.width_percent.unwrap_or(0), ROW_BAR_WIDTH),
                value.text.as_deref().unwrap_or(PLACEHOLDER)
            )),
            _ => None,
        })
        .collect();
    format!(
        "{} running | {}",
        region_text(regions, RegionId::RunningJobsCount),
        rows.join(" | ")
    )
}

pub fn toast_line(toast: &Toast) -> String {
    let marker = match toast.kind {
        ToastKind::Success => "[ok]",
        ToastKind::Failure => "[!!]",
    };
    format!("{marker} {} {}", toast.title, toast.detail)
}

/// One-shot summary of a job that is not being polled.
pub fn snapshot_summary(snapshot: &JobProgressSnapshot) -> String {
    let mut line = format!(
        "Job #{}: {} {}%",
        snapshot.job_id,
        status_label(snapshot.status.as_ref()),
        clamp_progress(snapshot.progress)
    );
    if let (Some(done), Some(total)) = (snapshot.pages_processed, snapshot.total_pages) {
        line.push_str(&format!(" (pages {done}/{total})"));
    }
    if let Some(message) = snapshot.message.as_deref().filter(|m| !m.is_empty()) {
        line.push_str(&format!(" | {message}"));
    }
    line
}

pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format(CLOCK_FORMAT).to_string()
}

/// Reformats an ISO-8601 timestamp for display, leaving anything else as is.
pub fn format_created_at(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(CLOCK_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format(CLOCK_FORMAT).to_string();
        }
    }
    raw.to_string()
}

pub fn preview_lines(view: &PreviewView) -> Vec<String> {
    match view {
        PreviewView::Loading => vec!["Preparing export data...".to_string()],
        PreviewView::Failed { message } => vec![message.clone()],
        PreviewView::Ready(summary) => summary_lines(summary),
    }
}

fn summary_lines(summary: &PreviewSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Job:     {}", summary.job.name),
        format!("Status:  {}", summary.job.status),
        format!("Created: {}", format_created_at(&summary.job.created_at)),
        String::new(),
        format!("Pages:          {}", summary.volume.total_pages),
        format!("Links:          {}", summary.volume.total_links),
        format!("Estimated size: {}", summary.volume.size_estimate),
        String::new(),
    ];
    if !summary.has_samples() {
        lines.push("No data to export.".to_string());
        return lines;
    }
    lines.push(format!(
        "{:<43}  {:<33}  {:>6}  {:>6}  {:>5}  {:>5}",
        "URL", "Title", "Status", "Words", "Links", "Depth"
    ));
    for row in &summary.samples {
        let title = row
            .title
            .as_ref()
            .map_or("No title", |title| title.display.as_str());
        lines.push(format!(
            "{:<43}  {:<33}  {:>6}  {:>6}  {:>5}  {:>5}",
            row.url.display, title, row.status_code, row.word_count, row.link_count, row.depth
        ));
    }
    lines
}

pub fn field_label(field: FormField) -> &'static str {
    match field {
        FormField::JobName => "Job name",
        FormField::StartUrl => "Start URL",
        FormField::MaxPages => "Max pages",
        FormField::MaxDepth => "Max depth",
        FormField::Delay => "Delay",
    }
}

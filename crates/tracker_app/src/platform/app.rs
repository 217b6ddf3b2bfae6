use std::io::{self, BufRead, Write};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::Local;
use tracker_core::{
    apply_view_commands, render_preview, update, validate_start_url, ButtonState, CreateJobForm,
    DeleteDialog, Effect, FieldValidity, JobId, JobLimits, Msg, PageRow, PollerConfig,
    PollerPhase, PollerState, RequestSeq, SubmitDecision,
};
use tracker_engine::{ActiveJob, EngineEvent, EngineHandle, PollError, ScheduledEvent};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use super::config::TrackerConfig;
use super::effects::{map_preview, map_progress, page_rows, poller_msg, EffectRunner};
use super::logging;
use super::ui::constants::CLOCK_REFRESH;
use super::ui::render::{
    clock_text, field_label, preview_lines, snapshot_summary, TerminalView,
};
use crate::{Cli, Command, FormArgs};

/// Sequence number of the page-load fetch; poller requests start at 1.
const PAGE_LOAD_SEQ: RequestSeq = 0;

const ENGINE_STOPPED: &str = "engine thread stopped unexpectedly";

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = TrackerConfig::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(cookie) = cli.cookie {
        config.session_cookie = Some(cookie);
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }

    logging::initialize(
        config.log_destination,
        config.level_filter()?,
        &config.log_file,
    );
    tracker_info!("crawl-tracker starting against {}", config.base_url);

    if let Command::Check(form) = cli.command {
        return check_form(form, io::stdout().lock());
    }

    let engine = EngineHandle::new(config.client_settings()).context("cannot build HTTP client")?;
    let stdout = io::stdout().lock();
    match cli.command {
        Command::Watch { job_id } => {
            PollingPage::new(&engine, Page::SingleJob(job_id), config.single_job_poller(), stdout)
                .run()
        }
        Command::Dashboard => {
            PollingPage::new(&engine, Page::Dashboard, config.dashboard_poller(), stdout).run()
        }
        Command::Preview { job_id } => show_preview(&engine, job_id, stdout),
        Command::Delete { job_id, name, yes } => {
            let dialog = DeleteDialog::confirm(job_id, name.unwrap_or_else(|| format!("#{job_id}")));
            delete_job(&engine, &dialog, yes, io::stdin().lock(), stdout)
        }
        Command::Check(_) => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    SingleJob(JobId),
    Dashboard,
}

/// A page that polls: loads, hands the result to the poller, and re-runs
/// the load whenever the poller asks for a reload.
struct PollingPage<'a, W: Write> {
    engine: &'a EngineHandle,
    page: Page,
    poller_config: PollerConfig,
    state: PollerState,
    view: TerminalView<W>,
    loads: u32,
    loading: bool,
    reload_pending: bool,
    done: bool,
}

impl<'a, W: Write> PollingPage<'a, W> {
    fn new(engine: &'a EngineHandle, page: Page, poller_config: PollerConfig, out: W) -> Self {
        Self {
            engine,
            page,
            state: PollerState::new(poller_config.clone()),
            poller_config,
            view: TerminalView::new(out),
            loads: 0,
            loading: false,
            reload_pending: false,
            done: false,
        }
    }

    fn run(mut self) -> anyhow::Result<()> {
        self.load();
        let mut next_clock = Instant::now();
        while !self.done {
            if Instant::now() >= next_clock {
                self.view.redraw(&clock_text(&Local::now()))?;
                next_clock = Instant::now() + CLOCK_REFRESH;
            }
            let wait = next_clock.saturating_duration_since(Instant::now());
            match self.engine.recv_timeout(wait) {
                Ok(event) => {
                    self.handle_event(event)?;
                    if !self.done {
                        self.view.redraw(&clock_text(&Local::now()))?;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => bail!(ENGINE_STOPPED),
            }
        }
        self.engine.cancel_timers();
        self.view.finish()?;
        Ok(())
    }

    fn load(&mut self) {
        self.loading = true;
        match self.page {
            Page::SingleJob(job_id) => self.engine.fetch_progress(job_id, PAGE_LOAD_SEQ),
            Page::Dashboard => self.engine.fetch_active_jobs(),
        }
    }

    fn handle_event(&mut self, event: EngineEvent) -> anyhow::Result<()> {
        match event {
            EngineEvent::ProgressFetched {
                job_id,
                seq: PAGE_LOAD_SEQ,
                result,
            } if self.loading => self.job_loaded(job_id, result),
            EngineEvent::ActiveJobsFetched { result } if self.loading => {
                self.dashboard_loaded(result)
            }
            EngineEvent::Scheduled(ScheduledEvent::Reload) => {
                tracker_info!("reloading {:?}", self.page);
                self.reload_pending = false;
                self.loads += 1;
                self.load();
                Ok(())
            }
            other => {
                if let Some(msg) = poller_msg(&other) {
                    self.dispatch(msg)?;
                }
                Ok(())
            }
        }
    }

    fn job_loaded(
        &mut self,
        job_id: JobId,
        result: Result<tracker_engine::ProgressPayload, PollError>,
    ) -> anyhow::Result<()> {
        self.loading = false;
        let snapshot = match map_progress(job_id, result) {
            Ok(snapshot) => snapshot,
            Err(failure) => bail!("cannot load job #{job_id}: {failure}"),
        };
        if let Some(error) = snapshot.error.as_deref() {
            bail!("cannot load job #{job_id}: {error}");
        }

        let is_job_active = snapshot.active && !snapshot.is_terminal();
        // After a reload the page shows the final state; it never polls again.
        if self.loads > 0 || !is_job_active {
            self.view.print_line(&snapshot_summary(&snapshot))?;
            self.done = true;
            return Ok(());
        }

        self.view.show_single_job(job_id);
        self.state = PollerState::reloaded(self.poller_config.clone(), &self.state);
        self.dispatch(Msg::Attach {
            job_id,
            is_job_active,
        })
    }

    fn dashboard_loaded(&mut self, result: Result<Vec<ActiveJob>, PollError>) -> anyhow::Result<()> {
        self.loading = false;
        let jobs = result.context("cannot list active jobs")?;
        let rows = page_rows(&jobs);
        if !rows.iter().any(PageRow::is_in_flight) {
            self.view.print_line("No active jobs.")?;
            self.done = true;
            return Ok(());
        }

        for row in &rows {
            self.view
                .print_line(&format!("Job #{}: {}", row.job_id, row.status_badge))?;
        }
        self.view.show_dashboard(&rows);
        self.state = PollerState::reloaded(self.poller_config.clone(), &self.state);
        self.dispatch(Msg::PageLoaded { rows })
    }

    fn dispatch(&mut self, msg: Msg) -> anyhow::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let commands = state.take_view_commands();
        self.state = state;

        apply_view_commands(&mut self.view, &commands);
        if effects
            .iter()
            .any(|effect| matches!(effect, Effect::ScheduleReload { .. } | Effect::Reload))
        {
            self.reload_pending = true;
        }
        EffectRunner::new(self.engine).enqueue(effects);

        if self.state.phase() == PollerPhase::Terminal && !self.reload_pending {
            tracker_debug!("poller finished without reload");
            self.done = true;
        }
        Ok(())
    }
}

/// Blocks until `pick` accepts an event. Fails once the engine thread is gone.
fn wait_for<T>(
    engine: &EngineHandle,
    mut pick: impl FnMut(EngineEvent) -> Option<T>,
) -> anyhow::Result<T> {
    loop {
        match engine.recv_timeout(CLOCK_REFRESH) {
            Ok(event) => {
                if let Some(value) = pick(event) {
                    return Ok(value);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => bail!(ENGINE_STOPPED),
        }
    }
}

fn show_preview(engine: &EngineHandle, job_id: JobId, mut out: impl Write) -> anyhow::Result<()> {
    for line in preview_lines(&tracker_core::PreviewView::Loading) {
        writeln!(out, "{line}")?;
    }
    engine.fetch_preview(job_id);
    let result = wait_for(engine, |event| match event {
        EngineEvent::PreviewFetched {
            job_id: fetched,
            result,
        } if fetched == job_id => Some(result),
        _ => None,
    })?;
    let view = render_preview(map_preview(job_id, result));
    for line in preview_lines(&view) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn delete_job(
    engine: &EngineHandle,
    dialog: &DeleteDialog,
    confirmed: bool,
    mut input: impl BufRead,
    mut out: impl Write,
) -> anyhow::Result<()> {
    writeln!(
        out,
        "Delete job \"{}\"? Its crawled pages are removed as well.",
        dialog.job_name
    )?;
    if !confirmed {
        write!(out, "Type 'yes' to confirm: ")?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "yes") {
            writeln!(out, "Cancelled.")?;
            return Ok(());
        }
    }

    let mut button = ButtonState::new("Delete");
    button.show_loading(DeleteDialog::BUSY_LABEL);
    writeln!(out, "{}", button.label())?;
    engine.delete_job(dialog.job_id);
    let result = wait_for(engine, |event| match event {
        EngineEvent::JobDeleted { job_id, result } if job_id == dialog.job_id => Some(result),
        _ => None,
    })?;
    match result {
        Ok(()) => {
            tracker_info!("deleted job {} via {}", dialog.job_id, dialog.action);
            writeln!(out, "Job \"{}\" deleted.", dialog.job_name)?;
            Ok(())
        }
        Err(err) => {
            button.hide_loading();
            tracker_warn!("delete of job {} failed: {}", dialog.job_id, err);
            bail!("cannot delete job \"{}\": {err}", dialog.job_name)
        }
    }
}

fn check_form(args: FormArgs, mut out: impl Write) -> anyhow::Result<()> {
    let form = CreateJobForm {
        job_name: args.name,
        start_url: args.url.trim().to_string(),
        max_pages: args.max_pages,
        max_depth: args.max_depth,
        delay: args.delay,
    };

    if validate_start_url(&form.start_url) == FieldValidity::Valid {
        writeln!(out, "Start URL: ok")?;
    }

    let limits = (!args.admin).then(JobLimits::default);
    let mut button = ButtonState::new("Create job");
    match form.submit(&mut button, limits.as_ref()) {
        SubmitDecision::Proceed => {
            writeln!(out, "Form is valid ({})", button.label())?;
            Ok(())
        }
        SubmitDecision::Cancel(errors) => {
            for error in &errors {
                writeln!(out, "{}: {}", field_label(error.field), error.message)?;
            }
            bail!("{} invalid field(s)", errors.len())
        }
    }
}

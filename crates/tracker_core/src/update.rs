use tracker_logging::{tracker_debug, tracker_info, tracker_poll_warn};

use crate::render::{
    clamp_progress, completion_toast, endpoint_error_message, render_active_jobs_banner,
    render_job_card, render_job_row, render_poll_error, render_terminal_banner,
    CONNECTION_ERROR_MESSAGE,
};
use crate::view_model::{RegionId, ViewCommand};
use crate::{
    format_elapsed, Effect, JobId, JobProgressSnapshot, JobStatus, Msg, PollFailure, PollerPhase,
    PollerState, RequestSeq, TerminalOutcome, ViewKind, RELOAD_DELAY, TOAST_LIFETIME,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// View changes are queued on the state and drained with
/// [`PollerState::take_view_commands`].
pub fn update(mut state: PollerState, msg: Msg) -> (PollerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Attach {
            job_id,
            is_job_active,
        } => {
            if state.phase() != PollerPhase::Idle || !is_job_active {
                return (state, Vec::new());
            }
            start_tracking(&mut state, [job_id])
        }
        Msg::PageLoaded { rows } => {
            if state.phase() != PollerPhase::Idle {
                return (state, Vec::new());
            }
            let jobs: Vec<JobId> = rows
                .iter()
                .filter(|row| row.is_in_flight())
                .map(|row| row.job_id)
                .collect();
            if jobs.is_empty() {
                return (state, Vec::new());
            }
            start_tracking(&mut state, jobs)
        }
        Msg::PollTick => {
            if state.phase() != PollerPhase::Polling {
                return (state, Vec::new());
            }
            fetch_all(&mut state)
        }
        Msg::ElapsedTick { elapsed } => {
            if state.phase() == PollerPhase::Polling && state.config().show_elapsed_time() {
                state.emit([ViewCommand::text(
                    RegionId::ExecutionTime,
                    format_elapsed(elapsed),
                )]);
            }
            Vec::new()
        }
        Msg::ProgressReceived {
            job_id,
            seq,
            result,
        } => apply_response(&mut state, job_id, seq, result),
        Msg::ToastExpired { toast_id } | Msg::ToastDismissed { toast_id } => {
            state.remove_toast(toast_id);
            Vec::new()
        }
    };

    (state, effects)
}

fn start_tracking(state: &mut PollerState, jobs: impl IntoIterator<Item = JobId>) -> Vec<Effect> {
    let tracked = state.begin_polling(jobs);
    tracker_info!("tracking {} job(s): {:?}", tracked.len(), tracked);
    if state.config().view == ViewKind::Dashboard {
        let banner = render_active_jobs_banner(tracked.len());
        state.emit(banner);
    }

    let config = *state.config();
    let mut effects = Vec::with_capacity(1 + tracked.len());
    effects.push(Effect::StartTimers {
        poll_interval: config.poll_interval,
        elapsed_interval: config.elapsed_interval,
    });
    effects.extend(fetch_all(state));
    effects
}

fn fetch_all(state: &mut PollerState) -> Vec<Effect> {
    state
        .issue_requests()
        .into_iter()
        .map(|(job_id, seq)| Effect::FetchProgress { job_id, seq })
        .collect()
}

fn apply_response(
    state: &mut PollerState,
    job_id: JobId,
    seq: RequestSeq,
    result: Result<JobProgressSnapshot, PollFailure>,
) -> Vec<Effect> {
    if state.phase() != PollerPhase::Polling {
        tracker_debug!("job={job_id} seq={seq} dropped: poller not polling");
        return Vec::new();
    }
    let Some(job) = state.job_mut(job_id) else {
        tracker_debug!("job={job_id} seq={seq} dropped: job not tracked");
        return Vec::new();
    };
    if seq <= job.applied_seq {
        tracker_debug!(
            "job={job_id} seq={seq} dropped: newer response {} already applied",
            job.applied_seq
        );
        return Vec::new();
    }
    job.applied_seq = seq;

    let snapshot = match result {
        Ok(snapshot) => snapshot,
        Err(failure) => {
            tracker_poll_warn!(job_id, "progress request failed: {failure}");
            state.emit(render_poll_error(CONNECTION_ERROR_MESSAGE.to_string()));
            return Vec::new();
        }
    };

    if let Some(error) = snapshot.error.as_deref() {
        tracker_poll_warn!(job_id, "endpoint reported error: {error}");
        state.emit(render_poll_error(endpoint_error_message(error)));
        return Vec::new();
    }

    if snapshot.is_terminal() {
        render_snapshot(state, job_id, &snapshot);
        let outcome = match snapshot.status {
            Some(JobStatus::Failed) => TerminalOutcome::Failed,
            _ => TerminalOutcome::Completed,
        };
        return finish(state, outcome);
    }

    if !snapshot.active {
        return drain_job(state, job_id);
    }

    render_snapshot(state, job_id, &snapshot);
    Vec::new()
}

fn render_snapshot(state: &mut PollerState, job_id: JobId, snapshot: &JobProgressSnapshot) {
    if let Some(job) = state.job_mut(job_id) {
        job.last_status = snapshot.status.clone();
        job.last_progress = clamp_progress(snapshot.progress);
    }
    let commands = match state.config().view {
        ViewKind::SingleJob => render_job_card(snapshot),
        ViewKind::Dashboard => render_job_row(snapshot, state.tracked_count()),
    };
    state.emit(commands);
}

fn drain_job(state: &mut PollerState, job_id: JobId) -> Vec<Effect> {
    if !state.untrack(job_id) {
        return Vec::new();
    }
    tracker_info!("job={job_id} no longer active");
    if state.config().view == ViewKind::SingleJob {
        state.emit([ViewCommand::visible(RegionId::ProgressCard, false)]);
    }
    if state.tracked_count() > 0 {
        let remaining = state.tracked_count().to_string();
        state.emit([ViewCommand::text(RegionId::RunningJobsCount, remaining)]);
        return Vec::new();
    }
    finish(state, TerminalOutcome::Drained)
}

fn finish(state: &mut PollerState, outcome: TerminalOutcome) -> Vec<Effect> {
    tracker_info!("poller terminal: {outcome:?}");
    state.finish(outcome);

    let config = *state.config();
    let mut effects = vec![Effect::CancelTimers];
    if config.view == ViewKind::Dashboard {
        state.emit([ViewCommand::visible(RegionId::ActiveJobsAlert, false)]);
    }
    state.emit(render_terminal_banner(outcome));

    if let Some(toast_id) = state.push_toast(|id| completion_toast(id, outcome)) {
        effects.push(Effect::ScheduleToastExpiry {
            toast_id,
            delay: TOAST_LIFETIME,
        });
    }

    match outcome {
        TerminalOutcome::Completed | TerminalOutcome::Failed if config.reload_on_terminal => {
            effects.push(Effect::ScheduleReload {
                delay: RELOAD_DELAY,
            });
        }
        TerminalOutcome::Drained if config.reload_when_drained => {
            effects.push(Effect::Reload);
        }
        _ => {}
    }
    effects
}

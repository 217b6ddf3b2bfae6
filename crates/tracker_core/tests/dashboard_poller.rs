use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tracker_core::{
    apply_view_commands, update, Effect, JobProgressSnapshot, JobStatus, Msg, PageRow,
    PollerConfig, PollerPhase, PollerState, RegionId, RegionMap, TerminalOutcome,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

fn dashboard_page(jobs: &[u64]) -> RegionMap {
    let mut page = RegionMap::with_regions([
        RegionId::ActiveJobsAlert,
        RegionId::ActiveJobsText,
        RegionId::RunningJobsCount,
    ]);
    for job_id in jobs {
        page.insert(RegionId::RowProgress(*job_id));
    }
    page
}

fn load(rows: Vec<PageRow>, page: &mut RegionMap) -> (PollerState, Vec<Effect>) {
    let (mut state, effects) = update(
        PollerState::new(PollerConfig::dashboard()),
        Msg::PageLoaded { rows },
    );
    apply_view_commands(page, &state.take_view_commands());
    (state, effects)
}

fn receive(
    state: PollerState,
    job_id: u64,
    seq: u64,
    snapshot: JobProgressSnapshot,
    page: &mut RegionMap,
) -> (PollerState, Vec<Effect>) {
    let (mut state, effects) = update(
        state,
        Msg::ProgressReceived {
            job_id,
            seq,
            result: Ok(snapshot),
        },
    );
    apply_view_commands(page, &state.take_view_commands());
    (state, effects)
}

#[test]
fn page_load_tracks_in_flight_rows_and_shows_banner() {
    init_logging();
    let mut page = dashboard_page(&[1, 2, 3]);
    let (state, effects) = load(
        vec![
            PageRow::new(1, "running"),
            PageRow::new(2, "completed"),
            PageRow::new(3, "running"),
        ],
        &mut page,
    );

    assert_eq!(state.view().tracked_jobs, vec![1, 3]);
    assert_eq!(
        effects,
        vec![
            Effect::StartTimers {
                poll_interval: Duration::from_millis(5000),
                elapsed_interval: None,
            },
            Effect::FetchProgress { job_id: 1, seq: 1 },
            Effect::FetchProgress { job_id: 3, seq: 1 },
        ]
    );
    assert!(page.get(RegionId::ActiveJobsAlert).unwrap().visible);
    assert_eq!(
        page.text(RegionId::ActiveJobsText),
        Some("You have 2 active jobs. Progress updates automatically.")
    );
}

#[test]
fn page_without_running_rows_never_polls() {
    init_logging();
    let mut page = dashboard_page(&[4]);
    let (state, effects) = load(vec![PageRow::new(4, "failed")], &mut page);

    assert_eq!(state.phase(), PollerPhase::Idle);
    assert!(effects.is_empty());
}

#[test]
fn active_row_update_sets_width_and_counter() {
    init_logging();
    let mut page = dashboard_page(&[1, 3]);
    let (state, _) = load(
        vec![PageRow::new(1, "running"), PageRow::new(3, "running")],
        &mut page,
    );
    let snapshot = JobProgressSnapshot::new(1, true)
        .with_status(JobStatus::Running)
        .with_progress(-5);
    let (_state, effects) = receive(state, 1, 1, snapshot, &mut page);

    assert!(effects.is_empty());
    let row = page.get(RegionId::RowProgress(1)).unwrap();
    assert_eq!(row.width_percent, Some(0));
    assert_eq!(row.text.as_deref(), Some("0%"));
    assert_eq!(page.text(RegionId::RunningJobsCount), Some("2"));
}

#[test]
fn each_inactive_job_is_removed_exactly_once() {
    init_logging();
    let mut page = dashboard_page(&[1, 3]);
    let (state, _) = load(
        vec![PageRow::new(1, "running"), PageRow::new(3, "running")],
        &mut page,
    );
    let inactive = JobProgressSnapshot::new(1, false);

    let (state, effects) = receive(state, 1, 1, inactive.clone(), &mut page);
    assert!(effects.is_empty());
    assert_eq!(state.view().tracked_jobs, vec![3]);
    assert_eq!(page.text(RegionId::RunningJobsCount), Some("1"));

    let (state, effects) = receive(state, 1, 2, inactive, &mut page);
    assert!(effects.is_empty());
    assert_eq!(state.view().tracked_jobs, vec![3]);
    assert_eq!(state.phase(), PollerPhase::Polling);

    let (_state, effects) = update(state, Msg::PollTick);
    assert_eq!(effects, vec![Effect::FetchProgress { job_id: 3, seq: 2 }]);
}

#[test]
fn last_inactive_job_cancels_timers_and_reloads() {
    init_logging();
    let mut page = dashboard_page(&[5]);
    let (state, _) = load(vec![PageRow::new(5, "running")], &mut page);
    let (state, effects) = receive(state, 5, 1, JobProgressSnapshot::new(5, false), &mut page);

    assert_eq!(effects, vec![Effect::CancelTimers, Effect::Reload]);
    assert_eq!(state.view().outcome, Some(TerminalOutcome::Drained));
    assert!(state.view().tracked_jobs.is_empty());
    assert!(!page.get(RegionId::ActiveJobsAlert).unwrap().visible);

    let (_state, effects) = update(state, Msg::PollTick);
    assert!(effects.is_empty());
}

#[test]
fn completed_job_on_dashboard_stops_everything() {
    init_logging();
    let mut page = dashboard_page(&[1, 2]);
    let (state, _) = load(
        vec![PageRow::new(1, "running"), PageRow::new(2, "running")],
        &mut page,
    );
    let done = JobProgressSnapshot::new(2, true)
        .with_status(JobStatus::Completed)
        .with_progress(100);
    let (state, effects) = receive(state, 2, 1, done, &mut page);

    assert_eq!(effects[0], Effect::CancelTimers);
    assert_eq!(state.phase(), PollerPhase::Terminal);
    assert_eq!(page.get(RegionId::RowProgress(2)).unwrap().width_percent, Some(100));

    // A late response for the other job lands after the poller stopped.
    let (_state, effects) = receive(
        state,
        1,
        1,
        JobProgressSnapshot::new(1, true).with_progress(50),
        &mut page,
    );
    assert!(effects.is_empty());
    assert_eq!(page.get(RegionId::RowProgress(1)).unwrap().width_percent, None);
}

#[test]
fn responses_from_before_a_reload_stay_stale() {
    init_logging();
    let mut page = dashboard_page(&[2]);
    let (mut old, _) = load(vec![PageRow::new(2, "running")], &mut page);
    for _ in 0..6 {
        old = update(old, Msg::PollTick).0;
    }

    let mut page = dashboard_page(&[2]);
    let (mut state, effects) = update(
        PollerState::reloaded(PollerConfig::dashboard(), &old),
        Msg::PageLoaded {
            rows: vec![PageRow::new(2, "running")],
        },
    );
    apply_view_commands(&mut page, &state.take_view_commands());
    assert!(effects.contains(&Effect::FetchProgress { job_id: 2, seq: 8 }));

    let running = |progress| {
        JobProgressSnapshot::new(2, true)
            .with_status(JobStatus::Running)
            .with_progress(progress)
    };
    let (state, effects) = receive(state, 2, 7, running(40), &mut page);
    assert!(effects.is_empty());
    assert_eq!(page.get(RegionId::RowProgress(2)).unwrap().width_percent, None);

    let (state, _) = receive(state, 2, 8, running(95), &mut page);
    assert_eq!(state.view().progress, vec![(2, 95)]);
    assert_eq!(page.get(RegionId::RowProgress(2)).unwrap().width_percent, Some(95));
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracker_engine::{
    ActiveJob, EngineEvent, EngineHandle, JobId, PollError, PreviewPayload, ProgressPayload,
    StatusSource,
};

/// Counts progress requests and answers every one with a running job.
#[derive(Default)]
struct CountingSource {
    progress_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl StatusSource for CountingSource {
    async fn job_progress(&self, _job_id: JobId) -> Result<ProgressPayload, PollError> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProgressPayload {
            active: true,
            status: Some("running".to_string()),
            progress: Some(10.0),
            ..ProgressPayload::default()
        })
    }

    async fn export_preview(&self, _job_id: JobId) -> Result<PreviewPayload, PollError> {
        Err(PollError::Transport("no preview".to_string()))
    }

    async fn active_jobs(&self) -> Result<Vec<ActiveJob>, PollError> {
        Ok(vec![ActiveJob {
            job_id: 1,
            status: Some("running".to_string()),
        }])
    }

    async fn delete_job(&self, _job_id: JobId) -> Result<(), PollError> {
        Ok(())
    }
}

fn wait_for(
    handle: &EngineHandle,
    within: Duration,
    pred: impl Fn(&EngineEvent) -> bool,
) -> Option<EngineEvent> {
    let deadline = Instant::now() + within;
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match handle.recv_timeout(remaining) {
            Ok(event) if pred(&event) => return Some(event),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

#[test]
fn fetch_results_come_back_as_events() {
    let source = Arc::new(CountingSource::default());
    let handle = EngineHandle::with_source(source.clone());

    handle.fetch_progress(3, 1);
    let event = wait_for(&handle, Duration::from_secs(2), |event| {
        matches!(event, EngineEvent::ProgressFetched { .. })
    });

    let Some(EngineEvent::ProgressFetched { job_id, seq, result }) = event else {
        panic!("expected a progress event");
    };
    assert_eq!((job_id, seq), (3, 1));
    assert_eq!(result.unwrap().status.as_deref(), Some("running"));
    assert_eq!(source.progress_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_preview_is_reported() {
    let handle = EngineHandle::with_source(Arc::new(CountingSource::default()));
    handle.fetch_preview(4);

    let event = wait_for(&handle, Duration::from_secs(2), |event| {
        matches!(event, EngineEvent::PreviewFetched { .. })
    });
    assert_eq!(
        event,
        Some(EngineEvent::PreviewFetched {
            job_id: 4,
            result: Err(PollError::Transport("no preview".to_string())),
        })
    );
}

#[test]
fn no_ticks_arrive_after_cancel() {
    let handle = EngineHandle::with_source(Arc::new(CountingSource::default()));
    handle.start_timers(Duration::from_millis(20), Some(Duration::from_millis(10)));

    let first = wait_for(&handle, Duration::from_secs(2), |event| {
        matches!(event, EngineEvent::PollTick)
    });
    assert_eq!(first, Some(EngineEvent::PollTick));

    handle.cancel_timers();
    handle.cancel_timers();
    // Anything emitted before the cancel landed is drained here.
    while handle.recv_timeout(Duration::from_millis(100)).is_ok() {}

    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(handle.try_recv(), None);
}

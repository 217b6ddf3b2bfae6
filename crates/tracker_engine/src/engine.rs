use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracker_logging::{tracker_debug, tracker_error};

use crate::client::{ClientSettings, ReqwestStatusClient, StatusSource};
use crate::timers::{schedule_once, ChannelEventSink, EventSink, PollTimers};
use crate::{EngineEvent, JobId, PollError, RequestSeq, ScheduledEvent};

enum EngineCommand {
    StartTimers {
        poll_interval: Duration,
        elapsed_interval: Option<Duration>,
    },
    CancelTimers,
    FetchProgress {
        job_id: JobId,
        seq: RequestSeq,
    },
    FetchPreview {
        job_id: JobId,
    },
    FetchActiveJobs,
    DeleteJob {
        job_id: JobId,
    },
    Schedule {
        delay: Duration,
        event: ScheduledEvent,
    },
}

/// Runs requests and timers on a background tokio runtime.
///
/// Every fetch is independent: a slow response never delays the next tick,
/// and responses come back in arrival order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, PollError> {
        let client = ReqwestStatusClient::new(settings)?;
        Ok(Self::with_source(Arc::new(client)))
    }

    pub fn with_source(source: Arc<dyn StatusSource>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracker_error!("failed to start engine runtime: {err}");
                    return;
                }
            };
            let _guard = runtime.enter();
            let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
            let mut timers = PollTimers::new();
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&source, &sink, &mut timers, command);
            }
            timers.cancel();
            tracker_debug!("engine command channel closed");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn start_timers(&self, poll_interval: Duration, elapsed_interval: Option<Duration>) {
        self.send(EngineCommand::StartTimers {
            poll_interval,
            elapsed_interval,
        });
    }

    pub fn cancel_timers(&self) {
        self.send(EngineCommand::CancelTimers);
    }

    pub fn fetch_progress(&self, job_id: JobId, seq: RequestSeq) {
        self.send(EngineCommand::FetchProgress { job_id, seq });
    }

    pub fn fetch_preview(&self, job_id: JobId) {
        self.send(EngineCommand::FetchPreview { job_id });
    }

    pub fn fetch_active_jobs(&self) {
        self.send(EngineCommand::FetchActiveJobs);
    }

    pub fn delete_job(&self, job_id: JobId) {
        self.send(EngineCommand::DeleteJob { job_id });
    }

    pub fn schedule(&self, delay: Duration, event: ScheduledEvent) {
        self.send(EngineCommand::Schedule { delay, event });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event. `Disconnected` means the
    /// engine thread is gone and no event will ever arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            tracker_error!("engine thread is gone; command dropped");
        }
    }
}

fn handle_command(
    source: &Arc<dyn StatusSource>,
    sink: &Arc<dyn EventSink>,
    timers: &mut PollTimers,
    command: EngineCommand,
) {
    match command {
        EngineCommand::StartTimers {
            poll_interval,
            elapsed_interval,
        } => timers.start(poll_interval, elapsed_interval, sink.clone()),
        EngineCommand::CancelTimers => timers.cancel(),
        EngineCommand::Schedule { delay, event } => schedule_once(delay, event, sink.clone()),
        EngineCommand::FetchProgress { job_id, seq } => {
            let (source, sink) = (source.clone(), sink.clone());
            tokio::spawn(async move {
                let result = source.job_progress(job_id).await;
                sink.emit(EngineEvent::ProgressFetched {
                    job_id,
                    seq,
                    result,
                });
            });
        }
        EngineCommand::FetchPreview { job_id } => {
            let (source, sink) = (source.clone(), sink.clone());
            tokio::spawn(async move {
                let result = source.export_preview(job_id).await;
                sink.emit(EngineEvent::PreviewFetched { job_id, result });
            });
        }
        EngineCommand::FetchActiveJobs => {
            let (source, sink) = (source.clone(), sink.clone());
            tokio::spawn(async move {
                let result = source.active_jobs().await;
                sink.emit(EngineEvent::ActiveJobsFetched { result });
            });
        }
        EngineCommand::DeleteJob { job_id } => {
            let (source, sink) = (source.clone(), sink.clone());
            tokio::spawn(async move {
                let result = source.delete_job(job_id).await;
                sink.emit(EngineEvent::JobDeleted { job_id, result });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::time::Duration;

    use super::EngineHandle;

    #[test]
    fn closed_event_channel_is_reported_as_disconnected() {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let handle = EngineHandle { cmd_tx, event_rx };

        assert_eq!(
            handle.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        );
        drop(event_tx);
        assert_eq!(
            handle.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}

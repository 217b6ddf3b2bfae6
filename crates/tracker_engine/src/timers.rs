use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracker_logging::tracker_debug;

use crate::{EngineEvent, ScheduledEvent};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The poll timer and the optional elapsed-time timer of one poller.
///
/// Both share one cancellation token, so they always stop together. Must be
/// used from inside a tokio runtime.
#[derive(Debug, Default)]
pub struct PollTimers {
    token: Option<CancellationToken>,
}

impl PollTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    /// Starts fresh timers, cancelling any that are still running.
    ///
    /// The first poll tick fires one full `poll_interval` after the call; the
    /// immediate fetch is the caller's job.
    pub fn start(
        &mut self,
        poll_interval: Duration,
        elapsed_interval: Option<Duration>,
        sink: Arc<dyn EventSink>,
    ) {
        self.cancel();
        let token = CancellationToken::new();
        let started = Instant::now();

        tokio::spawn(run_interval(
            poll_interval,
            token.clone(),
            sink.clone(),
            |_| EngineEvent::PollTick,
        ));
        if let Some(period) = elapsed_interval {
            tokio::spawn(run_interval(period, token.clone(), sink, move |now| {
                EngineEvent::ElapsedTick {
                    elapsed: now.duration_since(started),
                }
            }));
        }

        tracker_debug!(
            "timers started: poll every {poll_interval:?}, elapsed every {elapsed_interval:?}"
        );
        self.token = Some(token);
    }

    /// Stops every timer. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
            tracker_debug!("timers cancelled");
        }
    }
}

impl Drop for PollTimers {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_interval<F>(
    period: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
    make_event: F,
) where
    F: Fn(Instant) -> EngineEvent + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            now = ticker.tick() => sink.emit(make_event(now)),
        }
    }
}

/// Emits `event` once after `delay`. Not cancellable: a scheduled reload
/// or toast expiry always fires.
pub fn schedule_once(delay: Duration, event: ScheduledEvent, sink: Arc<dyn EventSink>) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        sink.emit(EngineEvent::Scheduled(event));
    });
}

//! Tracker engine: HTTP endpoints, poll timers and effect execution.
mod client;
mod engine;
mod timers;
mod types;

pub use client::{ClientSettings, ReqwestStatusClient, StatusSource};
pub use engine::EngineHandle;
pub use timers::{schedule_once, ChannelEventSink, EventSink, PollTimers};
pub use types::{
    ActiveJob, EngineEvent, JobId, PageContentPayload, PollError, PreviewJobInfoPayload,
    PreviewPayload, ProgressPayload, RequestSeq, SamplePagePayload, ScheduledEvent,
};

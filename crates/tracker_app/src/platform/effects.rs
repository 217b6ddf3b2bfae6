use tracker_core::{
    Effect, ExportPreview, JobId, JobProgressSnapshot, JobStatus, Msg, PageRow, PollFailure,
    PreviewFailure, PreviewJobInfo, SamplePage,
};
use tracker_engine::{
    ActiveJob, EngineEvent, EngineHandle, PollError, PreviewPayload, ProgressPayload,
    ScheduledEvent,
};
use tracker_logging::{tracker_debug, tracker_warn};

/// Turns poller effects into engine commands.
pub struct EffectRunner<'a> {
    engine: &'a EngineHandle,
}

impl<'a> EffectRunner<'a> {
    pub fn new(engine: &'a EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTimers {
                    poll_interval,
                    elapsed_interval,
                } => self.engine.start_timers(poll_interval, elapsed_interval),
                Effect::FetchProgress { job_id, seq } => {
                    tracker_debug!("FetchProgress job_id={} seq={}", job_id, seq);
                    self.engine.fetch_progress(job_id, seq);
                }
                Effect::CancelTimers => self.engine.cancel_timers(),
                Effect::ScheduleReload { delay } => {
                    self.engine.schedule(delay, ScheduledEvent::Reload)
                }
                // An immediate reload goes through the same event path as a delayed one.
                Effect::Reload => self
                    .engine
                    .schedule(std::time::Duration::ZERO, ScheduledEvent::Reload),
                Effect::ScheduleToastExpiry { toast_id, delay } => self
                    .engine
                    .schedule(delay, ScheduledEvent::ToastExpired { toast_id }),
            }
        }
    }
}

/// Engine events that feed straight into the poller. Page-level events
/// (reload, preview, delete, active-jobs scan) return `None`.
pub fn poller_msg(event: &EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::PollTick => Some(Msg::PollTick),
        EngineEvent::ElapsedTick { elapsed } => Some(Msg::ElapsedTick { elapsed: *elapsed }),
        EngineEvent::ProgressFetched {
            job_id,
            seq,
            result,
        } => Some(Msg::ProgressReceived {
            job_id: *job_id,
            seq: *seq,
            result: map_progress(*job_id, result.clone()),
        }),
        EngineEvent::Scheduled(ScheduledEvent::ToastExpired { toast_id }) => {
            Some(Msg::ToastExpired {
                toast_id: *toast_id,
            })
        }
        EngineEvent::Scheduled(ScheduledEvent::Reload)
        | EngineEvent::PreviewFetched { .. }
        | EngineEvent::ActiveJobsFetched { .. }
        | EngineEvent::JobDeleted { .. } => None,
    }
}

pub fn map_progress(
    job_id: JobId,
    result: Result<ProgressPayload, PollError>,
) -> Result<JobProgressSnapshot, PollFailure> {
    match result {
        Ok(payload) => Ok(snapshot_from_payload(job_id, payload)),
        Err(err) if err.is_decode() => Err(PollFailure::Decode(err.to_string())),
        Err(err) => Err(PollFailure::Transport(err.to_string())),
    }
}

pub fn snapshot_from_payload(job_id: JobId, payload: ProgressPayload) -> JobProgressSnapshot {
    JobProgressSnapshot {
        job_id,
        active: payload.active,
        status: payload.status.as_deref().map(JobStatus::parse),
        progress: payload.progress.map(round_progress),
        current_url: payload.current_url,
        message: payload.message,
        pages_processed: payload.pages_processed,
        total_pages: payload.total_pages,
        updated_at: payload.updated_at,
        error: payload.error,
    }
}

/// Saturating round; NaN counts as no progress.
fn round_progress(progress: f64) -> i64 {
    if progress.is_nan() {
        0
    } else {
        progress.round() as i64
    }
}

pub fn map_preview(
    job_id: JobId,
    result: Result<PreviewPayload, PollError>,
) -> Result<ExportPreview, PreviewFailure> {
    let payload = match result {
        Ok(payload) => payload,
        Err(err) => {
            tracker_warn!("export preview for job {} failed: {}", job_id, err);
            return Err(PreviewFailure::Transport);
        }
    };
    if let Some(error) = payload.error {
        return Err(PreviewFailure::Endpoint(error));
    }
    let info = payload.job_info.unwrap_or_default();
    Ok(ExportPreview {
        job_info: PreviewJobInfo {
            name: info.name,
            status: info.status,
            created_at: info.created_at.unwrap_or_default(),
            total_pages: info.total_pages,
            total_links: info.total_links,
        },
        data_size_estimate: payload.data_size_estimate.unwrap_or_default(),
        sample_pages: payload
            .sample_pages
            .into_iter()
            .map(|page| SamplePage {
                url: page.url,
                title: page.title,
                status_code: page.status_code,
                word_count: page.content.and_then(|content| content.word_count),
                link_count: page.links.len(),
                depth: page.depth,
            })
            .collect(),
    })
}

pub fn page_rows(jobs: &[ActiveJob]) -> Vec<PageRow> {
    jobs.iter()
        .map(|job| PageRow::new(job.job_id, job.status.clone().unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracker_core::{JobStatus, Msg, PollFailure, PreviewFailure};
    use tracker_engine::{
        ActiveJob, EngineEvent, PageContentPayload, PollError, PreviewJobInfoPayload,
        PreviewPayload, ProgressPayload, SamplePagePayload, ScheduledEvent,
    };

    use super::{map_preview, map_progress, page_rows, poller_msg};

    #[test]
    fn payload_maps_to_snapshot() {
        let payload = ProgressPayload {
            active: true,
            status: Some("running".to_string()),
            progress: Some(41.6),
            pages_processed: Some(5),
            ..ProgressPayload::default()
        };
        let snapshot = map_progress(3, Ok(payload)).unwrap();

        assert_eq!(snapshot.job_id, 3);
        assert_eq!(snapshot.status, Some(JobStatus::Running));
        assert_eq!(snapshot.progress, Some(42));
        assert_eq!(snapshot.pages_processed, Some(5));
        assert_eq!(snapshot.current_url, None);
    }

    #[test]
    fn huge_and_nan_progress_do_not_panic() {
        let huge = ProgressPayload {
            progress: Some(1e300),
            ..ProgressPayload::default()
        };
        assert_eq!(map_progress(1, Ok(huge)).unwrap().progress, Some(i64::MAX));

        let nan = ProgressPayload {
            progress: Some(f64::NAN),
            ..ProgressPayload::default()
        };
        assert_eq!(map_progress(1, Ok(nan)).unwrap().progress, Some(0));
    }

    #[test]
    fn errors_split_into_decode_and_transport() {
        assert!(matches!(
            map_progress(1, Err(PollError::Decode("eof".to_string()))),
            Err(PollFailure::Decode(_))
        ));
        assert!(matches!(
            map_progress(1, Err(PollError::HttpStatus(502))),
            Err(PollFailure::Transport(_))
        ));
    }

    #[test]
    fn page_level_events_are_not_poller_messages() {
        assert_eq!(poller_msg(&EngineEvent::PollTick), Some(Msg::PollTick));
        assert_eq!(
            poller_msg(&EngineEvent::Scheduled(ScheduledEvent::ToastExpired {
                toast_id: 4
            })),
            Some(Msg::ToastExpired { toast_id: 4 })
        );
        assert_eq!(
            poller_msg(&EngineEvent::Scheduled(ScheduledEvent::Reload)),
            None
        );
        assert_eq!(
            poller_msg(&EngineEvent::ActiveJobsFetched { result: Ok(vec![]) }),
            None
        );
    }

    #[test]
    fn preview_payload_maps_counts_and_errors() {
        let payload = PreviewPayload {
            job_info: Some(PreviewJobInfoPayload {
                name: "Docs".to_string(),
                status: "completed".to_string(),
                created_at: None,
                total_pages: 2,
                total_links: 9,
            }),
            data_size_estimate: Some("2 KB".to_string()),
            sample_pages: vec![SamplePagePayload {
                url: "https://example.com".to_string(),
                status_code: 200,
                content: Some(PageContentPayload {
                    word_count: Some(80),
                }),
                links: vec![serde_json::Value::Null; 3],
                ..SamplePagePayload::default()
            }],
            error: None,
        };
        let preview = map_preview(1, Ok(payload)).unwrap();
        assert_eq!(preview.sample_pages[0].link_count, 3);
        assert_eq!(preview.sample_pages[0].word_count, Some(80));
        assert_eq!(preview.job_info.created_at, "");

        let failed = PreviewPayload {
            error: Some("No data".to_string()),
            ..PreviewPayload::default()
        };
        assert_eq!(
            map_preview(1, Ok(failed)),
            Err(PreviewFailure::Endpoint("No data".to_string()))
        );
        assert_eq!(
            map_preview(1, Err(PollError::Timeout("slow".to_string()))),
            Err(PreviewFailure::Transport)
        );
    }

    #[test]
    fn active_jobs_become_rows() {
        let rows = page_rows(&[
            ActiveJob {
                job_id: 2,
                status: Some("running".to_string()),
            },
            ActiveJob {
                job_id: 5,
                status: None,
            },
        ]);
        assert!(rows[0].is_in_flight());
        assert!(!rows[1].is_in_flight());
    }
}

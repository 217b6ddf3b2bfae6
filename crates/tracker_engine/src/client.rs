use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracker_logging::tracker_trace;
use url::Url;

use crate::{ActiveJob, JobId, PollError, PreviewPayload, ProgressPayload};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the console, e.g. `http://127.0.0.1:5000/`.
    pub base_url: String,
    /// Raw `Cookie` header for the login-protected endpoints.
    pub session_cookie: Option<String>,
    pub connect_timeout: Duration,
    /// `None` leaves individual requests unbounded.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            session_cookie: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            user_agent: concat!("crawl-tracker/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// The HTTP endpoints the console exposes to the poller.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn job_progress(&self, job_id: JobId) -> Result<ProgressPayload, PollError>;

    async fn export_preview(&self, job_id: JobId) -> Result<PreviewPayload, PollError>;

    async fn active_jobs(&self) -> Result<Vec<ActiveJob>, PollError>;

    async fn delete_job(&self, job_id: JobId) -> Result<(), PollError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusClient {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestStatusClient {
    pub fn new(settings: ClientSettings) -> Result<Self, PollError> {
        let base = parse_base_url(&settings.base_url)?;

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|err| PollError::InvalidUrl(format!("user agent: {err}")))?;
        headers.insert(USER_AGENT, agent);
        if let Some(cookie) = settings.session_cookie.as_deref() {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|err| PollError::InvalidUrl(format!("session cookie: {err}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .default_headers(headers);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| PollError::Transport(err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, PollError> {
        self.base
            .join(path)
            .map_err(|err| PollError::InvalidUrl(format!("{path}: {err}")))
    }

    /// GETs `path` and decodes the body whatever the status code, since the
    /// console reports missing jobs as `404` with an `{error}` body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PollError> {
        let url = self.endpoint(path)?;
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        tracker_trace!("GET {path} -> {status} ({} bytes)", body.len());
        serde_json::from_slice(&body).map_err(|err| PollError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl StatusSource for ReqwestStatusClient {
    async fn job_progress(&self, job_id: JobId) -> Result<ProgressPayload, PollError> {
        self.get_json(&format!("api/job/{job_id}/progress")).await
    }

    async fn export_preview(&self, job_id: JobId) -> Result<PreviewPayload, PollError> {
        self.get_json(&format!("job/{job_id}/export/preview")).await
    }

    async fn active_jobs(&self) -> Result<Vec<ActiveJob>, PollError> {
        #[derive(Deserialize)]
        struct Entry {
            #[serde(default)]
            status: Option<String>,
        }

        let entries: BTreeMap<String, Entry> = self.get_json("api/jobs/active").await?;
        let mut jobs = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            let job_id = key
                .parse::<JobId>()
                .map_err(|err| PollError::Decode(format!("job id {key:?}: {err}")))?;
            jobs.push(ActiveJob {
                job_id,
                status: entry.status,
            });
        }
        jobs.sort_by_key(|job| job.job_id);
        Ok(jobs)
    }

    async fn delete_job(&self, job_id: JobId) -> Result<(), PollError> {
        let url = self.endpoint(&format!("job/{job_id}/delete"))?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(PollError::HttpStatus(status.as_u16()))
        }
    }
}

/// Parses the console root, forcing a trailing slash so endpoint paths join
/// below it instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, PollError> {
    let mut base = Url::parse(raw.trim()).map_err(|err| PollError::InvalidUrl(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(PollError::InvalidUrl(format!(
            "unsupported scheme {}",
            base.scheme()
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn map_reqwest_error(err: reqwest::Error) -> PollError {
    if err.is_timeout() {
        return PollError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return PollError::Decode(err.to_string());
    }
    PollError::Transport(err.to_string())
}

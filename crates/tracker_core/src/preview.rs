//! View model for the export-preview modal.

pub const PREVIEW_SAMPLE_LIMIT: usize = 3;
pub const URL_CELL_LIMIT: usize = 40;
pub const TITLE_CELL_LIMIT: usize = 30;

const ELLIPSIS: &str = "...";
const LOAD_FAILED_MESSAGE: &str =
    "Failed to load data. Try refreshing the page or contact an administrator.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewJobInfo {
    pub name: String,
    pub status: String,
    pub created_at: String,
    pub total_pages: u64,
    pub total_links: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePage {
    pub url: String,
    pub title: Option<String>,
    pub status_code: u16,
    pub word_count: Option<u64>,
    pub link_count: usize,
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPreview {
    pub job_info: PreviewJobInfo,
    pub data_size_estimate: String,
    pub sample_pages: Vec<SamplePage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewFailure {
    /// Payload carried an `error` field.
    Endpoint(String),
    /// Request or decoding failed.
    Transport,
}

/// Display text plus the untruncated value kept for the tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedText {
    pub display: String,
    pub full: String,
}

impl TruncatedText {
    pub fn is_truncated(&self) -> bool {
        self.display != self.full
    }
}

/// Cuts `value` to `limit` characters and appends an ellipsis when longer.
pub fn truncate_for_cell(value: &str, limit: usize) -> TruncatedText {
    let display = match value.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &value[..cut]),
        None => value.to_string(),
    };
    TruncatedText {
        display,
        full: value.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCodeClass {
    Success,
    Warning,
    Danger,
}

impl StatusCodeClass {
    pub fn for_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Success,
            300..=399 => Self::Warning,
            _ => Self::Danger,
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Success => "bg-success",
            Self::Warning => "bg-warning",
            Self::Danger => "bg-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub url: TruncatedText,
    pub title: Option<TruncatedText>,
    pub status_code: u16,
    pub status_class: StatusCodeClass,
    pub word_count: u64,
    pub link_count: usize,
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfoCard {
    pub name: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeCard {
    pub total_pages: u64,
    pub total_links: u64,
    pub size_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSummary {
    pub job: JobInfoCard,
    pub volume: VolumeCard,
    pub samples: Vec<SampleRow>,
}

impl PreviewSummary {
    /// Shown instead of the sample table when nothing was crawled yet.
    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    Loading,
    Failed { message: String },
    Ready(PreviewSummary),
}

pub fn render_preview(result: Result<ExportPreview, PreviewFailure>) -> PreviewView {
    let preview = match result {
        Ok(preview) => preview,
        Err(PreviewFailure::Endpoint(error)) => {
            return PreviewView::Failed {
                message: format!("Error: {error}"),
            }
        }
        Err(PreviewFailure::Transport) => {
            return PreviewView::Failed {
                message: LOAD_FAILED_MESSAGE.to_string(),
            }
        }
    };

    let samples = preview
        .sample_pages
        .iter()
        .take(PREVIEW_SAMPLE_LIMIT)
        .map(|page| SampleRow {
            url: truncate_for_cell(&page.url, URL_CELL_LIMIT),
            title: page
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .map(|title| truncate_for_cell(title, TITLE_CELL_LIMIT)),
            status_code: page.status_code,
            status_class: StatusCodeClass::for_code(page.status_code),
            word_count: page.word_count.unwrap_or(0),
            link_count: page.link_count,
            depth: page.depth,
        })
        .collect();

    PreviewView::Ready(PreviewSummary {
        job: JobInfoCard {
            name: preview.job_info.name,
            status: preview.job_info.status,
            created_at: preview.job_info.created_at,
        },
        volume: VolumeCard {
            total_pages: preview.job_info.total_pages,
            total_links: preview.job_info.total_links,
            size_estimate: preview.data_size_estimate,
        },
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::{truncate_for_cell, StatusCodeClass};

    #[test]
    fn short_values_are_kept_as_is() {
        let cell = truncate_for_cell("https://a.example", 40);
        assert_eq!(cell.display, "https://a.example");
        assert!(!cell.is_truncated());
    }

    #[test]
    fn long_values_are_cut_on_char_boundaries() {
        let title = "Привет мир, это очень длинный заголовок страницы";
        let cell = truncate_for_cell(title, 30);
        assert_eq!(cell.display.chars().count(), 33);
        assert!(cell.display.ends_with("..."));
        assert_eq!(cell.full, title);
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let value = "a".repeat(40);
        assert_eq!(truncate_for_cell(&value, 40).display, value);
    }

    #[test]
    fn status_codes_are_colour_coded() {
        assert_eq!(StatusCodeClass::for_code(200), StatusCodeClass::Success);
        assert_eq!(StatusCodeClass::for_code(204), StatusCodeClass::Success);
        assert_eq!(StatusCodeClass::for_code(301), StatusCodeClass::Warning);
        assert_eq!(StatusCodeClass::for_code(404), StatusCodeClass::Danger);
        assert_eq!(StatusCodeClass::for_code(0), StatusCodeClass::Danger);
        assert_eq!(StatusCodeClass::Warning.badge_class(), "bg-warning");
    }
}

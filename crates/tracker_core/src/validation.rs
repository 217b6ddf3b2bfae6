//! Client-side checks for the create-job and delete-job forms.
use std::sync::LazyLock;

use regex::Regex;

use crate::JobId;

pub const URL_SCHEME_MESSAGE: &str = "URL must start with http:// or https://";
const REQUIRED_MESSAGE: &str = "This field is required";
const NUMERIC_MESSAGE: &str = "Invalid numeric values";

const CREATING_LABEL: &str = "Creating...";

/// `None` only if the literal pattern stops compiling; every URL is then invalid.
static START_URL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^https?://.+").ok());

/// Validity state of a single input after blur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidity {
    /// Nothing entered yet; the field carries no marker.
    Empty,
    Valid,
    Invalid(String),
}

impl FieldValidity {
    pub fn is_valid(&self) -> bool {
        !matches!(self, FieldValidity::Invalid(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            FieldValidity::Invalid(message) => Some(message),
            FieldValidity::Empty | FieldValidity::Valid => None,
        }
    }

    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            FieldValidity::Empty => None,
            FieldValidity::Valid => Some("is-valid"),
            FieldValidity::Invalid(_) => Some("is-invalid"),
        }
    }
}

pub fn validate_start_url(value: &str) -> FieldValidity {
    if value.is_empty() {
        FieldValidity::Empty
    } else if START_URL.as_ref().is_some_and(|pattern| pattern.is_match(value)) {
        FieldValidity::Valid
    } else {
        FieldValidity::Invalid(URL_SCHEME_MESSAGE.to_string())
    }
}

/// Per-job limits applied to non-admin users.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobLimits {
    pub max_pages_per_job: u32,
    pub max_depth: u32,
    pub min_delay_secs: f64,
}

impl Default for JobLimits {
    fn default() -> Self {
        Self {
            max_pages_per_job: 100,
            max_depth: 3,
            min_delay_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    JobName,
    StartUrl,
    MaxPages,
    MaxDepth,
    Delay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw values of the create-job form, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateJobForm {
    pub job_name: String,
    pub start_url: String,
    pub max_pages: String,
    pub max_depth: String,
    pub delay: String,
}

impl Default for CreateJobForm {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            start_url: String::new(),
            max_pages: "20".to_string(),
            max_depth: "2".to_string(),
            delay: "0.5".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    Proceed,
    Cancel(Vec<FieldError>),
}

impl CreateJobForm {
    /// Every failing field, in form order. `limits` is `None` for admins.
    pub fn validate(&self, limits: Option<&JobLimits>) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.job_name.trim().is_empty() {
            errors.push(FieldError::new(FormField::JobName, REQUIRED_MESSAGE));
        }
        match validate_start_url(self.start_url.trim()) {
            FieldValidity::Empty => {
                errors.push(FieldError::new(FormField::StartUrl, REQUIRED_MESSAGE));
            }
            FieldValidity::Invalid(message) => {
                errors.push(FieldError::new(FormField::StartUrl, message));
            }
            FieldValidity::Valid => {}
        }

        let max_pages = self.max_pages.trim().parse::<u32>();
        let max_depth = self.max_depth.trim().parse::<u32>();
        let delay = self
            .delay
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|delay| delay.is_finite() && *delay >= 0.0);

        if max_pages.is_err() {
            errors.push(FieldError::new(FormField::MaxPages, NUMERIC_MESSAGE));
        }
        if max_depth.is_err() {
            errors.push(FieldError::new(FormField::MaxDepth, NUMERIC_MESSAGE));
        }
        if delay.is_none() {
            errors.push(FieldError::new(FormField::Delay, NUMERIC_MESSAGE));
        }

        if let Some(limits) = limits {
            if let Ok(pages) = max_pages {
                if pages > limits.max_pages_per_job {
                    errors.push(FieldError::new(
                        FormField::MaxPages,
                        format!("Maximum pages: {}", limits.max_pages_per_job),
                    ));
                }
            }
            if let Ok(depth) = max_depth {
                if depth > limits.max_depth {
                    errors.push(FieldError::new(
                        FormField::MaxDepth,
                        format!("Maximum depth: {}", limits.max_depth),
                    ));
                }
            }
            if let Some(delay) = delay {
                if delay < limits.min_delay_secs {
                    errors.push(FieldError::new(
                        FormField::Delay,
                        format!("Minimum delay: {} s", limits.min_delay_secs),
                    ));
                }
            }
        }

        errors
    }

    /// Puts the submit control into its busy state, then cancels and reverts
    /// it if any field fails.
    pub fn submit(&self, button: &mut ButtonState, limits: Option<&JobLimits>) -> SubmitDecision {
        button.show_loading(CREATING_LABEL);
        let errors = self.validate(limits);
        if errors.is_empty() {
            SubmitDecision::Proceed
        } else {
            button.hide_loading();
            SubmitDecision::Cancel(errors)
        }
    }
}

/// Submit button with a reversible "busy" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    label: String,
    original: Option<String>,
}

impl ButtonState {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_busy(&self) -> bool {
        self.original.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        !self.is_busy()
    }

    pub fn show_loading(&mut self, text: &str) {
        if self.original.is_none() {
            self.original = Some(std::mem::replace(&mut self.label, text.to_string()));
        } else {
            self.label = text.to_string();
        }
    }

    pub fn hide_loading(&mut self) {
        if let Some(original) = self.original.take() {
            self.label = original;
        }
    }
}

/// Contents of the delete-confirmation modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub job_id: JobId,
    pub job_name: String,
    pub action: String,
}

impl DeleteDialog {
    pub const BUSY_LABEL: &'static str = "Deleting...";

    pub fn confirm(job_id: JobId, job_name: impl Into<String>) -> Self {
        Self {
            job_id,
            job_name: job_name.into(),
            action: format!("/job/{job_id}/delete"),
        }
    }
}

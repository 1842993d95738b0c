use serde::Serialize;

use super::form::LeadForm;

/// Shown for every failed submission, whatever the cause.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Lifecycle of a single lead submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Submitted,
    Failed(String),
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::Submitting => "Submitting",
            SubmissionState::Submitted => "Submitted",
            SubmissionState::Failed(_) => "Failed",
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether captured values may still change.
    pub fn accepts_edits(&self) -> bool {
        matches!(self, SubmissionState::Idle | SubmissionState::Failed(_))
    }
}

/// Everything the presentation layer needs to render the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub fields: LeadForm,
    pub status: SubmissionState,
    pub is_submit_disabled: bool,
}

impl FormView {
    pub fn project(fields: &LeadForm, status: &SubmissionState) -> Self {
        Self {
            fields: fields.clone(),
            status: status.clone(),
            is_submit_disabled: is_submit_disabled(status),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.error_message()
    }
}

pub fn is_submit_disabled(status: &SubmissionState) -> bool {
    matches!(status, SubmissionState::Submitting)
}

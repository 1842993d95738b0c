//! Lead form capture and the submission lifecycle.
//!
//! [`SubmissionController`] owns a [`FieldStore`] and the [`SubmissionState`]
//! and is the only thing that moves between states. The backend and analytics
//! collaborators are injected through [`LeadBackend`] and [`AnalyticsSink`].

pub mod analytics;
pub mod backend;
mod controller;
pub mod error;
pub mod form;
mod state;

#[cfg(test)]
mod tests;

pub use analytics::{
    AnalyticsError, AnalyticsSink, BackgroundAnalytics, ConversionEvent, ConversionTransport,
    HttpConversionTransport, NoopAnalytics, CONVERSION_EVENT_NAME,
};
pub use backend::{HttpLeadBackend, LeadBackend};
pub use controller::{FieldChange, PresentationEvent, SubmissionController, SubmitOutcome};
pub use error::{ConfigurationError, IntakeError, SubmissionError, ValidationError};
pub use form::{FieldStore, LeadField, LeadForm, ServiceCategory};
pub use state::{is_submit_disabled, FormView, SubmissionState, GENERIC_FAILURE_MESSAGE};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::analytics::{AnalyticsSink, ConversionEvent, NoopAnalytics, DEFAULT_DELIVERY_TIMEOUT};
use super::backend::LeadBackend;
use super::error::{ConfigurationError, IntakeError, ValidationError};
use super::form::{FieldStore, LeadField, LeadForm};
use super::state::{FormView, SubmissionState, GENERIC_FAILURE_MESSAGE};

/// Inbound events forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationEvent {
    FieldChanged { field: String, value: String },
    SubmitRequested,
    StartOverRequested,
}

/// What a call to [`SubmissionController::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Failed,
    /// Another submission was already in flight; nothing was sent.
    InFlight,
    /// The lead was already accepted; start over before submitting again.
    AlreadySubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Applied(LeadField),
    /// Edits are dropped while a submission is in flight or confirmed.
    Ignored(LeadField),
}

#[derive(Debug, Default)]
struct Lifecycle {
    store: FieldStore,
    status: SubmissionState,
}

/// Sole owner of the lead form and its submission state.
///
/// Methods take `&self` so overlapping calls from one task are possible; the
/// lifecycle lock is never held across the backend call, and a second
/// `submit` while one is in flight is a no-op.
pub struct SubmissionController<B> {
    backend: B,
    analytics: Arc<dyn AnalyticsSink>,
    conversion_timeout: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl<B> SubmissionController<B>
where
    B: LeadBackend,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            analytics: Arc::new(NoopAnalytics),
            conversion_timeout: DEFAULT_DELIVERY_TIMEOUT,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        lock_lifecycle(&self.lifecycle)
    }

    pub fn status(&self) -> SubmissionState {
        self.lifecycle().status.clone()
    }

    pub fn values(&self) -> LeadForm {
        self.lifecycle().store.values().clone()
    }

    pub fn view(&self) -> FormView {
        let lifecycle = self.lifecycle();
        FormView::project(lifecycle.store.values(), &lifecycle.status)
    }

    /// Records an edit to the named field. Unknown names are a programming error.
    pub fn set_field(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<FieldChange, ConfigurationError> {
        let field = name.parse::<LeadField>()?;
        let mut lifecycle = self.lifecycle();
        if !lifecycle.status.accepts_edits() {
            debug!(%field, status = lifecycle.status.label(), "field edit ignored");
            return Ok(FieldChange::Ignored(field));
        }
        lifecycle.store.set(field, value);
        Ok(FieldChange::Applied(field))
    }

    /// Gates, sends and settles one submission of the current form.
    ///
    /// Backend failures are absorbed into [`SubmissionState::Failed`]; only the
    /// blank-field gate is reported as an error.
    pub async fn submit(&self) -> Result<SubmitOutcome, ValidationError> {
        let lead = {
            let mut lifecycle = self.lifecycle();
            match lifecycle.status {
                SubmissionState::Submitting => {
                    debug!("submission already in flight");
                    return Ok(SubmitOutcome::InFlight);
                }
                SubmissionState::Submitted => return Ok(SubmitOutcome::AlreadySubmitted),
                SubmissionState::Idle | SubmissionState::Failed(_) => {}
            }

            let missing = lifecycle.store.missing_fields();
            if !missing.is_empty() {
                return Err(ValidationError { missing });
            }

            lifecycle.status = SubmissionState::Submitting;
            lifecycle.store.values().clone()
        };

        let mut in_flight = InFlight::new(&self.lifecycle);
        info!(suburb = %lead.suburb, service = %lead.message, "submitting lead");

        match self.backend.submit_lead(&lead).await {
            Ok(()) => {
                in_flight.settle(SubmissionState::Submitted);
                info!(suburb = %lead.suburb, "lead submitted");
                self.analytics
                    .report(ConversionEvent::submit(self.conversion_timeout));
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                warn!(error = %err, "lead submission failed");
                in_flight.settle(SubmissionState::Failed(GENERIC_FAILURE_MESSAGE.to_string()));
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Clears the form after a confirmed submission. Returns whether anything changed.
    pub fn reset_and_start_over(&self) -> bool {
        let mut lifecycle = self.lifecycle();
        if lifecycle.status != SubmissionState::Submitted {
            debug!(status = lifecycle.status.label(), "start over ignored");
            return false;
        }
        lifecycle.store.reset();
        lifecycle.status = SubmissionState::Idle;
        true
    }

    /// Applies one presentation event and returns the state to render.
    pub async fn handle(&self, event: PresentationEvent) -> Result<FormView, IntakeError> {
        match event {
            PresentationEvent::FieldChanged { field, value } => {
                self.set_field(&field, value)?;
            }
            PresentationEvent::SubmitRequested => {
                self.submit().await?;
            }
            PresentationEvent::StartOverRequested => {
                self.reset_and_start_over();
            }
        }
        Ok(self.view())
    }
}

fn lock_lifecycle(lifecycle: &Mutex<Lifecycle>) -> MutexGuard<'_, Lifecycle> {
    lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks the lifecycle failed if a submission is dropped before it settles,
/// so the controller never stays stuck in `Submitting`.
struct InFlight<'a> {
    lifecycle: &'a Mutex<Lifecycle>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(lifecycle: &'a Mutex<Lifecycle>) -> Self {
        Self {
            lifecycle,
            settled: false,
        }
    }

    fn settle(&mut self, status: SubmissionState) {
        lock_lifecycle(self.lifecycle).status = status;
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("submission abandoned before the backend answered");
        lock_lifecycle(self.lifecycle).status =
            SubmissionState::Failed(GENERIC_FAILURE_MESSAGE.to_string());
    }
}

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::intake::{
    AnalyticsSink, ConversionEvent, LeadBackend, LeadForm, SubmissionController, SubmissionError,
};

pub(super) type Journal = Arc<Mutex<Vec<String>>>;

pub(super) fn jane_doe() -> LeadForm {
    LeadForm {
        name: "Jane Doe".to_string(),
        email: "jane@x.com".to_string(),
        phone: "0400000000".to_string(),
        suburb: "Sydney".to_string(),
        message: "Buying".to_string(),
    }
}

pub(super) fn fill(controller: &SubmissionController<ScriptedBackend>, lead: &LeadForm) {
    for (name, value) in [
        ("name", &lead.name),
        ("email", &lead.email),
        ("phone", &lead.phone),
        ("suburb", &lead.suburb),
        ("message", &lead.message),
    ] {
        controller
            .set_field(name, value.clone())
            .expect("known field");
    }
}

/// Backend fake that answers from a script of status codes (`200` when the
/// script runs dry) and can hold requests until released.
#[derive(Clone, Default)]
pub(super) struct ScriptedBackend {
    script: Arc<Mutex<VecDeque<u16>>>,
    requests: Arc<Mutex<Vec<LeadForm>>>,
    journal: Journal,
    entered: Arc<Notify>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub(super) fn answering(statuses: &[u16]) -> Self {
        Self {
            script: Arc::new(Mutex::new(statuses.iter().copied().collect())),
            ..Self::default()
        }
    }

    pub(super) fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }

    pub(super) fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub(super) fn requests(&self) -> Vec<LeadForm> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    pub(super) async fn wait_until_called(&self) {
        self.entered.notified().await;
    }

    pub(super) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

/// A client-side failure that never reaches the network.
fn transport_error() -> reqwest::Error {
    reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("relative url is rejected")
}

#[async_trait]
impl LeadBackend for ScriptedBackend {
    async fn submit_lead(&self, lead: &LeadForm) -> Result<(), SubmissionError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(lead.clone());
        self.journal
            .lock()
            .expect("journal mutex poisoned")
            .push("request".to_string());
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let status = self
            .script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(200);
        self.journal
            .lock()
            .expect("journal mutex poisoned")
            .push(format!("response {status}"));

        match status {
            200..=299 => Ok(()),
            0 => Err(SubmissionError::Transport(transport_error())),
            status => Err(SubmissionError::Rejected { status }),
        }
    }
}

#[derive(Clone, Default)]
pub(super) struct RecordingAnalytics {
    events: Arc<Mutex<Vec<ConversionEvent>>>,
    journal: Journal,
}

impl RecordingAnalytics {
    pub(super) fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub(super) fn events(&self) -> Vec<ConversionEvent> {
        self.events.lock().expect("events mutex poisoned").clone()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn report(&self, event: ConversionEvent) {
        self.journal
            .lock()
            .expect("journal mutex poisoned")
            .push(format!("conversion {}", event.name()));
        self.events
            .lock()
            .expect("events mutex poisoned")
            .push(event);
    }
}

pub(super) fn build_controller(
    backend: ScriptedBackend,
) -> (SubmissionController<ScriptedBackend>, RecordingAnalytics) {
    let analytics = RecordingAnalytics::default();
    let controller =
        SubmissionController::new(backend).with_analytics(Arc::new(analytics.clone()));
    (controller, analytics)
}

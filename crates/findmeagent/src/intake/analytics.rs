//! Conversion tracking for successful submissions.
//!
//! The controller only knows [`AnalyticsSink`]; reporting is fire-and-forget and
//! a sink must never fail the submission it reports on. When no collector is
//! configured the [`NoopAnalytics`] sink stands in.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::runtime::Handle;
use tracing::{debug, warn};
use url::Url;

pub const CONVERSION_EVENT_NAME: &str = "Submit";
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Signal that a lead reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionEvent {
    name: &'static str,
    delivery_timeout: Duration,
}

impl ConversionEvent {
    pub fn submit(delivery_timeout: Duration) -> Self {
        Self {
            name: CONVERSION_EVENT_NAME,
            delivery_timeout,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }
}

impl Default for ConversionEvent {
    fn default() -> Self {
        Self::submit(DEFAULT_DELIVERY_TIMEOUT)
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn report(&self, event: ConversionEvent);
}

impl<S: AnalyticsSink + ?Sized> AnalyticsSink for Arc<S> {
    fn report(&self, event: ConversionEvent) {
        (**self).report(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn report(&self, event: ConversionEvent) {
        debug!(event = event.name(), "analytics disabled; conversion not reported");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("collector responded with status {status}")]
    Rejected { status: u16 },
    #[error("collector unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Delivers a conversion to the analytics collector.
#[async_trait]
pub trait ConversionTransport: Send + Sync + 'static {
    async fn deliver(&self, event: &ConversionEvent) -> Result<(), AnalyticsError>;
}

pub type DeliveryCallback = Arc<dyn Fn(&ConversionEvent) + Send + Sync>;

/// Spawns each delivery onto the current tokio runtime, bounded by the event's
/// timeout. The callback runs only once the collector confirms delivery.
pub struct BackgroundAnalytics<T> {
    transport: Arc<T>,
    on_delivered: DeliveryCallback,
}

impl<T> BackgroundAnalytics<T>
where
    T: ConversionTransport,
{
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            on_delivered: Arc::new(|event: &ConversionEvent| {
                debug!(event = event.name(), "conversion tracked");
            }),
        }
    }

    pub fn with_callback(mut self, on_delivered: DeliveryCallback) -> Self {
        self.on_delivered = on_delivered;
        self
    }
}

impl<T> fmt::Debug for BackgroundAnalytics<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundAnalytics").finish_non_exhaustive()
    }
}

impl<T> AnalyticsSink for BackgroundAnalytics<T>
where
    T: ConversionTransport,
{
    fn report(&self, event: ConversionEvent) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(event = event.name(), "no async runtime; conversion dropped");
            return;
        };

        let transport = Arc::clone(&self.transport);
        let on_delivered = Arc::clone(&self.on_delivered);
        runtime.spawn(async move {
            let timeout = event.delivery_timeout();
            match tokio::time::timeout(timeout, transport.deliver(&event)).await {
                Ok(Ok(())) => on_delivered(&event),
                Ok(Err(err)) => {
                    warn!(event = event.name(), error = %err, "conversion delivery failed")
                }
                Err(_) => warn!(
                    event = event.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "conversion delivery timed out"
                ),
            }
        });
    }
}

/// Posts `{"event": <name>}` to a collector endpoint.
#[derive(Debug, Clone)]
pub struct HttpConversionTransport {
    client: Client,
    endpoint: Url,
}

impl HttpConversionTransport {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Builds a dedicated client whose timeout matches the delivery window.
    pub fn connect(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, endpoint))
    }
}

#[async_trait]
impl ConversionTransport for HttpConversionTransport {
    async fn deliver(&self, event: &ConversionEvent) -> Result<(), AnalyticsError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "event": event.name() }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AnalyticsError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

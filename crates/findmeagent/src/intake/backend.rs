use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::error::SubmissionError;
use super::form::LeadForm;

const LEADS_PATH: &str = "api/leads";

/// Receives completed leads. Any error maps the attempt to a failed submission.
#[async_trait]
pub trait LeadBackend: Send + Sync {
    async fn submit_lead(&self, lead: &LeadForm) -> Result<(), SubmissionError>;
}

/// Posts leads as JSON to `{base_url}/api/leads`.
#[derive(Debug, Clone)]
pub struct HttpLeadBackend {
    client: Client,
    endpoint: Url,
}

impl HttpLeadBackend {
    pub fn new(base_url: &Url, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &Url) -> Self {
        Self {
            client,
            endpoint: leads_endpoint(base_url),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Joins the leads path onto the base URL, keeping any path prefix the base carries.
fn leads_endpoint(base_url: &Url) -> Url {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    match base.join(LEADS_PATH) {
        Ok(url) => url,
        Err(_) => base,
    }
}

#[async_trait]
impl LeadBackend for HttpLeadBackend {
    async fn submit_lead(&self, lead: &LeadForm) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(lead)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(%status, endpoint = %self.endpoint, "lead accepted by backend");
        Ok(())
    }
}

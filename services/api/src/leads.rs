//! Lead intake endpoints consumed by the form's submission controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

/// Upper bound on leads returned by the listing endpoint.
pub const LIST_LIMIT: usize = 1000;

/// A stored lead as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub suburb: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/leads`. `message` may be omitted or null.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadCreate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub suburb: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl Lead {
    pub fn from_request(input: LeadCreate, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            suburb: input.suburb,
            message: input.message.unwrap_or_default(),
            created_at,
        }
    }
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> String {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("lead-{id:06}")
}

/// Storage seam so routes can be exercised without a database.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError>;
    /// Oldest first, at most `limit` entries.
    fn list(&self, limit: usize) -> Result<Vec<Lead>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub fn lead_router<R>(repository: Arc<R>) -> Router
where
    R: LeadRepository + 'static,
{
    Router::new()
        .route("/api/", get(api_root))
        .route(
            "/api/leads",
            post(create_lead_handler::<R>).get(list_leads_handler::<R>),
        )
        .with_state(repository)
}

pub(crate) async fn api_root() -> Json<serde_json::Value> {
    Json(json!({ "message": "FindMeAgent API" }))
}

pub(crate) async fn create_lead_handler<R>(
    State(repository): State<Arc<R>>,
    Json(input): Json<LeadCreate>,
) -> Response
where
    R: LeadRepository + 'static,
{
    let lead = Lead::from_request(input, next_lead_id(), Utc::now());
    match repository.insert(lead) {
        Ok(stored) => {
            info!(lead_id = %stored.id, suburb = %stored.suburb, "new lead submitted");
            (StatusCode::OK, Json(stored)).into_response()
        }
        Err(other) => {
            error!(error = %other, "failed to store lead");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn list_leads_handler<R>(State(repository): State<Arc<R>>) -> Response
where
    R: LeadRepository + 'static,
{
    match repository.list(LIST_LIMIT) {
        Ok(leads) => (StatusCode::OK, Json(leads)).into_response(),
        Err(err) => {
            error!(error = %err, "failed to list leads");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

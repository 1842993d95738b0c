mod cli;
pub mod infra;
pub mod leads;
mod routes;
mod server;

pub use routes::{cors_layer, with_lead_routes, AppState};

use findmeagent::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

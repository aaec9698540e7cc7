mod cli;
mod infra;
mod routes;
mod server;
mod summary;

use incident_analytics::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

mod cli;
mod infra;
mod pages;
mod report;
mod routes;
mod server;

use tenant_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

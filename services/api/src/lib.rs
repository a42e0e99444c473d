mod cli;
mod infra;
mod routes;
mod server;
mod triage;

use complaint_desk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

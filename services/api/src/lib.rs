mod admin;
mod cli;
mod infra;
mod routes;
mod server;

use contact_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

mod cli;
mod commands;
mod images;
mod infra;
mod routes;
mod server;

use wheelchair_advisor::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

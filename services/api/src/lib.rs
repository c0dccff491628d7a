mod cli;
mod commands;
mod demo;
mod infra;
mod repl;
mod routes;
mod server;

use fleet_telematics::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

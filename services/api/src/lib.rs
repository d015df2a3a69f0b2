mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use talent_screen::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

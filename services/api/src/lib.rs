mod cli;
mod infra;
mod registry;
mod routes;
mod server;

use utn_recruitment::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

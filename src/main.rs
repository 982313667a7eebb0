use anyhow::Result;
use numduel::cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    cli::run_cli().await
}

use anyhow::Result;
use ephemail::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}

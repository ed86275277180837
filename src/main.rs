//! expediente - fiscal document history explorer.
//!
//! CLI for browsing a client's historical fiscal documents, resolving
//! signed download URLs, and running downloads and bulk exports.

use expediente::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so the token override is visible to config loading.
    let _ = dotenvy::dotenv();
    cli::init_tracing();
    cli::run().await
}

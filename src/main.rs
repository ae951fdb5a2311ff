//! hwdash: a hardware dashboard built from reactive measures and scrolling graphs.
//!
//! Run with:  `RUST_LOG=debug hwdash`

mod dashboard;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("hwdash v{} starting", env!("CARGO_PKG_VERSION"));

    dashboard::run().await
}

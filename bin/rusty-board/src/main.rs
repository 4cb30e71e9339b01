//! # Rusty-Board Binary
//!
//! Loads the configuration, connects to the backend, optionally logs in,
//! and prints the thread list the way the board would show it.

use std::sync::Arc;

use anyhow::Context;
use configs::{ClientConfig, LogFormat};
use rb_api::HttpApi;
use rb_core::models::SessionCredential;
use rb_core::traits::{BlobStore, ImageboardApi};
use rb_ui::filter::{Criteria, FilterState};
use rb_ui::manager::Reload;
use rb_ui::{Imageboard, Page};
use secrecy::ExposeSecret;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(feature = "storage-local")]
use rb_storage_local::MemoryBlobStore;

#[cfg(not(feature = "storage-local"))]
compile_error!("rusty-board needs a blob store: enable the `storage-local` feature");

/// `RUST_LOG` wins over the configured level.
fn init_tracing(config: &ClientConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

fn initial_filter(config: &ClientConfig) -> FilterState {
    let criteria = config
        .filter
        .criteria
        .parse::<Criteria>()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default filter criteria");
            Criteria::default()
        });
    FilterState {
        search: config.filter.search.clone(),
        sort_order: config.filter.sort_order,
        criteria,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::load().context("failed to load configuration")?;
    init_tracing(&config);
    tracing::info!(base_url = %config.base_url, "Rusty-Board starting");

    let api: Arc<dyn ImageboardApi> = Arc::new(
        HttpApi::new(&config.base_url, config.request_timeout)
            .context("failed to build HTTP client")?,
    );
    let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
    let board = Imageboard::new(api, blobs, Page::headless(), initial_filter(&config));

    board.restore_settings().await;

    if let Some((username, password)) = config.credentials() {
        let credential = SessionCredential::new(username, password.expose_secret());
        // A failed login still leaves the public board readable.
        if let Err(err) = board.session().login(&credential).await {
            tracing::warn!(username, error = %err, "login failed");
        }
    }

    match board.reload().await.context("failed to load threads")? {
        Reload::Applied(count) => tracing::info!(count, "threads loaded"),
        Reload::Superseded => tracing::debug!("reload superseded"),
    }
    println!("{}", board.threads_text());
    Ok(())
}

// Library root
// -----------
// This crate exposes a small library surface for the two binaries:
// `pinecone-upload` sends a directory of text files to the n8n upload
// webhook, `pinecone-search` queries the n8n search webhook.
//
// Module responsibilities:
// - `config`: environment-driven settings for each flow.
// - `files`: collects the `.txt` files of one upload batch.
// - `model`: request/response shapes and search result normalization.
// - `api`: blocking HTTP client for the webhooks.
// - `ui`: console reports, the upload flow and the search loops.
pub mod api;
pub mod config;
pub mod files;
pub mod model;
pub mod ui;

use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`),
/// keeping diagnostics apart from the report on stdout.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

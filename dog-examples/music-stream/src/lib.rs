mod config;

use anyhow::Context;
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use dog_axum::AxumApp;
use dog_blob::{FsBlobStore, RangeStreamer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub use config::StreamSettings;

pub const STREAM_PATH: &str = "/audio/stream";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,music_stream=debug,dog_blob=debug";

pub fn build(settings: &StreamSettings) -> anyhow::Result<AxumApp> {
    if !settings.upload_dir.exists() {
        std::fs::create_dir_all(&settings.upload_dir).with_context(|| {
            format!("creating upload dir {}", settings.upload_dir.display())
        })?;
        tracing::info!(dir = %settings.upload_dir.display(), "created upload dir");
    }

    let store = FsBlobStore::new(&settings.upload_dir)
        .with_context(|| format!("opening upload dir {}", settings.upload_dir.display()))?
        .with_chunk_bytes(settings.read_chunk_bytes());
    tracing::debug!(root = %store.root().display(), "serving audio");

    let streamer = RangeStreamer::new(store, settings.blob_config());

    let mut ax = AxumApp::new(streamer)
        .with_buffer(settings.stream_buffer)
        .use_stream(STREAM_PATH)
        .service("/health", || async { "ok" });

    if let Some(dir) = &settings.static_dir {
        ax.router = ax.router.fallback_service(ServeDir::new(dir));
    }

    // Browser players read these to drive seeking
    ax.router = ax.router.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([CONTENT_RANGE, CONTENT_LENGTH, ACCEPT_RANGES, CONTENT_TYPE]),
    );

    Ok(ax.with_request_tracing())
}

//! # dog-blob: range-friendly blob streaming
//!
//! `dog-blob` serves stored media to clients that scrub: audio players and
//! browsers that ask for byte ranges instead of whole files. It knows nothing
//! about HTTP servers; responses go through the small [`ResponseSink`] trait
//! so any transport (axum, hyper, a test buffer) can host it.
//!
//! ## Key Features
//!
//! - **Streaming-first**: bodies are read and written in bounded chunks, never buffered whole
//! - **Range requests**: `bytes=a-b`, `bytes=a-` and suffix `bytes=-n`; anything else fails closed with 416
//! - **Storage agnostic**: directory-backed and in-memory stores, or bring your own [`BlobStore`]
//! - **Confined lookups**: keys never escape the store root
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = MemoryBlobStore::new();
//! store.insert("intro.mp3", vec![0u8; 100], None).await;
//!
//! let streamer = RangeStreamer::new(store, BlobConfig::default());
//! let mut sink = MemorySink::new();
//! let request = StreamRequest::new("intro.mp3").with_range("bytes=0-10");
//!
//! let delivery = streamer.stream(request, &mut sink).await?;
//! assert_eq!(delivery.status, 206);
//! assert_eq!(sink.header("Content-Range"), Some("bytes 0-10/100"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP adapter   │  ← implements ResponseSink (dog-axum)
//! ├─────────────────┤
//! │  RangeStreamer  │  ← lookup, range resolution, status + headers
//! ├─────────────────┤
//! │   BlobStore     │  ← head / open_range
//! └─────────────────┘
//! ```

mod config;
mod error;
mod fs_store;
mod memory_store;
pub mod range;
mod sink;
pub mod store;
pub mod streamer;
mod types;

pub use config::BlobConfig;
pub use error::{BlobError, BlobResult, SinkError};
pub use fs_store::FsBlobStore;
pub use memory_store::MemoryBlobStore;
pub use range::{resolve_header, ByteRange, ResolvedRange};
pub use sink::{MemorySink, ResponseSink};
pub use store::{BlobStore, ObjectHead};
pub use streamer::RangeStreamer;
pub use types::{ByteStream, Delivery, StreamRequest};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobConfig, BlobError, BlobResult, BlobStore, FsBlobStore, MemoryBlobStore, MemorySink,
        RangeStreamer, ResponseSink, StreamRequest,
    };
}

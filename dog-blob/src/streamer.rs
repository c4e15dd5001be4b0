//! Range-aware streaming of a blob into a [`ResponseSink`].
//!
//! Per request the streamer walks one path of this machine:
//!
//! ```text
//! START -> blob missing                  -> 404
//!       -> found, no Range               -> 200 full body
//!       -> found, Range invalid          -> 416 `bytes */size`
//!       -> found, Range valid            -> 206 partial body
//!       -> open/read failure             -> 500
//! ```
//!
//! Nothing is shared between requests. The store stream owns the underlying
//! handle, so every early return (client gone, read error) releases it.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::{
    resolve_header, BlobConfig, BlobError, BlobResult, BlobStore, Delivery, ObjectHead,
    ResolvedRange, ResponseSink, SinkError, StreamRequest,
};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_RANGE: &str = "Content-Range";
pub const ACCEPT_RANGES: &str = "Accept-Ranges";

/// Resolved request, ready to be written out
#[derive(Debug)]
struct Plan {
    head: ObjectHead,
    /// `None` serves the full blob
    range: Option<ResolvedRange>,
}

/// Serves blobs from a [`BlobStore`] with `Range` support
#[derive(Clone)]
pub struct RangeStreamer {
    store: Arc<dyn BlobStore>,
    config: BlobConfig,
}

impl RangeStreamer {
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    pub fn from_arc(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    /// Stream one request into `sink`.
    ///
    /// Error responses (404/416/500) are written to the sink before the error
    /// is returned, so callers only need the result for logging. A
    /// [`SinkError`] means the client went away or the sink was misused;
    /// nothing more can be sent in that case.
    #[tracing::instrument(skip_all, fields(key = %request.key, range = ?request.range))]
    pub async fn stream<S>(&self, request: StreamRequest, sink: &mut S) -> BlobResult<Delivery>
    where
        S: ResponseSink + ?Sized,
    {
        let plan = match self.plan(&request).await {
            Ok(plan) => plan,
            Err(err) => {
                self.reject(&request, &err, sink).await;
                return Err(err);
            }
        };

        self.deliver(&request, plan, sink).await
    }

    async fn plan(&self, request: &StreamRequest) -> BlobResult<Plan> {
        let head = self.store.head(&request.key).await?;
        let range = match request.range.as_deref() {
            Some(header) => Some(resolve_header(header, head.size_bytes)?),
            None => None,
        };
        Ok(Plan { head, range })
    }

    async fn deliver<S>(&self, request: &StreamRequest, plan: Plan, sink: &mut S) -> BlobResult<Delivery>
    where
        S: ResponseSink + ?Sized,
    {
        let Plan { head, range } = plan;
        let status = if range.is_some() { 206 } else { 200 };
        // An empty blob has no byte range at all; its body is simply empty.
        let body_range = range.or_else(|| ResolvedRange::full(head.size_bytes));
        let content_length = body_range.map_or(0, |r| r.content_length());

        // Open before committing headers so a failure can still become a 500.
        let body = match body_range {
            Some(r) if !request.head_only => match self.store.open_range(&request.key, r).await {
                Ok(stream) => Some(stream),
                Err(err) => {
                    let err = vanished_to_internal(err);
                    self.reject(request, &err, sink).await;
                    return Err(err);
                }
            },
            _ => None,
        };

        let content_type = head
            .content_type
            .as_deref()
            .unwrap_or(&self.config.default_content_type);

        sink.set_status(status)?;
        sink.set_header(CONTENT_TYPE, content_type)?;
        sink.set_header(CONTENT_LENGTH, &content_length.to_string())?;
        sink.set_header(ACCEPT_RANGES, "bytes")?;
        if let Some(r) = &range {
            sink.set_header(CONTENT_RANGE, &r.content_range())?;
        }

        let mut bytes_sent = 0u64;
        if let Some(mut body) = body {
            while let Some(chunk) = body.next().await {
                let mut chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        error!(error = %e, bytes_sent, "blob read failed mid-stream");
                        return Err(e.into());
                    }
                };
                // Stores may hand back larger reads than we want on the wire
                while !chunk.is_empty() {
                    let piece = chunk.split_to(chunk.len().min(self.config.read_chunk_bytes.max(1)));
                    let len = piece.len() as u64;
                    if let Err(e) = sink.write(piece).await {
                        warn!(bytes_sent, expected = content_length, "client went away mid-stream");
                        return Err(e.into());
                    }
                    bytes_sent += len;
                }
            }
        }

        sink.close().await?;
        debug!(
            status,
            bytes_sent,
            whole = range.map_or(true, |r| r.is_full_content()),
            "blob streamed"
        );

        Ok(Delivery {
            status,
            range,
            bytes_sent,
        })
    }

    /// Write the error response for `err`. Sink failures here are only logged.
    async fn reject<S>(&self, request: &StreamRequest, err: &BlobError, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        match err.status_code() {
            500 => error!(error = %err, "failed to stream blob"),
            status => debug!(status, error = %err, "rejected stream request"),
        }

        if let Err(e) = write_error(err, request.head_only, sink).await {
            debug!(error = %e, "could not deliver error response");
        }
    }
}

async fn write_error<S>(err: &BlobError, head_only: bool, sink: &mut S) -> Result<(), SinkError>
where
    S: ResponseSink + ?Sized,
{
    sink.set_status(err.status_code())?;

    if let Some(size) = err.unsatisfied_size() {
        sink.set_header(CONTENT_RANGE, &ResolvedRange::unsatisfied_content_range(size))?;
        sink.set_header(CONTENT_LENGTH, "0")?;
    }

    if let Some(message) = err.client_message() {
        let body = Bytes::from(json!({ "error": message }).to_string());
        sink.set_header(CONTENT_TYPE, "application/json")?;
        sink.set_header(CONTENT_LENGTH, &body.len().to_string())?;
        if !head_only {
            sink.write(body).await?;
        }
    }

    sink.close().await
}

/// The blob was there a moment ago, so losing it now is a server fault.
fn vanished_to_internal(err: BlobError) -> BlobError {
    match err {
        BlobError::NotFound { id } => BlobError::Io {
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("blob {id} disappeared after lookup"),
            ),
        },
        other => other,
    }
}

//! A [`ResponseSink`] that feeds an axum streaming body.
//!
//! The head (status + headers) travels through a oneshot so the handler can
//! return a `Response` as soon as it is known; body chunks follow through a
//! bounded channel. When hyper drops the body (client gone) the next write
//! fails with [`SinkError::Disconnected`]. An abort travels on its own
//! oneshot so a full body buffer cannot swallow it.

use std::io;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use dog_blob::{ResponseSink, SinkError};
use tokio::sync::{mpsc, oneshot};

use crate::DogAxumError;

type BodyItem = Result<Bytes, io::Error>;

#[derive(Debug, Default)]
struct Head {
    status: StatusCode,
    headers: HeaderMap,
}

/// Writer half, handed to the streaming task
pub struct ChannelSink {
    head: Head,
    head_tx: Option<oneshot::Sender<Head>>,
    body_tx: Option<mpsc::Sender<BodyItem>>,
    abort_tx: Option<oneshot::Sender<io::Error>>,
    closed: bool,
}

/// Reader half, turned into the HTTP response by the handler
pub struct PendingResponse {
    head_rx: oneshot::Receiver<Head>,
    body_rx: mpsc::Receiver<BodyItem>,
    abort_rx: oneshot::Receiver<io::Error>,
}

/// Create a connected sink/response pair. `buffer` is in chunks.
pub fn channel(buffer: usize) -> (ChannelSink, PendingResponse) {
    let (head_tx, head_rx) = oneshot::channel();
    let (body_tx, body_rx) = mpsc::channel(buffer.max(1));
    let (abort_tx, abort_rx) = oneshot::channel();

    let sink = ChannelSink {
        head: Head::default(),
        head_tx: Some(head_tx),
        body_tx: Some(body_tx),
        abort_tx: Some(abort_tx),
        closed: false,
    };
    (sink, PendingResponse { head_rx, body_rx, abort_rx })
}

impl ChannelSink {
    fn is_committed(&self) -> bool {
        self.head_tx.is_none()
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        if let Some(tx) = self.head_tx.take() {
            tx.send(std::mem::take(&mut self.head))
                .map_err(|_| SinkError::Disconnected)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    fn set_status(&mut self, status: u16) -> Result<(), SinkError> {
        if self.is_committed() {
            return Err(SinkError::HeadersCommitted);
        }
        self.head.status = StatusCode::from_u16(status).map_err(|_| SinkError::InvalidHeader(status.to_string()))?;
        Ok(())
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), SinkError> {
        if self.is_committed() {
            return Err(SinkError::HeadersCommitted);
        }
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| SinkError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|_| SinkError::InvalidHeader(name.as_str().to_string()))?;
        self.head.headers.insert(name, value);
        Ok(())
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        self.commit()?;
        let tx = self.body_tx.as_ref().ok_or(SinkError::Disconnected)?;
        tx.send(Ok(chunk)).await.map_err(|_| SinkError::Disconnected)
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.commit()?;
        self.body_tx = None;
        self.abort_tx = None;
        self.closed = true;
        Ok(())
    }
}

impl Drop for ChannelSink {
    fn drop(&mut self) {
        // Headers promised a length we never delivered; make the transport
        // abort the body instead of ending it short.
        if self.is_committed() && !self.closed {
            if let Some(tx) = self.abort_tx.take() {
                let _ = tx.send(io::Error::other("stream aborted"));
            }
        }
    }
}

impl PendingResponse {
    /// Wait for the head and build the response around the body channel.
    ///
    /// If the writer goes away before committing a head, this is a 500.
    pub async fn into_response(self) -> Response {
        let Ok(head) = self.head_rx.await else {
            return DogAxumError(anyhow::anyhow!("stream ended before a response was produced"))
                .into_response();
        };

        let state = BodyState {
            rx: self.body_rx,
            abort: Some(self.abort_rx),
        };
        let body = futures::stream::unfold(state, next_item);

        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = head.status;
        *response.headers_mut() = head.headers;
        response
    }
}

struct BodyState {
    rx: mpsc::Receiver<BodyItem>,
    /// `None` once the writer closed cleanly or the abort was delivered
    abort: Option<oneshot::Receiver<io::Error>>,
}

enum Next {
    Chunk(Option<BodyItem>),
    Abort(Option<io::Error>),
}

async fn next_item(mut state: BodyState) -> Option<(BodyItem, BodyState)> {
    loop {
        // Abort first: it is sent before the body sender is dropped, so it is
        // always seen ahead of the end of the channel.
        let next = match state.abort.as_mut() {
            Some(abort) => tokio::select! {
                biased;
                reason = abort => Next::Abort(reason.ok()),
                chunk = state.rx.recv() => Next::Chunk(chunk),
            },
            None => Next::Chunk(state.rx.recv().await),
        };

        match next {
            Next::Abort(reason) => {
                state.abort = None;
                if let Some(err) = reason {
                    return Some((Err(err), state));
                }
            }
            Next::Chunk(Some(item)) => return Some((item, state)),
            Next::Chunk(None) => return None,
        }
    }
}

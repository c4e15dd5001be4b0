use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::SinkError;

/// Where a streamed response goes.
///
/// Status and headers must be settled before the first `write` or `close`;
/// after that they are committed and further changes fail with
/// [`SinkError::HeadersCommitted`].
#[async_trait]
pub trait ResponseSink: Send {
    fn set_status(&mut self, status: u16) -> Result<(), SinkError>;

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), SinkError>;

    /// Write the next body chunk. Commits headers on first call.
    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError>;

    /// Finish the response. Commits headers if nothing was written.
    async fn close(&mut self) -> Result<(), SinkError>;
}

/// Buffers the whole response in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: BytesMut,
    pub committed: bool,
    pub closed: bool,
    /// Simulate a client that goes away after this many writes
    pub disconnect_after: Option<usize>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disconnect_after(mut self, writes: usize) -> Self {
        self.disconnect_after = Some(writes);
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_bytes(&self) -> Bytes {
        self.body.clone().freeze()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[async_trait]
impl ResponseSink for MemorySink {
    fn set_status(&mut self, status: u16) -> Result<(), SinkError> {
        if self.committed {
            return Err(SinkError::HeadersCommitted);
        }
        self.status = Some(status);
        Ok(())
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), SinkError> {
        if self.committed {
            return Err(SinkError::HeadersCommitted);
        }
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        self.committed = true;
        if self.disconnect_after.is_some_and(|limit| self.writes >= limit) {
            return Err(SinkError::Disconnected);
        }
        self.writes += 1;
        self.body.extend_from_slice(&chunk);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.committed = true;
        self.closed = true;
        Ok(())
    }
}

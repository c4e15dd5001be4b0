use std::sync::Arc;

use dog_blob::RangeStreamer;

/// Default number of body chunks buffered between the streaming task and
/// the connection.
pub const DEFAULT_STREAM_BUFFER: usize = 8;

/// Shared state for the stream routes
#[derive(Clone)]
pub struct StreamState {
    pub streamer: Arc<RangeStreamer>,
    pub buffer: usize,
}

impl StreamState {
    pub fn new(streamer: RangeStreamer) -> Self {
        Self {
            streamer: Arc::new(streamer),
            buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }
}

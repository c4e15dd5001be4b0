use bytes::Bytes;
use futures_core::Stream;
use std::pin::Pin;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// One request to stream a blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub key: String,
    /// Raw `Range` header value, if the client sent one
    pub range: Option<String>,
    /// Respond with status and headers only
    pub head_only: bool,
}

impl StreamRequest {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            key: key.into(),
            range: None,
            head_only: false,
        }
    }

    pub fn with_range<S: Into<String>>(mut self, range: S) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_optional_range(mut self, range: Option<String>) -> Self {
        self.range = range;
        self
    }

    pub fn head_only(mut self, head_only: bool) -> Self {
        self.head_only = head_only;
        self
    }
}

/// What was sent for a successful request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub range: Option<crate::ResolvedRange>,
    pub bytes_sent: u64,
}

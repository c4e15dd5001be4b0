use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur while locating or streaming a blob
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {id}")]
    NotFound { id: String },

    #[error("Malformed range header {header:?} for blob of {size} bytes")]
    MalformedRange { header: String, size: u64 },

    #[error("Range not satisfiable for blob of {size} bytes")]
    RangeUnsatisfiable { size: u64 },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Response sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Errors raised by a [`crate::ResponseSink`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("headers already committed")]
    HeadersCommitted,

    #[error("client disconnected")]
    Disconnected,

    #[error("invalid header {0:?}")]
    InvalidHeader(String),
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a malformed range error
    pub fn malformed_range<S: Into<String>>(header: S, size: u64) -> Self {
        Self::MalformedRange {
            header: header.into(),
            size,
        }
    }

    /// Total size to report in a 416 `Content-Range`, for range errors only
    pub fn unsatisfied_size(&self) -> Option<u64> {
        match self {
            Self::MalformedRange { size, .. } | Self::RangeUnsatisfiable { size } => Some(*size),
            _ => None,
        }
    }

    /// HTTP status this error maps to.
    ///
    /// Sink errors have no status of their own: by the time they happen the
    /// response can no longer be changed. They report 500 for logging only.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::MalformedRange { .. } | Self::RangeUnsatisfiable { .. } => 416,
            Self::Backend { .. } | Self::Io { .. } | Self::Sink(_) => 500,
        }
    }

    /// Message safe to show to clients. `None` means an empty body.
    pub fn client_message(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Audio file not found"),
            Self::MalformedRange { .. } | Self::RangeUnsatisfiable { .. } => None,
            Self::Backend { .. } | Self::Io { .. } | Self::Sink(_) => Some("Internal server error"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Sink(SinkError::Disconnected))
    }
}

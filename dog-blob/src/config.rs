/// Configuration for blob streaming
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Upper bound on a single read from the store (and a single body chunk)
    pub read_chunk_bytes: usize,

    /// `Content-Type` used when the store has no type for a blob
    pub default_content_type: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            read_chunk_bytes: 64 * 1024, // 64KB
            default_content_type: "audio/mpeg".to_string(),
        }
    }
}

impl BlobConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set read chunk size. Zero is bumped to one byte.
    pub fn with_read_chunk_bytes(mut self, bytes: usize) -> Self {
        self.read_chunk_bytes = bytes.max(1);
        self
    }

    /// Set the fallback content type
    pub fn with_default_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.default_content_type = content_type.into();
        self
    }
}

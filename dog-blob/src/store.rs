use async_trait::async_trait;

use crate::{BlobResult, ByteStream, ResolvedRange};

/// Read-side storage primitives a streaming backend must provide
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get blob metadata without content. `NotFound` when absent.
    async fn head(&self, key: &str) -> BlobResult<ObjectHead>;

    /// Open an inclusive byte range of the blob as a stream
    async fn open_range(&self, key: &str, range: ResolvedRange) -> BlobResult<ByteStream>;

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        match self.head(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn size(&self, key: &str) -> BlobResult<u64> {
        Ok(self.head(key).await?.size_bytes)
    }
}

/// Metadata about a blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl ObjectHead {
    pub fn new(size_bytes: u64) -> Self {
        Self {
            size_bytes,
            content_type: None,
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{BlobConfig, BlobError, BlobResult, BlobStore, ByteStream, ObjectHead, ResolvedRange};

#[derive(Debug, Clone)]
struct MemoryBlob {
    data: Bytes,
    content_type: Option<String>,
}

/// In-memory blob store. Handy for tests and ephemeral setups.
#[derive(Debug)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, MemoryBlob>>,
    chunk_bytes: usize,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            chunk_bytes: BlobConfig::default().read_chunk_bytes,
        }
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = bytes.max(1);
        self
    }

    pub async fn insert<K, D>(&self, key: K, data: D, content_type: Option<&str>)
    where
        K: Into<String>,
        D: Into<Bytes>,
    {
        let blob = MemoryBlob {
            data: data.into(),
            content_type: content_type.map(str::to_string),
        };
        self.blobs.write().await.insert(key.into(), blob);
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.blobs.write().await.remove(key).is_some()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let blobs = self.blobs.read().await;
        let blob = blobs.get(key).ok_or_else(|| BlobError::not_found(key))?;
        Ok(ObjectHead {
            size_bytes: blob.data.len() as u64,
            content_type: blob.content_type.clone(),
        })
    }

    async fn open_range(&self, key: &str, range: ResolvedRange) -> BlobResult<ByteStream> {
        let data = {
            let blobs = self.blobs.read().await;
            blobs.get(key).ok_or_else(|| BlobError::not_found(key))?.data.clone()
        };

        let end = usize::try_from(range.end)
            .ok()
            .and_then(|end| end.checked_add(1))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                BlobError::Io {
                    source: std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "blob is shorter than the requested range",
                    ),
                }
            })?;
        let slice = data.slice(range.start as usize..end);

        let chunks: Vec<Result<Bytes, std::io::Error>> = (0..slice.len())
            .step_by(self.chunk_bytes)
            .map(|offset| Ok(slice.slice(offset..(offset + self.chunk_bytes).min(slice.len()))))
            .collect();

        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn serves_ranges_in_chunks() {
        let store = MemoryBlobStore::new().with_chunk_bytes(4);
        store.insert("a.mp3", &b"0123456789"[..], Some("audio/ogg")).await;

        let head = store.head("a.mp3").await.unwrap();
        assert_eq!(head.size_bytes, 10);
        assert_eq!(head.content_type.as_deref(), Some("audio/ogg"));

        let range = ResolvedRange { start: 1, end: 8, total_size: 10 };
        let chunks: Vec<Bytes> = store
            .open_range("a.mp3", range)
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec![Bytes::from("1234"), Bytes::from("5678")]);
    }

    #[tokio::test]
    async fn removed_blob_is_gone() {
        let store = MemoryBlobStore::new();
        store.insert("a.mp3", vec![1u8, 2, 3], None).await;
        assert!(store.remove("a.mp3").await);
        assert!(!store.exists("a.mp3").await.unwrap());
        assert!(store.open_range("a.mp3", ResolvedRange { start: 0, end: 0, total_size: 3 }).await.is_err());
    }
}

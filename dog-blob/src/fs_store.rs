//! Directory-backed blob store keyed by filename.

use std::io::{self, SeekFrom};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::{BlobConfig, BlobError, BlobResult, BlobStore, ByteStream, ObjectHead, ResolvedRange};

/// Serves regular files under a single root directory.
///
/// Keys are relative paths made only of normal components. Anything that
/// resolves outside the root, symlinks included, is reported as not found.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    chunk_bytes: usize,
}

impl FsBlobStore {
    /// The root must exist; it is canonicalized once here.
    pub fn new<P: AsRef<Path>>(root: P) -> BlobResult<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;
        Ok(Self {
            root,
            chunk_bytes: BlobConfig::default().read_chunk_bytes,
        })
    }

    pub fn with_chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = bytes.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lexical checks only; no filesystem access.
    fn sanitize(key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains('\0') || key.contains('\\') {
            return None;
        }

        let mut relative = PathBuf::new();
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                _ => return None,
            }
        }

        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(relative)
        }
    }

    async fn locate(&self, key: &str) -> BlobResult<PathBuf> {
        let Some(relative) = Self::sanitize(key) else {
            debug!(key, "rejected blob key");
            return Err(BlobError::not_found(key));
        };

        let resolved = match tokio::fs::canonicalize(self.root.join(&relative)).await {
            Ok(path) => path,
            Err(e) => {
                debug!(key, error = %e, "blob path did not resolve");
                return Err(BlobError::not_found(key));
            }
        };

        if !resolved.starts_with(&self.root) {
            debug!(key, resolved = %resolved.display(), "blob path escapes store root");
            return Err(BlobError::not_found(key));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let path = self.locate(key).await?;
        let meta = tokio::fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(BlobError::not_found(key));
        }
        Ok(ObjectHead::new(meta.len()))
    }

    async fn open_range(&self, key: &str, range: ResolvedRange) -> BlobResult<ByteStream> {
        let path = self.locate(key).await?;
        let mut file = tokio::fs::File::open(&path).await?;
        file.seek(SeekFrom::Start(range.start)).await?;

        let chunk_bytes = self.chunk_bytes as u64;
        let stream = async_stream::stream! {
            let mut remaining = range.content_length();
            while remaining > 0 {
                let mut buf = BytesMut::zeroed(remaining.min(chunk_bytes) as usize);
                match file.read(&mut buf[..]).await {
                    Ok(0) => {
                        yield Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "blob ended before the requested range",
                        ));
                        break;
                    }
                    Ok(n) => {
                        buf.truncate(n);
                        remaining -= n as u64;
                        yield Ok(buf.freeze());
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

//! `Range` header parsing and resolution.
//!
//! Only single byte ranges are understood: `bytes=a-b`, `bytes=a-` and the
//! suffix form `bytes=-n`. Anything else, multi-range sets included, is
//! rejected rather than silently served as full content.

use serde::{Deserialize, Serialize};

use crate::{BlobError, BlobResult};

/// A byte range as requested by a client, before it is checked against a size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end`, both inclusive
    FromTo { start: u64, end: u64 },
    /// `bytes=start-`, to the end of the blob
    From { start: u64 },
    /// `bytes=-len`, the last `len` bytes
    Suffix { len: u64 },
}

impl ByteRange {
    /// Parse a raw `Range` header value.
    ///
    /// Returns `None` for anything that is not a single `bytes=<a>-<b>` range.
    pub fn parse(header: &str) -> Option<Self> {
        let value = header.trim();
        let (unit, spec) = value.split_once('=')?;
        if !unit.trim().eq_ignore_ascii_case("bytes") {
            return None;
        }
        if spec.contains(',') {
            return None;
        }

        let (start, end) = spec.split_once('-')?;
        let start = parse_bound(start.trim())?;
        let end = parse_bound(end.trim())?;

        match (start, end) {
            (Some(start), Some(end)) => Some(Self::FromTo { start, end }),
            (Some(start), None) => Some(Self::From { start }),
            (None, Some(len)) => Some(Self::Suffix { len }),
            (None, None) => None,
        }
    }

    /// Resolve against the blob's total size.
    ///
    /// `None` means the range cannot be satisfied. An end past the last byte
    /// is clamped, but only once the start is known to be inside the blob.
    pub fn resolve(&self, total_size: u64) -> Option<ResolvedRange> {
        let last = total_size.checked_sub(1)?;

        let (start, end) = match *self {
            Self::FromTo { start, end } => {
                if start > last || end < start {
                    return None;
                }
                (start, end.min(last))
            }
            Self::From { start } => {
                if start > last {
                    return None;
                }
                (start, last)
            }
            Self::Suffix { len } => {
                if len == 0 {
                    return None;
                }
                (total_size.saturating_sub(len), last)
            }
        };

        Some(ResolvedRange {
            start,
            end,
            total_size,
        })
    }
}

/// `Ok(None)` for an empty side, `None` for garbage.
fn parse_bound(raw: &str) -> Option<Option<u64>> {
    if raw.is_empty() {
        return Some(None);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().map(Some)
}

/// Concrete inclusive interval inside a blob of `total_size` bytes.
///
/// Invariant: `start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ResolvedRange {
    /// The whole blob, or `None` for an empty one
    pub fn full(total_size: u64) -> Option<Self> {
        ByteRange::From { start: 0 }.resolve(total_size)
    }

    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_full_content(&self) -> bool {
        self.start == 0 && self.end + 1 == self.total_size
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }

    /// `Content-Range` value for a 416 response
    pub fn unsatisfied_content_range(total_size: u64) -> String {
        format!("bytes */{}", total_size)
    }
}

/// Parse and resolve a `Range` header in one step.
pub fn resolve_header(header: &str, total_size: u64) -> BlobResult<ResolvedRange> {
    let range = ByteRange::parse(header).ok_or_else(|| BlobError::malformed_range(header, total_size))?;
    range
        .resolve(total_size)
        .ok_or(BlobError::RangeUnsatisfiable { size: total_size })
}

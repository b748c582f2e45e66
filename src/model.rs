//! Core data types for LogServ.
//!
//! This module defines the data structures flowing between the chunk
//! reader, the reverse line scanner, and the search engine.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A contiguous slice of the underlying file.
///
/// Chunks are produced by [`ChunkReader`](crate::reader::ChunkReader) in
/// decreasing-offset order and consumed by the scanner, which discards them
/// once fully searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte position of `bytes[0]` in the file.
    pub offset: u64,

    /// The raw bytes of the window.
    pub bytes: Bytes,
}

/// A complete log entry, exclusive of the newline that terminated it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Byte position in the file of the line's first byte.
    ///
    /// Reusing this offset as a resume position yields a scan strictly
    /// older than this line.
    pub offset: u64,

    /// The raw bytes of the line, truncated to
    /// [`MAX_RESULT_ENTRY_LENGTH`](crate::config::MAX_RESULT_ENTRY_LENGTH).
    pub bytes: Vec<u8>,
}

/// A query filter applied to each scanned line.
///
/// Currently the only variant is a plain substring match. The enum is
/// externally tagged in JSON (`{"text": "..."}`) so continuation tokens
/// round-trip the variant faithfully and future variants extend the tag
/// set without changing the wire shape of existing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    /// Accept lines containing this substring.
    #[serde(rename = "text")]
    Text(String),
}

impl Query {
    /// Returns whether the decoded line text satisfies this query.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Query::Text(needle) => text.contains(needle.as_str()),
        }
    }
}

/// Output of one local scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalResult {
    /// Accepted lines, newest first, decoded as UTF-8 (lossy).
    pub entries: Vec<String>,

    /// Earliest byte offset the scan reached, or `None` when the scan
    /// consumed the file down to offset zero and nothing older remains.
    pub resume_from: Option<u64>,
}

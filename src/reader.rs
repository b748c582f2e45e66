//! Backwards chunked file access.
//!
//! [`ChunkReader`] opens a log file read-only and yields fixed-size byte
//! windows from the end of the file toward its start. The scanner consumes
//! these windows to reassemble lines in reverse order.

use std::io::SeekFrom;
use std::path::Path;

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::model::Chunk;

/// Reads a file in [`CHUNK_SIZE`] windows in decreasing-offset order.
///
/// The first chunk covers the tail of the scan range; subsequent chunks
/// cover the preceding bytes, clamped at offset zero. The file handle is
/// owned by the reader and released when the reader is dropped, on every
/// exit path of the surrounding scan.
pub struct ChunkReader {
    file: File,
    /// Exclusive upper bound of the next chunk. Zero once exhausted.
    next_end: u64,
}

impl ChunkReader {
    /// Opens `path` read-only for a scan of the bytes `[0, end)`.
    ///
    /// With `end` of `None` the scan covers the whole file. Fails with
    /// [`Error::NotFound`] when the path does not resolve to a regular
    /// file, and with [`Error::InvalidInput`] when `end` exceeds the
    /// file's current size.
    pub async fn open(path: &Path, end: Option<u64>) -> Result<Self> {
        let file = File::open(path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::NotFound);
        }

        let len = metadata.len();
        let end = end.unwrap_or(len);
        if end > len {
            return Err(Error::InvalidInput(format!(
                "resume offset {} is beyond the end of the file ({} bytes)",
                end, len
            )));
        }

        Ok(Self {
            file,
            next_end: end,
        })
    }

    /// Returns the next chunk toward the start of the file, or `None` after
    /// the chunk starting at offset zero has been emitted.
    pub async fn next(&mut self) -> Result<Option<Chunk>> {
        if self.next_end == 0 {
            return Ok(None);
        }

        let start = self.next_end.saturating_sub(CHUNK_SIZE);
        let len = (self.next_end - start) as usize;

        self.file.seek(SeekFrom::Start(start)).await?;
        let mut buf = vec![0u8; len];
        // read_exact retries short reads; hitting EOF short of the window
        // means the file shrank mid-scan.
        self.file.read_exact(&mut buf).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::Internal("unexpected end of file, log shrank during scan".to_string())
            } else {
                Error::from(err)
            }
        })?;

        self.next_end = start;
        Ok(Some(Chunk {
            offset: start,
            bytes: Bytes::from(buf),
        }))
    }
}

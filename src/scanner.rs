//! Reverse line reassembly.
//!
//! [`ReverseLineScanner`] consumes chunks from a [`ChunkReader`] and emits
//! whole log lines in descending offset order, newest first. Lines that
//! straddle chunk boundaries are reassembled through a bounded `partial`
//! buffer; lines longer than
//! [`MAX_RESULT_ENTRY_LENGTH`](crate::config::MAX_RESULT_ENTRY_LENGTH)
//! keep their first bytes and drop the tail, while their reported offset
//! still points at the true first byte of the line.

use crate::config::MAX_RESULT_ENTRY_LENGTH;
use crate::error::Result;
use crate::model::{Chunk, Line};
use crate::reader::ChunkReader;

/// A finite, non-restartable sequence of [`Line`]s in descending offset
/// order.
///
/// Within each chunk the scanner walks backwards looking for newline
/// bytes. Bytes between two newlines form a line tail; any accumulated
/// `partial` (the continuation of that line in younger chunks) is appended
/// before emission. Bytes with no preceding newline in the chunk are saved
/// as the new `partial` and completed by older chunks. Whatever remains
/// after the chunk at offset zero is the oldest line of the scan.
pub struct ReverseLineScanner {
    chunks: ChunkReader,
    current: Option<Chunk>,
    /// Exclusive end of the unsearched window in the current chunk.
    line_ending: usize,
    /// Leading fragment of a line whose terminator has not been found yet,
    /// capped at [`MAX_RESULT_ENTRY_LENGTH`] bytes.
    partial: Vec<u8>,
    /// True until the first chunk has been received; the first chunk is the
    /// only place a trailing newline needs skipping.
    at_scan_end: bool,
    done: bool,
}

impl ReverseLineScanner {
    pub fn new(chunks: ChunkReader) -> Self {
        Self {
            chunks,
            current: None,
            line_ending: 0,
            partial: Vec::new(),
            at_scan_end: true,
            done: false,
        }
    }

    /// Returns the next line toward the start of the file, or `None` once
    /// the scan range is exhausted.
    pub async fn next(&mut self) -> Result<Option<Line>> {
        loop {
            if self.done {
                return Ok(None);
            }

            let chunk = match self.current.take() {
                Some(chunk) => chunk,
                None => match self.chunks.next().await? {
                    Some(chunk) => {
                        self.line_ending = chunk.bytes.len();
                        if self.at_scan_end {
                            self.at_scan_end = false;
                            // A newline at the very end of the scan range
                            // terminates the newest line; it does not open
                            // an empty one.
                            if chunk.bytes.last() == Some(&b'\n') {
                                self.line_ending -= 1;
                            }
                        }
                        chunk
                    }
                    None => {
                        // Empty scan range; nothing was ever read.
                        self.done = true;
                        return Ok(None);
                    }
                },
            };

            let window = &chunk.bytes[..self.line_ending];
            match window.iter().rposition(|&b| b == b'\n') {
                Some(newline) => {
                    let offset = chunk.offset + newline as u64 + 1;
                    let bytes = assemble(
                        &chunk.bytes[newline + 1..self.line_ending],
                        std::mem::take(&mut self.partial),
                    );
                    self.line_ending = newline;
                    self.current = Some(chunk);
                    return Ok(Some(Line { offset, bytes }));
                }
                None => {
                    prepend(&mut self.partial, window);
                    if chunk.offset == 0 {
                        // The remaining fragment is the oldest line of the
                        // scan; it starts at the first byte of the file.
                        self.done = true;
                        return Ok(Some(Line {
                            offset: 0,
                            bytes: std::mem::take(&mut self.partial),
                        }));
                    }
                }
            }
        }
    }
}

/// Joins a line head from the current chunk with the partial tail carried
/// over from younger chunks, capped at [`MAX_RESULT_ENTRY_LENGTH`].
fn assemble(head: &[u8], tail: Vec<u8>) -> Vec<u8> {
    if head.len() >= MAX_RESULT_ENTRY_LENGTH {
        return head[..MAX_RESULT_ENTRY_LENGTH].to_vec();
    }
    let mut line = head.to_vec();
    line.extend_from_slice(&tail);
    line.truncate(MAX_RESULT_ENTRY_LENGTH);
    line
}

/// Prepends `prefix` to the partial buffer, keeping at most the first
/// [`MAX_RESULT_ENTRY_LENGTH`] bytes.
///
/// Truncating to the head commutes with prepending, so dropping the tail
/// here never discards bytes that would survive the final truncation.
fn prepend(partial: &mut Vec<u8>, prefix: &[u8]) {
    if prefix.is_empty() {
        return;
    }
    if prefix.len() >= MAX_RESULT_ENTRY_LENGTH {
        *partial = prefix[..MAX_RESULT_ENTRY_LENGTH].to_vec();
        return;
    }
    let mut next = Vec::with_capacity((prefix.len() + partial.len()).min(MAX_RESULT_ENTRY_LENGTH));
    next.extend_from_slice(prefix);
    next.extend_from_slice(partial);
    next.truncate(MAX_RESULT_ENTRY_LENGTH);
    *partial = next;
}

//! The paginated search engine.
//!
//! [`search`] pulls lines from a [`ReverseLineScanner`] and applies the
//! substring filter, stopping as soon as the result limit is reached. The
//! earliest offset touched is reported back so the caller can mint a
//! continuation token and resume the scan strictly before it.

use std::path::Path;

use crate::config::SearchOptions;
use crate::error::Result;
use crate::model::LocalResult;
use crate::reader::ChunkReader;
use crate::scanner::ReverseLineScanner;

/// Scans `path` backwards from `options.resume_from` (or the file end),
/// returning up to `options.max_results` matching lines, newest first.
///
/// Line bytes are decoded as UTF-8 with invalid sequences replaced; a
/// query never fails on undecodable content. Zero-length lines are
/// skipped. `resume_from` in the result is present iff the scan stopped
/// with strictly more of the file left to read.
pub async fn search(path: &Path, options: &SearchOptions) -> Result<LocalResult> {
    let reader = ChunkReader::open(path, options.resume_from).await?;
    let mut scanner = ReverseLineScanner::new(reader);

    let mut entries = Vec::new();
    let mut earliest: Option<u64> = None;

    while let Some(line) = scanner.next().await? {
        earliest = Some(line.offset);
        if line.bytes.is_empty() {
            continue;
        }

        let text = String::from_utf8_lossy(&line.bytes);
        let accepted = match &options.query {
            Some(query) => query.matches(&text),
            None => true,
        };
        if accepted {
            entries.push(text.into_owned());
            if entries.len() == options.max_results {
                break;
            }
        }
    }

    // A line starting at offset zero means the scan consumed the whole
    // range; only a positive earliest offset leaves anything to resume.
    let resume_from = earliest.filter(|&offset| offset > 0);

    Ok(LocalResult {
        entries,
        resume_from,
    })
}

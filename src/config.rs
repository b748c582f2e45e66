//! Scan limits and search options.
//!
//! This module defines the fixed limits that bound every scan and the
//! [`SearchOptions`] struct that carries the parameters of a single scan.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::Query;

/// Size of the byte windows read from the end of a file toward its start.
pub const CHUNK_SIZE: u64 = 64 * 1024;

/// Maximum length in bytes of a returned log line. Longer lines keep their
/// first `MAX_RESULT_ENTRY_LENGTH` bytes and drop the tail.
pub const MAX_RESULT_ENTRY_LENGTH: usize = 2048;

/// Maximum length of the `s` substring filter.
pub const MAX_SEARCH_TEXT_LENGTH: usize = 200;

/// Maximum on-wire length of a continuation token. Oversized tokens are
/// rejected before any decode attempt.
pub const MAX_CONTINUATION_TOKEN_LENGTH: usize = 200;

/// Maximum length of the request path.
pub const MAX_PATH_LENGTH: usize = 1000;

/// Hard cap on the number of entries returned by a single request.
pub const GLOBAL_MAX_RESULTS: usize = 100;

/// Wall-clock deadline shared by all peer requests of one aggregator query.
pub const GLOBAL_TIMEOUT: Duration = Duration::from_millis(5000);

/// The parameters of a single scan.
///
/// Built by the request validator for fresh queries, or decoded from a
/// continuation token for follow-up pages. Read-only after
/// [`validate_and_normalize`](SearchOptions::validate_and_normalize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Number of entries after which the scan stops.
    pub max_results: usize,

    /// Optional filter; a line is accepted only when it matches.
    pub query: Option<Query>,

    /// Byte offset at which the scan starts, exclusive. Lines emitted are
    /// strictly older than this position. `None` scans from the file end.
    pub resume_from: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: GLOBAL_MAX_RESULTS,
            query: None,
            resume_from: None,
        }
    }
}

impl SearchOptions {
    /// Bounds-check and normalize the options.
    ///
    /// Applies the [`GLOBAL_MAX_RESULTS`] cap and re-checks the search text
    /// length. Options arriving through a continuation token pass through
    /// here as well, so a hand-crafted token cannot widen the limits.
    pub fn validate_and_normalize(mut self) -> Result<Self> {
        if self.max_results == 0 {
            return Err(Error::InvalidInput(
                "query parameter n must be a positive integer".to_string(),
            ));
        }
        self.max_results = self.max_results.min(GLOBAL_MAX_RESULTS);

        if let Some(Query::Text(text)) = &self.query
            && text.len() > MAX_SEARCH_TEXT_LENGTH
        {
            return Err(Error::InvalidInput(format!(
                "search text must not exceed {} bytes",
                MAX_SEARCH_TEXT_LENGTH
            )));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_cap_max_results_at_global_limit() {
        // given
        let options = SearchOptions {
            max_results: 1000,
            ..Default::default()
        };

        // when
        let normalized = options.validate_and_normalize().unwrap();

        // then
        assert_eq!(normalized.max_results, GLOBAL_MAX_RESULTS);
    }

    #[test]
    fn should_keep_max_results_below_the_limit() {
        // given
        let options = SearchOptions {
            max_results: 3,
            ..Default::default()
        };

        // when
        let normalized = options.validate_and_normalize().unwrap();

        // then
        assert_eq!(normalized.max_results, 3);
    }

    #[test]
    fn should_reject_zero_max_results() {
        // given
        let options = SearchOptions {
            max_results: 0,
            ..Default::default()
        };

        // when
        let result = options.validate_and_normalize();

        // then
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains('n')));
    }

    #[test]
    fn should_reject_oversized_search_text() {
        // given
        let options = SearchOptions {
            query: Some(Query::Text("x".repeat(MAX_SEARCH_TEXT_LENGTH + 1))),
            ..Default::default()
        };

        // when
        let result = options.validate_and_normalize();

        // then
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}

//! Request validation and normalization.
//!
//! The query surface is `GET /<path>?n=<int>&s=<string>&cont=<token>`.
//! This module bounds-checks the parameters, enforces the continuation
//! exclusivity rule, and resolves requested file paths safely against the
//! serve root.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::config::{
    GLOBAL_MAX_RESULTS, MAX_CONTINUATION_TOKEN_LENGTH, MAX_PATH_LENGTH, MAX_SEARCH_TEXT_LENGTH,
    SearchOptions,
};
use crate::error::{Error, Result};
use crate::model::Query;

/// Raw query parameters as they arrive on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct RawTailParams {
    /// Requested result count; parsed manually so a bad value yields a
    /// targeted error.
    pub n: Option<String>,

    /// Substring filter.
    pub s: Option<String>,

    /// Continuation token from a previous page.
    pub cont: Option<String>,
}

/// A validated query: either a fresh scan or a continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailRequest {
    Fresh(SearchOptions),
    Continuation(String),
}

/// Validates the raw parameters into a [`TailRequest`].
///
/// A continuation token is mutually exclusive with `n` and `s`; the token
/// already carries both so that pages stay homogeneous. Fresh requests get
/// `n` parsed and clamped to [`GLOBAL_MAX_RESULTS`] (silently, per the
/// wire contract) and default to the cap when `n` is absent.
pub fn validate_tail_params(params: RawTailParams) -> Result<TailRequest> {
    if let Some(cont) = params.cont {
        if params.n.is_some() || params.s.is_some() {
            return Err(Error::InvalidInput(
                "n and s must not be combined with a continuation token".to_string(),
            ));
        }
        if cont.len() > MAX_CONTINUATION_TOKEN_LENGTH {
            return Err(Error::InvalidInput(format!(
                "continuation token must not exceed {} bytes",
                MAX_CONTINUATION_TOKEN_LENGTH
            )));
        }
        return Ok(TailRequest::Continuation(cont));
    }

    if let Some(s) = &params.s
        && s.len() > MAX_SEARCH_TEXT_LENGTH
    {
        return Err(Error::InvalidInput(format!(
            "search text must not exceed {} bytes",
            MAX_SEARCH_TEXT_LENGTH
        )));
    }

    let max_results = match params.n {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n >= 1 => n.min(GLOBAL_MAX_RESULTS),
            _ => {
                return Err(Error::InvalidInput(
                    "query parameter n must be a positive integer".to_string(),
                ));
            }
        },
        None => GLOBAL_MAX_RESULTS,
    };

    Ok(TailRequest::Fresh(SearchOptions {
        max_results,
        query: params.s.map(Query::Text),
        resume_from: None,
    }))
}

/// Bounds-checks the raw request path for both serving modes.
pub fn ensure_path_length(path: &str) -> Result<()> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(Error::InvalidInput(format!(
            "path must not exceed {} bytes",
            MAX_PATH_LENGTH
        )));
    }
    Ok(())
}

/// Resolves a requested file path against the serve root.
///
/// The joined path is normalized lexically and must keep the root as a
/// prefix; anything escaping it is indistinguishable from a missing file.
/// Symbolic links are not resolved, so a link inside the root is followed
/// wherever it points.
pub fn resolve_path(root: &Path, raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        return Err(Error::NotFound);
    }

    let resolved = normalize_lexically(&root.join(raw));
    if !resolved.starts_with(root) {
        return Err(Error::NotFound);
    }

    Ok(resolved)
}

/// Normalizes `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n: Option<&str>, s: Option<&str>, cont: Option<&str>) -> RawTailParams {
        RawTailParams {
            n: n.map(str::to_string),
            s: s.map(str::to_string),
            cont: cont.map(str::to_string),
        }
    }

    #[test]
    fn should_default_to_global_max_results() {
        // given / when
        let request = validate_tail_params(raw(None, None, None)).unwrap();

        // then
        assert_eq!(
            request,
            TailRequest::Fresh(SearchOptions {
                max_results: GLOBAL_MAX_RESULTS,
                query: None,
                resume_from: None,
            })
        );
    }

    #[test]
    fn should_parse_n_and_s() {
        // given / when
        let request = validate_tail_params(raw(Some("3"), Some("status"), None)).unwrap();

        // then
        assert_eq!(
            request,
            TailRequest::Fresh(SearchOptions {
                max_results: 3,
                query: Some(Query::Text("status".to_string())),
                resume_from: None,
            })
        );
    }

    #[test]
    fn should_silently_clamp_oversized_n() {
        // given / when
        let request = validate_tail_params(raw(Some("1000"), None, None)).unwrap();

        // then
        assert!(matches!(
            request,
            TailRequest::Fresh(options) if options.max_results == GLOBAL_MAX_RESULTS
        ));
    }

    #[test]
    fn should_reject_non_numeric_n_with_message_naming_n() {
        // given / when
        let result = validate_tail_params(raw(Some("xyz"), None, None));

        // then
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains('n')));
    }

    #[test]
    fn should_reject_zero_and_negative_n() {
        assert!(validate_tail_params(raw(Some("0"), None, None)).is_err());
        assert!(validate_tail_params(raw(Some("-1"), None, None)).is_err());
    }

    #[test]
    fn should_reject_cont_combined_with_other_params() {
        // given / when
        let result = validate_tail_params(raw(None, Some("x"), Some("tok")));

        // then the message names the continuation token
        assert!(matches!(
            result,
            Err(Error::InvalidInput(msg)) if msg.contains("continuation")
        ));
    }

    #[test]
    fn should_accept_lone_cont() {
        // given / when
        let request = validate_tail_params(raw(None, None, Some("tok"))).unwrap();

        // then
        assert_eq!(request, TailRequest::Continuation("tok".to_string()));
    }

    #[test]
    fn should_reject_oversized_cont() {
        // given
        let oversized = "t".repeat(MAX_CONTINUATION_TOKEN_LENGTH + 1);

        // when
        let result = validate_tail_params(raw(None, None, Some(&oversized)));

        // then
        assert!(matches!(
            result,
            Err(Error::InvalidInput(msg)) if msg.contains("token")
        ));
    }

    #[test]
    fn should_reject_oversized_search_text() {
        // given
        let oversized = "s".repeat(MAX_SEARCH_TEXT_LENGTH + 1);

        // when
        let result = validate_tail_params(raw(None, Some(&oversized), None));

        // then
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn should_reject_oversized_path() {
        // given
        let oversized = "p".repeat(MAX_PATH_LENGTH + 1);

        // when / then
        assert!(ensure_path_length(&oversized).is_err());
        assert!(ensure_path_length("fodder/simple.log").is_ok());
    }

    #[test]
    fn should_resolve_plain_paths_under_the_root() {
        // given
        let root = Path::new("/srv/logs");

        // when
        let resolved = resolve_path(root, "fodder/simple.log").unwrap();

        // then
        assert_eq!(resolved, Path::new("/srv/logs/fodder/simple.log"));
    }

    #[test]
    fn should_normalize_dot_segments_within_the_root() {
        // given
        let root = Path::new("/srv/logs");

        // when
        let resolved = resolve_path(root, "fodder/./a/../simple.log").unwrap();

        // then
        assert_eq!(resolved, Path::new("/srv/logs/fodder/simple.log"));
    }

    #[test]
    fn should_reject_traversal_escaping_the_root() {
        // given
        let root = Path::new("/srv/logs");

        // when
        let result = resolve_path(root, "../etc/passwd");

        // then
        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn should_reject_traversal_through_nested_segments() {
        // given
        let root = Path::new("/srv/logs");

        // when
        let result = resolve_path(root, "fodder/../../other/secret.log");

        // then
        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn should_reject_empty_path() {
        // given
        let root = Path::new("/srv/logs");

        // when / then
        assert_eq!(resolve_path(root, ""), Err(Error::NotFound));
    }
}

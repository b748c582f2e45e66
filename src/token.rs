//! Continuation token encoding and decoding.
//!
//! Tokens are opaque to clients but a stable wire contract: base64 of a
//! JSON payload. The local form is a three-element array
//! `[resumeFrom, maxResults, query]` where `query` is `null` or
//! `{"text": <string>}`. The aggregator form multiplexes one local token
//! per still-paginating peer as an array of `{"host", "cont"}` objects.
//!
//! Decoding is strict: wrong arity, wrong element types, or oversized
//! tokens are rejected before a scan is attempted.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_CONTINUATION_TOKEN_LENGTH, SearchOptions};
use crate::error::{Error, Result};
use crate::model::Query;

/// One peer's continuation inside an aggregator token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryToken {
    /// Peer identifier, as configured.
    pub host: String,

    /// The peer's own opaque continuation token.
    pub cont: String,
}

fn invalid_token() -> Error {
    Error::InvalidInput("malformed continuation token".to_string())
}

fn decode_payload(token: &str) -> Result<Vec<u8>> {
    if token.len() > MAX_CONTINUATION_TOKEN_LENGTH {
        return Err(Error::InvalidInput(format!(
            "continuation token must not exceed {} bytes",
            MAX_CONTINUATION_TOKEN_LENGTH
        )));
    }
    STANDARD.decode(token).map_err(|_| invalid_token())
}

/// Encodes the resumable state of a local scan.
///
/// `max_results` and `query` are carried along so every follow-up page is
/// homogeneous with the page that minted the token.
pub fn encode_local(resume_from: u64, max_results: usize, query: Option<&Query>) -> String {
    let payload = serde_json::json!([resume_from, max_results, query]);
    STANDARD.encode(payload.to_string())
}

/// Decodes a local continuation token into the options for the next page.
pub fn decode_local(token: &str) -> Result<SearchOptions> {
    let payload = decode_payload(token)?;
    let (resume_from, max_results, query): (u64, usize, Option<Query>) =
        serde_json::from_slice(&payload).map_err(|_| invalid_token())?;

    Ok(SearchOptions {
        max_results,
        query,
        resume_from: Some(resume_from),
    })
}

/// Encodes per-peer continuations into one multiplexed aggregator token.
pub fn encode_aggregator(tokens: &[SecondaryToken]) -> String {
    let payload = serde_json::to_string(tokens).expect("token serialization should not fail");
    STANDARD.encode(payload)
}

/// Decodes an aggregator token back into its per-peer continuations.
///
/// Every peer present in the result is still paginating; peers that
/// exhausted their log on an earlier page are absent.
pub fn decode_aggregator(token: &str) -> Result<Vec<SecondaryToken>> {
    let payload = decode_payload(token)?;
    serde_json::from_slice(&payload).map_err(|_| invalid_token())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_local_token() {
        // given
        let query = Query::Text("status".to_string());

        // when
        let token = encode_local(12345, 25, Some(&query));
        let options = decode_local(&token).unwrap();

        // then
        assert_eq!(options.resume_from, Some(12345));
        assert_eq!(options.max_results, 25);
        assert_eq!(options.query, Some(query));
    }

    #[test]
    fn should_round_trip_local_token_without_query() {
        // given / when
        let token = encode_local(7, 100, None);
        let options = decode_local(&token).unwrap();

        // then
        assert_eq!(options.resume_from, Some(7));
        assert_eq!(options.max_results, 100);
        assert_eq!(options.query, None);
    }

    #[test]
    fn should_reject_garbage_tokens() {
        // given / when / then
        assert!(matches!(
            decode_local("foo"),
            Err(Error::InvalidInput(msg)) if msg.contains("token")
        ));
    }

    #[test]
    fn should_reject_wrong_arity() {
        // given a two-element payload
        let token = STANDARD.encode("[1, 2]");

        // when / then
        assert!(decode_local(&token).is_err());

        // and a four-element payload
        let token = STANDARD.encode("[1, 2, null, 4]");
        assert!(decode_local(&token).is_err());
    }

    #[test]
    fn should_reject_non_integer_offset_or_count() {
        let token = STANDARD.encode(r#"["x", 2, null]"#);
        assert!(decode_local(&token).is_err());

        let token = STANDARD.encode(r#"[1, "y", null]"#);
        assert!(decode_local(&token).is_err());
    }

    #[test]
    fn should_reject_scalar_query_element() {
        let token = STANDARD.encode(r#"[1, 2, "status"]"#);
        assert!(decode_local(&token).is_err());
    }

    #[test]
    fn should_reject_oversized_token_before_decoding() {
        // given a token over the wire cap that would otherwise decode
        let oversized = STANDARD.encode(format!(
            r#"[1, 2, {{"text": "{}"}}]"#,
            "x".repeat(MAX_CONTINUATION_TOKEN_LENGTH)
        ));
        assert!(oversized.len() > MAX_CONTINUATION_TOKEN_LENGTH);

        // when / then
        assert!(matches!(
            decode_local(&oversized),
            Err(Error::InvalidInput(msg)) if msg.contains("token")
        ));
    }

    #[test]
    fn should_round_trip_aggregator_token() {
        // given
        let tokens = vec![
            SecondaryToken {
                host: "alpha:1065".to_string(),
                cont: encode_local(10, 3, None),
            },
            SecondaryToken {
                host: "bravo:1065".to_string(),
                cont: encode_local(20, 3, None),
            },
        ];

        // when
        let mux = encode_aggregator(&tokens);
        let decoded = decode_aggregator(&mux).unwrap();

        // then
        assert_eq!(decoded, tokens);
    }

    #[test]
    fn should_reject_aggregator_elements_missing_fields() {
        // given an element without a cont field
        let token = STANDARD.encode(r#"[{"host": "alpha:1065"}]"#);

        // when / then
        assert!(decode_aggregator(&token).is_err());

        // and a non-object element
        let token = STANDARD.encode(r#"["alpha:1065"]"#);
        assert!(decode_aggregator(&token).is_err());

        // and non-string field types
        let token = STANDARD.encode(r#"[{"host": 1, "cont": "x"}]"#);
        assert!(decode_aggregator(&token).is_err());
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn should_preserve_fields_across_round_trips(
                resume_from in 0u64..u64::MAX,
                max_results in 1usize..=100,
                text in prop::option::of("[a-z]{0,20}"),
            ) {
                // given
                let query = text.map(Query::Text);

                // when encoding, decoding, and re-encoding
                let token = encode_local(resume_from, max_results, query.as_ref());
                let decoded = decode_local(&token).unwrap();
                let again = encode_local(
                    decoded.resume_from.unwrap(),
                    decoded.max_results,
                    decoded.query.as_ref(),
                );

                // then nothing drifts
                prop_assert_eq!(decoded.max_results, max_results);
                prop_assert_eq!(decoded.query, query);
                prop_assert_eq!(token, again);
            }
        }
    }
}

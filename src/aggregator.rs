//! Peer fan-out and response merging.
//!
//! In aggregator mode a query is forwarded to every configured peer in
//! parallel under a shared wall-clock deadline. Peer outcomes are merged
//! in configured peer order: successful pages contribute host-tagged
//! entries, failures are swept into a `messages` list without failing the
//! aggregate, and peers that still have older lines contribute their own
//! continuation to a multiplexed token.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::{GLOBAL_TIMEOUT, SearchOptions};
use crate::error::Result;
use crate::model::Query;
use crate::token::{self, SecondaryToken};

/// One host-tagged log line in an aggregated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedEntry {
    pub host: String,
    pub entry: String,
}

/// A per-peer error note. The aggregate response stays 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMessage {
    pub host: String,
    pub message: String,
}

/// Output of one fan-out, serialized directly as the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatorResult {
    pub messages: Vec<HostMessage>,
    pub entries: Vec<HostedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cont: Option<String>,
}

/// The body shape peers respond with on success.
#[derive(Debug, Deserialize)]
struct PeerPage {
    entries: Vec<String>,
    #[serde(default)]
    cont: Option<String>,
}

/// The body shape peers respond with on failure.
#[derive(Debug, Deserialize)]
struct PeerError {
    error: String,
}

/// Outcome of a single peer query.
enum PeerOutcome {
    Page(PeerPage),
    Failed(String),
}

/// The query forwarded to one peer.
#[derive(Debug, Clone)]
enum PeerRequest {
    Fresh {
        max_results: usize,
        query: Option<Query>,
    },
    Continuation(String),
}

const UNKNOWN_ERROR: &str = "Unknown error occured.";

/// Fans queries out to a fixed, ordered set of peer LogServ instances.
///
/// The peer list is read-only after construction; each request owns its
/// in-flight peer calls and deadline.
pub struct Aggregator {
    hosts: Vec<String>,
    client: reqwest::Client,
}

impl Aggregator {
    /// Creates an aggregator for the given peer host list.
    ///
    /// Hosts are authorities (`host[:port]`); peer URLs are built with a
    /// fixed `http` scheme and the inbound request path.
    pub fn new(hosts: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GLOBAL_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { hosts, client }
    }

    /// Runs the first page of a search against every configured peer.
    pub async fn initial(&self, path: &str, options: &SearchOptions) -> AggregatorResult {
        let request = PeerRequest::Fresh {
            max_results: options.max_results,
            query: options.query.clone(),
        };
        let targets: Vec<(String, PeerRequest)> = self
            .hosts
            .iter()
            .map(|host| (host.clone(), request.clone()))
            .collect();

        self.fan_out(path, targets).await
    }

    /// Resumes a previously started aggregate search.
    ///
    /// Demuxes the token and queries only the peers it names; peers absent
    /// from the token exhausted their log on an earlier page. A malformed
    /// token is a validation error.
    pub async fn resume(&self, path: &str, mux_token: &str) -> Result<AggregatorResult> {
        let targets: Vec<(String, PeerRequest)> = token::decode_aggregator(mux_token)?
            .into_iter()
            .map(|t| (t.host, PeerRequest::Continuation(t.cont)))
            .collect();

        Ok(self.fan_out(path, targets).await)
    }

    async fn fan_out(&self, path: &str, targets: Vec<(String, PeerRequest)>) -> AggregatorResult {
        let deadline = Instant::now() + GLOBAL_TIMEOUT;

        let handles: Vec<(String, tokio::task::JoinHandle<PeerOutcome>)> = targets
            .into_iter()
            .map(|(host, request)| {
                let client = self.client.clone();
                let path = path.to_string();
                let peer = host.clone();
                let handle =
                    tokio::spawn(
                        async move { query_peer(client, peer, path, request, deadline).await },
                    );
                (host, handle)
            })
            .collect();

        // Await in configured order so the merge is stable; the tasks
        // themselves run concurrently.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (host, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!("Peer task for {} failed: {}", host, err);
                    PeerOutcome::Failed(UNKNOWN_ERROR.to_string())
                }
            };
            outcomes.push((host, outcome));
        }

        merge(outcomes)
    }
}

/// Issues one peer GET and classifies the outcome. Never returns an error;
/// every failure mode folds into [`PeerOutcome::Failed`].
async fn query_peer(
    client: reqwest::Client,
    host: String,
    path: String,
    request: PeerRequest,
    deadline: Instant,
) -> PeerOutcome {
    let url = format!("http://{}/{}", host, path);
    let builder = match &request {
        PeerRequest::Fresh { max_results, query } => {
            let builder = client.get(&url).query(&[("n", max_results.to_string())]);
            match query {
                Some(Query::Text(text)) => builder.query(&[("s", text)]),
                None => builder,
            }
        }
        PeerRequest::Continuation(cont) => client.get(&url).query(&[("cont", cont)]),
    };

    let response = match tokio::time::timeout_at(deadline, builder.send()).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => return PeerOutcome::Failed(err.to_string()),
        Err(_) => return PeerOutcome::Failed("deadline exceeded".to_string()),
    };

    let status = response.status();
    let body = match tokio::time::timeout_at(deadline, response.bytes()).await {
        Ok(Ok(body)) => body,
        Ok(Err(err)) => return PeerOutcome::Failed(err.to_string()),
        Err(_) => return PeerOutcome::Failed("deadline exceeded".to_string()),
    };

    if status.is_success() {
        match serde_json::from_slice::<PeerPage>(&body) {
            Ok(page) => PeerOutcome::Page(page),
            Err(_) => PeerOutcome::Failed(UNKNOWN_ERROR.to_string()),
        }
    } else {
        match serde_json::from_slice::<PeerError>(&body) {
            Ok(err) => PeerOutcome::Failed(err.error),
            Err(_) => PeerOutcome::Failed(UNKNOWN_ERROR.to_string()),
        }
    }
}

/// Merges per-peer outcomes in peer order.
///
/// Entry order within a peer is preserved (newest first); there is no
/// global time-merge across peers. A multiplexed token is minted iff at
/// least one peer returned its own continuation.
fn merge(outcomes: Vec<(String, PeerOutcome)>) -> AggregatorResult {
    let mut entries = Vec::new();
    let mut messages = Vec::new();
    let mut pending = Vec::new();

    for (host, outcome) in outcomes {
        match outcome {
            PeerOutcome::Page(page) => {
                entries.extend(page.entries.into_iter().map(|entry| HostedEntry {
                    host: host.clone(),
                    entry,
                }));
                if let Some(cont) = page.cont {
                    pending.push(SecondaryToken { host, cont });
                }
            }
            PeerOutcome::Failed(message) => {
                messages.push(HostMessage { host, message });
            }
        }
    }

    let cont = if pending.is_empty() {
        None
    } else {
        Some(token::encode_aggregator(&pending))
    };

    AggregatorResult {
        messages,
        entries,
        cont,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(entries: &[&str], cont: Option<&str>) -> PeerOutcome {
        PeerOutcome::Page(PeerPage {
            entries: entries.iter().map(|e| e.to_string()).collect(),
            cont: cont.map(|c| c.to_string()),
        })
    }

    #[test]
    fn should_concatenate_entries_in_peer_order() {
        // given
        let outcomes = vec![
            ("alpha:1065".to_string(), page(&["a2", "a1"], None)),
            ("bravo:1065".to_string(), page(&["b1"], None)),
        ];

        // when
        let result = merge(outcomes);

        // then
        assert_eq!(
            result.entries,
            vec![
                HostedEntry {
                    host: "alpha:1065".to_string(),
                    entry: "a2".to_string()
                },
                HostedEntry {
                    host: "alpha:1065".to_string(),
                    entry: "a1".to_string()
                },
                HostedEntry {
                    host: "bravo:1065".to_string(),
                    entry: "b1".to_string()
                },
            ]
        );
        assert!(result.messages.is_empty());
        assert!(result.cont.is_none());
    }

    #[test]
    fn should_sweep_failures_into_messages_without_failing() {
        // given
        let outcomes = vec![
            ("alpha:1065".to_string(), page(&["a1"], None)),
            (
                "bravo:1065".to_string(),
                PeerOutcome::Failed("deadline exceeded".to_string()),
            ),
        ];

        // when
        let result = merge(outcomes);

        // then
        assert_eq!(result.entries.len(), 1);
        assert_eq!(
            result.messages,
            vec![HostMessage {
                host: "bravo:1065".to_string(),
                message: "deadline exceeded".to_string()
            }]
        );
    }

    #[test]
    fn should_mint_mux_token_only_for_paginating_peers() {
        // given alpha still paginates, bravo is exhausted
        let outcomes = vec![
            ("alpha:1065".to_string(), page(&["a1"], Some("tok-a"))),
            ("bravo:1065".to_string(), page(&["b1"], None)),
        ];

        // when
        let result = merge(outcomes);

        // then the mux token names alpha only
        let tokens = token::decode_aggregator(result.cont.as_deref().unwrap()).unwrap();
        assert_eq!(
            tokens,
            vec![SecondaryToken {
                host: "alpha:1065".to_string(),
                cont: "tok-a".to_string()
            }]
        );
    }

    #[test]
    fn should_omit_token_when_every_peer_is_exhausted() {
        // given
        let outcomes = vec![
            ("alpha:1065".to_string(), page(&["a1"], None)),
            ("bravo:1065".to_string(), page(&[], None)),
        ];

        // when
        let result = merge(outcomes);

        // then
        assert!(result.cont.is_none());
    }

    #[test]
    fn should_serialize_result_with_messages_before_entries() {
        // given
        let result = AggregatorResult {
            messages: vec![],
            entries: vec![],
            cont: None,
        };

        // when
        let json = serde_json::to_string(&result).unwrap();

        // then the cont field is omitted entirely
        assert_eq!(json, r#"{"messages":[],"entries":[]}"#);
    }
}

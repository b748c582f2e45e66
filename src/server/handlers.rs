//! HTTP route handlers for the LogServ server.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::metrics::Metrics;
use super::request::{
    RawTailParams, TailRequest, ensure_path_length, resolve_path, validate_tail_params,
};
use super::response::{TailResponse, json_response};
use crate::aggregator::Aggregator;
use crate::engine;
use crate::error::Error;
use crate::token;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub mode: Mode,
    pub metrics: Arc<Metrics>,
}

/// The serving mode, fixed at startup.
#[derive(Clone)]
pub enum Mode {
    /// Serve files below the given root directly.
    Local { root: PathBuf },

    /// Fan queries out to configured peers.
    Aggregator(Arc<Aggregator>),
}

/// Handle `GET /<path>?n=&s=&cont=`.
///
/// Routed for every method; anything but GET is answered with the same
/// terse 404 a missing file gets.
pub async fn handle_tail(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(params): Query<RawTailParams>,
) -> Result<Response, ApiError> {
    if method != Method::GET {
        return Err(ApiError(Error::NotFound));
    }
    ensure_path_length(&path)?;

    let request = validate_tail_params(params)?;

    match &state.mode {
        Mode::Local { root } => {
            let options = match &request {
                TailRequest::Continuation(tok) => token::decode_local(tok)?,
                TailRequest::Fresh(options) => options.clone(),
            };
            let options = options.validate_and_normalize()?;

            let file = resolve_path(root, &path)?;
            let result = engine::search(&file, &options).await?;

            state
                .metrics
                .tail_entries_returned_total
                .inc_by(result.entries.len() as u64);

            // The token carries the current limit and query so follow-up
            // pages stay homogeneous with this one.
            let cont = result.resume_from.map(|offset| {
                token::encode_local(offset, options.max_results, options.query.as_ref())
            });

            Ok(json_response(
                StatusCode::OK,
                &TailResponse {
                    entries: result.entries,
                    cont,
                },
            ))
        }
        Mode::Aggregator(aggregator) => {
            let result = match &request {
                TailRequest::Fresh(options) => {
                    let options = options.clone().validate_and_normalize()?;
                    aggregator.initial(&path, &options).await
                }
                TailRequest::Continuation(tok) => aggregator.resume(&path, tok).await?,
            };

            state
                .metrics
                .tail_entries_returned_total
                .inc_by(result.entries.len() as u64);
            state
                .metrics
                .peer_failures_total
                .inc_by(result.messages.len() as u64);

            Ok(json_response(StatusCode::OK, &result))
        }
    }
}

/// Handle `/metrics` - returns Prometheus text format.
pub async fn handle_metrics(State(state): State<AppState>) -> String {
    state.metrics.encode()
}

/// Fallback for everything no route matches, notably the empty path.
pub async fn handle_fallback() -> Response {
    ApiError(Error::NotFound).into_response()
}

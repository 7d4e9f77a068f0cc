//! `/probe` handler.
//!
//! Validates the query, runs one probe cycle and answers with the
//! request-scoped gauges. Malformed parameters are the only `400`; a failed
//! measurement is still a `200` carrying `monitoring_success 0`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use streamstats_core::{ProbeError, ProbeRequest};

use crate::app_state::AppState;
use crate::obs::snapshot::{MetricsSnapshot, RequestRegistry};
use crate::obs::EXPOSITION_CONTENT_TYPE;

#[derive(Debug, Default, Deserialize)]
pub struct ProbeQuery {
    pub target: Option<String>,
    pub period: Option<String>,
    #[serde(rename = "streamingTime")]
    pub streaming_time: Option<String>,
}

pub async fn probe(
    State(app): State<AppState>,
    query: Result<Query<ProbeQuery>, QueryRejection>,
) -> Response {
    let parsed = query
        .map_err(|e| ProbeError::InvalidParameter(format!("malformed query: {e}")))
        .and_then(|Query(q)| {
            ProbeRequest::from_query(
                q.target.as_deref(),
                q.period.as_deref(),
                q.streaming_time.as_deref(),
            )
        });
    let req = match parsed {
        Ok(req) => req,
        Err(e) => return reject(&app, e),
    };

    let result = app.orchestrator().run(&req).await;

    let mut registry = RequestRegistry::new();
    registry.register(Box::new(MetricsSnapshot::new(result)));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        registry.gather(),
    )
        .into_response()
}

fn reject(app: &AppState, err: ProbeError) -> Response {
    app.metrics().record_error(err.kind());
    warn!(kind = err.kind().as_str(), error = %err, "probe request rejected");
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("{err}\n"),
    )
        .into_response()
}

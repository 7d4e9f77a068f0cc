//! Operational HTTP endpoints.
//!
//! - `/`        : static index page
//! - `/healthz` : liveness
//! - telemetry path : self metrics, Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::obs::EXPOSITION_CONTENT_TYPE;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<html>
    <head><title>Stream Stats Exporter</title></head>
    <body>
    <h1>Stream Stats Exporter</h1>
    <p><a href="{}">Metrics</a></p>
    <p><a href="/probe">Probe</a></p>
    </body>
</html>
"#,
        state.cfg().web.telemetry_path
    ))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

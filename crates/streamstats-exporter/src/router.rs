//! Axum router wiring.
//!
//! `/` index page, `/probe` probe cycles, `/healthz` liveness and the
//! configurable telemetry path for self metrics.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let telemetry_path = state.cfg().web.telemetry_path.clone();
    Router::new()
        .route("/", get(ops::index))
        .route("/healthz", get(ops::healthz))
        .route("/probe", get(transport::probe::probe))
        .route(&telemetry_path, get(ops::metrics))
        .with_state(state)
}

use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use utn_recruitment::recruitment::{
    application_router, member_router, unicore_router, ApplicationRepository, ApplicationService,
    MemberRepository, MembershipService, PositionCatalog,
};
use utn_recruitment::unicore::MembershipGateway;

/// Registry, member and application endpoints plus the health endpoints.
pub(crate) fn with_recruitment_routes<A, M, C, G>(
    membership: Arc<MembershipService<M, G>>,
    applications: Arc<ApplicationService<A, M, C, G>>,
) -> Router
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    unicore_router(Arc::clone(membership.gateway()))
        .merge(member_router(membership))
        .merge(application_router(applications))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

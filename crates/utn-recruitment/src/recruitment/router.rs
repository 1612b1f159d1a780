use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::applications::{ApplicationService, ApplicationServiceError};
use super::domain::{ApplicationId, ApplicationStatus, ApplicationSubmission, MemberId, PositionId};
use super::membership::{MemberRegistration, MembershipService, MembershipServiceError};
use super::repository::{
    ApplicationRepository, MemberRepository, PositionCatalog, RepositoryError,
};
use crate::unicore::{Lookup, MembershipGateway, MembershipVerdict, UnicoreError};

/// Read-through endpoints for the membership registry.
pub fn unicore_router<G>(gateway: Arc<G>) -> Router
where
    G: MembershipGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/unicore/identity/:identity_number",
            get(identity_handler::<G>),
        )
        .route(
            "/api/v1/unicore/membership/:identity_number",
            get(membership_handler::<G>),
        )
        .with_state(gateway)
}

pub fn member_router<M, G>(service: Arc<MembershipService<M, G>>) -> Router
where
    M: MemberRepository + 'static,
    G: MembershipGateway + 'static,
{
    Router::new()
        .route("/api/v1/members", post(register_handler::<M, G>))
        .route("/api/v1/members/:member_id", get(member_handler::<M, G>))
        .route(
            "/api/v1/members/:member_id/refresh",
            post(refresh_handler::<M, G>),
        )
        .route("/api/v1/unicore/verify", post(verify_handler::<M, G>))
        .with_state(service)
}

pub fn application_router<A, M, C, G>(service: Arc<ApplicationService<A, M, C, G>>) -> Router
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<A, M, C, G>))
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<A, M, C, G>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(transition_handler::<A, M, C, G>),
        )
        .route(
            "/api/v1/positions/:position_id/applications",
            get(position_applications_handler::<A, M, C, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct RegisterMemberRequest {
    pub identity_number: String,
    #[serde(flatten)]
    pub registration: MemberRegistration,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub identity_numbers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct VerdictView {
    pub identity_number: String,
    pub member: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retryable: bool,
}

impl From<MembershipVerdict> for VerdictView {
    fn from(verdict: MembershipVerdict) -> Self {
        let member = verdict.is_member();
        let (error, retryable) = match &verdict.outcome {
            Err(err) => (Some(err.to_string()), err.is_retryable()),
            Ok(_) => (None, false),
        };
        Self {
            identity_number: verdict.identity_number,
            member,
            error,
            retryable,
        }
    }
}

pub(crate) async fn identity_handler<G>(
    State(gateway): State<Arc<G>>,
    Path(identity_number): Path<String>,
) -> Response
where
    G: MembershipGateway + 'static,
{
    match gateway.lookup_identity(&identity_number).await {
        Ok(Lookup::Found(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(Lookup::NotFound) => error_response(
            StatusCode::NOT_FOUND,
            "no person with that identity number in the membership registry".to_string(),
        ),
        Err(err) => registry_error_response(&err),
    }
}

pub(crate) async fn membership_handler<G>(
    State(gateway): State<Arc<G>>,
    Path(identity_number): Path<String>,
) -> Response
where
    G: MembershipGateway + 'static,
{
    match gateway.check_membership(&identity_number).await {
        Ok(lookup) => {
            let found = lookup.is_found();
            let member = lookup.found().unwrap_or(false);
            let payload = json!({
                "identity_number": identity_number,
                "member": member,
                "found": found,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => registry_error_response(&err),
    }
}

pub(crate) async fn register_handler<M, G>(
    State(service): State<Arc<MembershipService<M, G>>>,
    Json(request): Json<RegisterMemberRequest>,
) -> Result<Response, MembershipServiceError>
where
    M: MemberRepository + 'static,
    G: MembershipGateway + 'static,
{
    let member = service
        .register(&request.identity_number, request.registration)
        .await?;
    Ok((StatusCode::CREATED, Json(member.view())).into_response())
}

pub(crate) async fn member_handler<M, G>(
    State(service): State<Arc<MembershipService<M, G>>>,
    Path(member_id): Path<u64>,
) -> Result<Response, MembershipServiceError>
where
    M: MemberRepository + 'static,
    G: MembershipGateway + 'static,
{
    let member = service.get(MemberId(member_id))?;
    Ok((StatusCode::OK, Json(member.view())).into_response())
}

pub(crate) async fn refresh_handler<M, G>(
    State(service): State<Arc<MembershipService<M, G>>>,
    Path(member_id): Path<u64>,
) -> Result<Response, MembershipServiceError>
where
    M: MemberRepository + 'static,
    G: MembershipGateway + 'static,
{
    let member = service.refresh_status(MemberId(member_id)).await?;
    Ok((StatusCode::OK, Json(member.view())).into_response())
}

pub(crate) async fn verify_handler<M, G>(
    State(service): State<Arc<MembershipService<M, G>>>,
    Json(request): Json<VerifyRequest>,
) -> Response
where
    M: MemberRepository + 'static,
    G: MembershipGateway + 'static,
{
    let verdicts: Vec<VerdictView> = service
        .verify_many(request.identity_numbers)
        .await
        .into_iter()
        .map(VerdictView::from)
        .collect();
    (StatusCode::OK, Json(verdicts)).into_response()
}

pub(crate) async fn submit_handler<A, M, C, G>(
    State(service): State<Arc<ApplicationService<A, M, C, G>>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Result<Response, ApplicationServiceError>
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    let today = Local::now().date_naive();
    let application = service.submit(submission, today).await?;
    Ok((StatusCode::ACCEPTED, Json(application.view())).into_response())
}

pub(crate) async fn application_handler<A, M, C, G>(
    State(service): State<Arc<ApplicationService<A, M, C, G>>>,
    Path(application_id): Path<u64>,
) -> Result<Response, ApplicationServiceError>
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    let application = service.get(ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(application.view())).into_response())
}

pub(crate) async fn transition_handler<A, M, C, G>(
    State(service): State<Arc<ApplicationService<A, M, C, G>>>,
    Path(application_id): Path<u64>,
    Json(request): Json<TransitionRequest>,
) -> Result<Response, ApplicationServiceError>
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    let today = Local::now().date_naive();
    let application = service
        .transition(ApplicationId(application_id), request.status, today)
        .await?;
    Ok((StatusCode::OK, Json(application.view())).into_response())
}

pub(crate) async fn position_applications_handler<A, M, C, G>(
    State(service): State<Arc<ApplicationService<A, M, C, G>>>,
    Path(position_id): Path<u64>,
) -> Result<Response, ApplicationServiceError>
where
    A: ApplicationRepository + 'static,
    M: MemberRepository + 'static,
    C: PositionCatalog + 'static,
    G: MembershipGateway + 'static,
{
    let views: Vec<_> = service
        .list_for_position(PositionId(position_id))?
        .iter()
        .map(|application| application.view())
        .collect();
    Ok((StatusCode::OK, Json(views)).into_response())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Transient registry failures map to 503 so callers know to retry; anything
/// else the registry did wrong is a 502.
pub(crate) fn registry_error_response(err: &UnicoreError) -> Response {
    let status = if err.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    };
    let payload = json!({
        "error": err.to_string(),
        "retryable": err.is_retryable(),
    });
    (status, Json(payload)).into_response()
}

fn repository_error_response(err: &RepositoryError) -> Response {
    let status = match err {
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

impl IntoResponse for MembershipServiceError {
    fn into_response(self) -> Response {
        match &self {
            MembershipServiceError::UnknownIdentity | MembershipServiceError::MemberNotFound(_) => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            MembershipServiceError::Validation(_) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            MembershipServiceError::Repository(err) => repository_error_response(err),
            MembershipServiceError::Registry(err) => registry_error_response(err),
        }
    }
}

impl IntoResponse for ApplicationServiceError {
    fn into_response(self) -> Response {
        match &self {
            ApplicationServiceError::ApplicationNotFound(_)
            | ApplicationServiceError::MemberNotFound(_)
            | ApplicationServiceError::PositionNotFound(_) => {
                error_response(StatusCode::NOT_FOUND, self.to_string())
            }
            ApplicationServiceError::NotAMember(_)
            | ApplicationServiceError::RoleArchived
            | ApplicationServiceError::RecruitmentClosed { .. }
            | ApplicationServiceError::Validation(_) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ApplicationServiceError::InvalidTransition { .. } => {
                error_response(StatusCode::CONFLICT, self.to_string())
            }
            ApplicationServiceError::Repository(err) => repository_error_response(err),
            ApplicationServiceError::Registry(err) => registry_error_response(err),
        }
    }
}

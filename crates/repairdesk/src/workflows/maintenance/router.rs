use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::dispatch::DispatchOutcome;
use super::domain::{
    Actor, IssueId, IssueReport, ReporterId, TechnicianId, TechnicianRegistration, TriageError,
};
use super::engine::TriageEngine;
use super::report::export_csv_string;

pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// Router builder exposing the triage engine over HTTP.
pub fn maintenance_router(engine: TriageEngine) -> Router {
    Router::new()
        .route(
            "/api/v1/issues",
            post(submit_handler).get(list_issues_handler),
        )
        .route("/api/v1/issues/:issue_id", get(issue_handler))
        .route("/api/v1/issues/:issue_id/start", post(start_handler))
        .route("/api/v1/issues/:issue_id/complete", post(complete_handler))
        .route("/api/v1/issues/:issue_id/reassign", post(reassign_handler))
        .route("/api/v1/issues/:issue_id/dispatch", post(dispatch_handler))
        .route("/api/v1/dispatch/sweep", post(sweep_handler))
        .route(
            "/api/v1/technicians",
            get(technicians_handler).post(register_handler),
        )
        .route(
            "/api/v1/technicians/:technician_id/availability",
            put(availability_handler),
        )
        .route("/api/v1/reports/summary", get(summary_handler))
        .route("/api/v1/reports/density", get(density_handler))
        .route("/api/v1/reports/export.csv", get(export_handler))
        .with_state(engine)
}

/// Caller identity read from the `x-actor-*` headers. Identity is trusted as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)
            .map(RequestActor)
            .map_err(|message| {
                let payload = json!({ "error": message });
                (StatusCode::BAD_REQUEST, Json(payload)).into_response()
            })
    }
}

fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let role = header_value(ACTOR_ROLE_HEADER)
        .ok_or_else(|| format!("missing {ACTOR_ROLE_HEADER} header"))?;
    let require_id =
        || header_value(ACTOR_ID_HEADER).ok_or_else(|| format!("missing {ACTOR_ID_HEADER} header"));

    match role.to_ascii_lowercase().as_str() {
        "resident" => {
            let id = require_id()?;
            let name = header_value(ACTOR_NAME_HEADER).unwrap_or_else(|| id.clone());
            Ok(Actor::Resident {
                id: ReporterId(id),
                name,
            })
        }
        "technician" => Ok(Actor::Technician {
            id: TechnicianId(require_id()?),
        }),
        "admin" | "administrator" => Ok(Actor::Administrator),
        other => Err(format!("unknown actor role '{other}'")),
    }
}

pub(crate) fn triage_error_status(error: &TriageError) -> StatusCode {
    match error {
        TriageError::NotFound(_) => StatusCode::NOT_FOUND,
        TriageError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TriageError::SkillMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TriageError::Unauthorized { .. } => StatusCode::FORBIDDEN,
    }
}

fn error_response(error: TriageError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (triage_error_status(&error), Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, TriageError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReassignRequest {
    pub technician_id: TechnicianId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub issue_id: IssueId,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

pub(crate) async fn submit_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Json(report): Json<IssueReport>,
) -> Response {
    respond(StatusCode::ACCEPTED, engine.submit_report(&actor, report))
}

pub(crate) async fn list_issues_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
) -> Response {
    (StatusCode::OK, Json(engine.issues_for(&actor))).into_response()
}

pub(crate) async fn issue_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Path(issue_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, engine.issue(&actor, &IssueId(issue_id)))
}

pub(crate) async fn start_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Path(issue_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, engine.start_work(&actor, &IssueId(issue_id)))
}

pub(crate) async fn complete_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Path(issue_id): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        engine.mark_complete(&actor, &IssueId(issue_id)),
    )
}

pub(crate) async fn reassign_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Path(issue_id): Path<String>,
    Json(request): Json<ReassignRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        engine.reassign(&actor, &IssueId(issue_id), &request.technician_id),
    )
}

pub(crate) async fn dispatch_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Path(issue_id): Path<String>,
) -> Response {
    respond(StatusCode::OK, engine.dispatch(&actor, &IssueId(issue_id)))
}

pub(crate) async fn sweep_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
) -> Response {
    let result = engine.dispatch_open_issues(&actor).map(|outcomes| {
        outcomes
            .into_iter()
            .map(|(issue_id, outcome)| SweepEntry { issue_id, outcome })
            .collect::<Vec<_>>()
    });
    respond(StatusCode::OK, result)
}

pub(crate) async fn technicians_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
) -> Response {
    respond(StatusCode::OK, engine.technicians_for(&actor))
}

pub(crate) async fn register_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Json(registration): Json<TechnicianRegistration>,
) -> Response {
    respond(
        StatusCode::CREATED,
        engine.register_technician(&actor, registration),
    )
}

pub(crate) async fn availability_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
    Path(technician_id): Path<String>,
    Json(request): Json<AvailabilityRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        engine.set_availability(&actor, &TechnicianId(technician_id), request.available),
    )
}

pub(crate) async fn summary_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
) -> Response {
    respond(StatusCode::OK, engine.summary(&actor))
}

pub(crate) async fn density_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
) -> Response {
    respond(StatusCode::OK, engine.density_grid(&actor))
}

pub(crate) async fn export_handler(
    State(engine): State<TriageEngine>,
    RequestActor(actor): RequestActor,
) -> Response {
    let issues = match engine.export_snapshot(&actor) {
        Ok(issues) => issues,
        Err(error) => return error_response(error),
    };

    match export_csv_string(&issues) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"issues-report.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

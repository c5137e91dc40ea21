use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use breathe_core::{
    compute_etag, format_http_date, latest_updated_at, parse_http_date, parse_rfc3339,
    validate_snapshot, Clock, CompleteCommandPayload, DashboardMeta, NudgeFollowUpPayload,
    SnoozeAwaitingReplyPayload, WorkspaceMutationError, WorkspaceMutationService,
    WorkspaceSnapshot,
};

use crate::auth::{guard_workspace_access, SessionResolver};
use crate::store::DashboardStore;

const CACHE_CONTROL_VALUE: &str = "private, max-age=0, must-revalidate";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: DashboardStore,
    sessions: Arc<dyn SessionResolver>,
    mutations: Mutex<HashMap<String, WorkspaceMutationService>>,
}

impl AppState {
    /// Builds one mutation service per stored workspace, seeded from that
    /// workspace's snapshot.
    pub fn new(
        store: DashboardStore,
        sessions: Arc<dyn SessionResolver>,
        clock: Clock,
    ) -> anyhow::Result<Self> {
        let mut mutations = HashMap::new();
        for (workspace_id, dashboard) in store.iter() {
            let service = WorkspaceMutationService::new(
                workspace_id.clone(),
                dashboard.data.clone(),
                clock.clone(),
            )
            .with_context(|| format!("invalid snapshot for workspace {workspace_id}"))?;
            mutations.insert(workspace_id.clone(), service);
        }
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                sessions,
                mutations: Mutex::new(mutations),
            }),
        })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sign-in required to access this resource.")]
    Unauthenticated,
    #[error("You do not have access to this workspace.")]
    WorkspaceForbidden { workspace_id: String },
    #[error("Workspace missing or inaccessible.")]
    WorkspaceNotFound,
    #[error("One or more refresh timestamps are invalid ISO strings.")]
    InvalidQuery { invalid: Vec<String> },
    #[error("Precondition failed for the provided validators.")]
    PreconditionFailed { details: serde_json::Value },
    #[error(transparent)]
    Mutation(#[from] WorkspaceMutationError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: serde_json::Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, details) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", serde_json::Value::Null)
            }
            ApiError::WorkspaceForbidden { workspace_id } => (
                StatusCode::FORBIDDEN,
                "workspace_forbidden",
                json!({ "workspaceId": workspace_id }),
            ),
            ApiError::WorkspaceNotFound => {
                (StatusCode::NOT_FOUND, "workspace_not_found", serde_json::Value::Null)
            }
            ApiError::InvalidQuery { invalid } => (
                StatusCode::BAD_REQUEST,
                "invalid_query",
                json!({ "invalid": invalid }),
            ),
            ApiError::PreconditionFailed { details } => {
                (StatusCode::PRECONDITION_FAILED, "precondition_failed", details)
            }
            ApiError::Mutation(err) => {
                let (status, code) = match err {
                    WorkspaceMutationError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                    WorkspaceMutationError::Conflict => (StatusCode::CONFLICT, "conflict"),
                    WorkspaceMutationError::Validation => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed")
                    }
                };
                (status, code, serde_json::Value::Null)
            }
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", serde_json::Value::Null)
            }
        };
        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardBody<'a> {
    data: &'a WorkspaceSnapshot,
    meta: &'a DashboardMeta,
}

struct RefreshEvaluation {
    invalid: Vec<String>,
    requested: usize,
    has_changes: bool,
}

/// Compares each supplied `<slice>_updated_after` value against the server's
/// slice timestamp. Invalid values are collected rather than failing fast so
/// the error can report the union of bad parameter names.
fn evaluate_refresh(params: &HashMap<String, String>, meta: &DashboardMeta) -> RefreshEvaluation {
    let mut evaluation = RefreshEvaluation {
        invalid: Vec::new(),
        requested: 0,
        has_changes: false,
    };

    for (slice_key, updated_at) in meta.slices() {
        let param = format!("{slice_key}_updated_after");
        let Some(value) = params.get(&param) else {
            continue;
        };
        evaluation.requested += 1;
        let Some(client_ts) = parse_rfc3339(value) else {
            evaluation.invalid.push(param);
            continue;
        };
        if let Some(server_ts) = parse_rfc3339(updated_at) {
            // Equal timestamps count as unchanged; strictly newer means changed.
            if server_ts > client_ts {
                evaluation.has_changes = true;
            }
        }
    }

    evaluation
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// `If-None-Match` may carry a comma-separated list; weak validators
/// compare equal to the strong form.
fn none_match_contains(header_value: &str, etag: &str) -> bool {
    header_value
        .split(',')
        .map(str::trim)
        .map(|candidate| candidate.strip_prefix("W/").unwrap_or(candidate))
        .any(|candidate| candidate == etag)
}

fn validator_headers(etag: &str, last_modified: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_VALUE),
    );
    headers.insert(
        header::ETAG,
        HeaderValue::from_str(etag).map_err(ApiError::internal)?,
    );
    headers.insert(
        header::LAST_MODIFIED,
        HeaderValue::from_str(last_modified).map_err(ApiError::internal)?,
    );
    Ok(headers)
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    guard_workspace_access(state.inner.sessions.as_ref(), &headers, &workspace_id)?;

    let dashboard = state
        .inner
        .store
        .load(&workspace_id)
        .ok_or(ApiError::WorkspaceNotFound)?;

    // Defensive: a snapshot that fails structural validation is a
    // programming error, not a client mistake.
    validate_snapshot(&dashboard.data).map_err(ApiError::internal)?;

    let refresh = evaluate_refresh(&params, &dashboard.meta);
    if !refresh.invalid.is_empty() {
        return Err(ApiError::InvalidQuery {
            invalid: refresh.invalid,
        });
    }

    let etag = compute_etag(&dashboard.meta);
    let last_modified = latest_updated_at(&dashboard.meta)
        .ok_or_else(|| ApiError::Internal("no parsable slice timestamps".to_string()))?;
    let last_modified_header = format_http_date(last_modified);
    let base_headers = validator_headers(&etag, &last_modified_header)?;

    if let Some(if_match) = header_str(&headers, header::IF_MATCH) {
        if if_match != etag {
            return Err(ApiError::PreconditionFailed {
                details: json!({ "expectedEtag": etag }),
            });
        }
    }

    if let Some(if_unmodified_since) = header_str(&headers, header::IF_UNMODIFIED_SINCE) {
        if let Some(parsed) = parse_http_date(if_unmodified_since) {
            if parsed < last_modified {
                return Err(ApiError::PreconditionFailed {
                    details: json!({ "expectedLastModified": last_modified_header }),
                });
            }
        }
    }

    if let Some(if_none_match) = header_str(&headers, header::IF_NONE_MATCH) {
        if none_match_contains(if_none_match, &etag) {
            return Ok((StatusCode::NOT_MODIFIED, base_headers).into_response());
        }
    }

    if let Some(if_modified_since) = header_str(&headers, header::IF_MODIFIED_SINCE) {
        if let Some(parsed) = parse_http_date(if_modified_since) {
            if parsed >= last_modified {
                return Ok((StatusCode::NOT_MODIFIED, base_headers).into_response());
            }
        }
    }

    if refresh.requested > 0 && !refresh.has_changes {
        return Ok((StatusCode::NOT_MODIFIED, base_headers).into_response());
    }

    let body = DashboardBody {
        data: &dashboard.data,
        meta: &dashboard.meta,
    };
    Ok((StatusCode::OK, base_headers, Json(body)).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationEnvelope<P> {
    pub payload: P,
    pub idempotency_key: String,
}

pub async fn complete_command(
    State(state): State<AppState>,
    Path((workspace_id, command_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<MutationEnvelope<CompleteCommandPayload>>,
) -> Result<Response, ApiError> {
    guard_workspace_access(state.inner.sessions.as_ref(), &headers, &workspace_id)?;

    let mut services = state.inner.mutations.lock().unwrap();
    let service = services
        .get_mut(&workspace_id)
        .ok_or(ApiError::WorkspaceNotFound)?;
    let result =
        service.complete_command(&workspace_id, &command_id, &req.payload, &req.idempotency_key)?;
    info!(%workspace_id, %command_id, "command resolved");
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub async fn nudge_follow_up(
    State(state): State<AppState>,
    Path((workspace_id, thread_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<MutationEnvelope<NudgeFollowUpPayload>>,
) -> Result<Response, ApiError> {
    guard_workspace_access(state.inner.sessions.as_ref(), &headers, &workspace_id)?;

    let mut services = state.inner.mutations.lock().unwrap();
    let service = services
        .get_mut(&workspace_id)
        .ok_or(ApiError::WorkspaceNotFound)?;
    let result =
        service.nudge_follow_up(&workspace_id, &thread_id, &req.payload, &req.idempotency_key)?;
    info!(%workspace_id, %thread_id, "follow-up nudged");
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub async fn snooze_awaiting_reply(
    State(state): State<AppState>,
    Path((workspace_id, awaiting_reply_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<MutationEnvelope<SnoozeAwaitingReplyPayload>>,
) -> Result<Response, ApiError> {
    guard_workspace_access(state.inner.sessions.as_ref(), &headers, &workspace_id)?;

    let mut services = state.inner.mutations.lock().unwrap();
    let service = services
        .get_mut(&workspace_id)
        .ok_or(ApiError::WorkspaceNotFound)?;
    let result = service.snooze_awaiting_reply(
        &workspace_id,
        &awaiting_reply_id,
        &req.payload,
        &req.idempotency_key,
    )?;
    info!(%workspace_id, %awaiting_reply_id, "awaiting reply snoozed");
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/workspaces/{workspace_id}/dashboard",
            get(get_dashboard),
        )
        .route(
            "/api/v1/workspaces/{workspace_id}/commands/{command_id}/complete",
            post(complete_command),
        )
        .route(
            "/api/v1/workspaces/{workspace_id}/follow-ups/{thread_id}/nudge",
            post(nudge_follow_up),
        )
        .route(
            "/api/v1/workspaces/{workspace_id}/awaiting-replies/{awaiting_reply_id}/snooze",
            post(snooze_awaiting_reply),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

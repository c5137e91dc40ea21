use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use breathe_core::{fixture_meta, parse_rfc3339, workspace_fixture, Clock, Session};
use breathe_daemon::api::{router, AppState};
use breathe_daemon::auth::{PlaceholderResolver, SessionResolver};
use breathe_daemon::store::DashboardStore;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tower::ServiceExt;

const DASHBOARD_URI: &str = "/api/v1/workspaces/demo/dashboard";
const NOW_ISO: &str = "2025-02-01T00:00:00Z";
const KEY_A: &str = "1f1f0a9c-8a1f-4e66-9b57-7d5f596b2f5a";
const KEY_B: &str = "645fdf72-8180-4c08-80ef-8ae372f5fce7";

fn fixed_clock() -> Clock {
    let now = parse_rfc3339(NOW_ISO).unwrap();
    Arc::new(move || now)
}

fn demo_app() -> Router {
    let state = AppState::new(
        DashboardStore::demo("demo"),
        Arc::new(PlaceholderResolver::new("demo")),
        fixed_clock(),
    )
    .unwrap();
    router(state)
}

fn app_with_resolver(resolver: Arc<dyn SessionResolver>) -> Router {
    let state = AppState::new(DashboardStore::demo("demo"), resolver, fixed_clock()).unwrap();
    router(state)
}

/// Independent rendition of the validator algorithm: SHA-256 over the
/// sorted `key:updatedAt` pairs joined with `|`, hex-encoded, quoted.
fn expected_etag() -> String {
    let meta = fixture_meta();
    let mut pairs = vec![
        ("calendar", meta.calendar.updated_at.clone()),
        ("commands", meta.commands.updated_at.clone()),
        ("insights", meta.insights.updated_at.clone()),
        ("snoozed", meta.snoozed.updated_at.clone()),
        ("timeline", meta.timeline.updated_at.clone()),
    ];
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    let joined = pairs
        .iter()
        .map(|(key, updated_at)| format!("{key}:{updated_at}"))
        .collect::<Vec<_>>()
        .join("|");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

const EXPECTED_LAST_MODIFIED: &str = "Thu, 23 Jan 2025 17:05:00 GMT";

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .expect("request")
}

fn get_with_header(uri: &str, name: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header(name, value)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn returns_snapshot_with_cache_headers() {
    let (status, headers, body) = send(demo_app(), get(DASHBOARD_URI)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["etag"], expected_etag());
    assert_eq!(headers["last-modified"], EXPECTED_LAST_MODIFIED);
    assert_eq!(headers["cache-control"], "private, max-age=0, must-revalidate");

    let expected = json!({
        "data": serde_json::to_value(workspace_fixture()).unwrap(),
        "meta": serde_json::to_value(fixture_meta()).unwrap(),
    });
    assert_eq!(body, expected);
}

#[tokio::test]
async fn returns_304_when_all_requested_slices_are_unchanged() {
    let meta = fixture_meta();
    let uri = format!(
        "{DASHBOARD_URI}?commands_updated_after={}&insights_updated_after={}&timeline_updated_after={}&calendar_updated_after={}&snoozed_updated_after={}",
        meta.commands.updated_at,
        meta.insights.updated_at,
        meta.timeline.updated_at,
        meta.calendar.updated_at,
        meta.snoozed.updated_at,
    );

    let (status, headers, body) = send(demo_app(), get(&uri)).await;

    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert_eq!(headers["etag"], expected_etag());
    assert_eq!(headers["last-modified"], EXPECTED_LAST_MODIFIED);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn returns_200_when_a_requested_slice_is_stale() {
    let uri = format!("{DASHBOARD_URI}?commands_updated_after=2025-01-23T17:04:59Z");
    let (status, _headers, body) = send(demo_app(), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("data").is_some());
}

#[tokio::test]
async fn returns_304_when_if_none_match_includes_current_validator() {
    let header_value = format!("W/{}, \"some-other-etag\"", expected_etag());
    let (status, headers, _body) = send(
        demo_app(),
        get_with_header(DASHBOARD_URI, "if-none-match", &header_value),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert_eq!(headers["etag"], expected_etag());
}

#[tokio::test]
async fn returns_304_when_if_modified_since_is_up_to_date() {
    let (status, headers, _body) = send(
        demo_app(),
        get_with_header(DASHBOARD_URI, "if-modified-since", EXPECTED_LAST_MODIFIED),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert_eq!(headers["last-modified"], EXPECTED_LAST_MODIFIED);
}

#[tokio::test]
async fn returns_200_when_if_modified_since_is_stale() {
    let (status, _headers, _body) = send(
        demo_app(),
        get_with_header(
            DASHBOARD_URI,
            "if-modified-since",
            "Thu, 23 Jan 2025 12:00:00 GMT",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn returns_412_when_if_match_does_not_match() {
    let (status, _headers, body) = send(
        demo_app(),
        get_with_header(DASHBOARD_URI, "if-match", "\"stale-etag\""),
    )
    .await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["error"]["code"], "precondition_failed");
    assert_eq!(body["error"]["details"]["expectedEtag"], expected_etag());
}

#[tokio::test]
async fn returns_412_when_if_unmodified_since_is_too_old() {
    let (status, _headers, body) = send(
        demo_app(),
        get_with_header(
            DASHBOARD_URI,
            "if-unmodified-since",
            "Thu, 23 Jan 2025 12:00:00 GMT",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        body["error"]["details"]["expectedLastModified"],
        EXPECTED_LAST_MODIFIED
    );
}

#[tokio::test]
async fn returns_400_for_malformed_refresh_timestamp() {
    let uri = format!("{DASHBOARD_URI}?commands_updated_after=not-a-date");
    let (status, _headers, body) = send(demo_app(), get(&uri)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_query");
    assert_eq!(body["error"]["details"]["invalid"], json!(["commands_updated_after"]));
}

#[tokio::test]
async fn returns_404_for_unknown_workspace() {
    let resolver = Arc::new(StaticResolver(Some(Session {
        user_id: "demo-user".to_string(),
        email: None,
        workspace_ids: vec!["demo".to_string(), "missing".to_string()],
        active_workspace_id: Some("demo".to_string()),
    })));
    let (status, _headers, body) = send(
        app_with_resolver(resolver),
        get("/api/v1/workspaces/missing/dashboard"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "error": {
                "code": "workspace_not_found",
                "message": "Workspace missing or inaccessible.",
                "details": null,
            }
        })
    );
}

struct StaticResolver(Option<Session>);

impl SessionResolver for StaticResolver {
    fn resolve(&self, _headers: &HeaderMap) -> Option<Session> {
        self.0.clone()
    }
}

#[tokio::test]
async fn returns_401_when_no_session_is_resolved() {
    let (status, _headers, body) = send(
        app_with_resolver(Arc::new(StaticResolver(None))),
        get(DASHBOARD_URI),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "error": {
                "code": "unauthenticated",
                "message": "Sign-in required to access this resource.",
                "details": null,
            }
        })
    );
}

#[tokio::test]
async fn returns_403_when_session_lacks_workspace_access() {
    let resolver = Arc::new(StaticResolver(Some(Session {
        user_id: "demo-user".to_string(),
        email: Some("demo@breathe.mail".to_string()),
        workspace_ids: vec!["other".to_string()],
        active_workspace_id: Some("other".to_string()),
    })));
    let (status, _headers, body) = send(app_with_resolver(resolver), get(DASHBOARD_URI)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({
            "error": {
                "code": "workspace_forbidden",
                "message": "You do not have access to this workspace.",
                "details": { "workspaceId": "demo" },
            }
        })
    );
}

fn complete_body(key: &str) -> Value {
    let fixture = workspace_fixture();
    json!({
        "payload": {
            "actionMetadata": serde_json::to_value(&fixture.commands[0].content.action_metadata).unwrap(),
            "completedAtIso": NOW_ISO,
            "note": "Approved from the dashboard",
        },
        "idempotencyKey": key,
    })
}

#[tokio::test]
async fn complete_command_replays_idempotently_and_conflicts_on_new_key() {
    let app = demo_app();
    let fixture = workspace_fixture();
    let uri = format!(
        "/api/v1/workspaces/demo/commands/{}/complete",
        fixture.commands[0].id
    );

    let (status, _headers, first) = send(app.clone(), post_json(&uri, &complete_body(KEY_A))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["command"]["status"], "resolved");
    assert_eq!(
        first["debrief"]["statistics"]["today"]["actionsResolved"],
        json!(fixture.debrief.statistics.today.actions_resolved + 1)
    );

    let (status, _headers, replay) = send(app.clone(), post_json(&uri, &complete_body(KEY_A))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay, first);

    let (status, _headers, body) = send(app, post_json(&uri, &complete_body(KEY_B))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn nudge_follow_up_stamps_clock_time() {
    let fixture = workspace_fixture();
    let uri = format!(
        "/api/v1/workspaces/demo/follow-ups/{}/nudge",
        fixture.debrief.follow_ups[0].thread_id
    );
    let body = json!({
        "payload": { "reminderChannel": "email", "message": "Any update?" },
        "idempotencyKey": KEY_A,
    });

    let (status, _headers, result) = send(demo_app(), post_json(&uri, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        result["followUp"]["threadId"],
        fixture.debrief.follow_ups[0].thread_id
    );
    assert_eq!(result["followUp"]["nudgedAtIso"], "2025-02-01T00:00:00.000Z");
}

#[tokio::test]
async fn snooze_rejects_non_future_timestamp() {
    let fixture = workspace_fixture();
    let uri = format!(
        "/api/v1/workspaces/demo/awaiting-replies/{}/snooze",
        fixture.awaiting_replies[0].id
    );
    let body = json!({
        "payload": { "snoozeUntilIso": "2025-01-01T00:00:00Z", "reason": "Too early" },
        "idempotencyKey": KEY_A,
    });

    let (status, _headers, result) = send(demo_app(), post_json(&uri, &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["error"]["code"], "validation_failed");
}

#[tokio::test]
async fn snooze_returns_filtered_snoozed_view() {
    let fixture = workspace_fixture();
    let uri = format!(
        "/api/v1/workspaces/demo/awaiting-replies/{}/snooze",
        fixture.awaiting_replies[0].id
    );
    let body = json!({
        "payload": { "snoozeUntilIso": "2025-02-03T09:00:00Z", "reason": "Waiting on legal" },
        "idempotencyKey": KEY_A,
    });

    let (status, _headers, result) = send(demo_app(), post_json(&uri, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["awaitingReply"]["status"], "snoozed");
    assert_eq!(
        result["snoozed"],
        json!([{ "id": fixture.awaiting_replies[0].id, "snoozeUntilLabel": "2025-02-03T09:00:00Z" }])
    );
}

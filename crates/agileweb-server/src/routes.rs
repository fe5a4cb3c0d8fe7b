//! HTTP routes and handlers

use agileweb_core::limits::{
    sanitize_text, sanitize_url, truncate_chars, validate_control, validate_site_policy,
    MAX_RULE_VALUE_CHARS,
};
use agileweb_core::{
    AgeGroup, CustomParentControl, DecisionResult, InputLimits, PageMetadata, SitePolicy,
};
use agileweb_policy::EvaluationRequest;
use agileweb_telemetry::{metrics as telemetry, AuditLogEntry, BlockedAttempt, ParentAction};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/filter", post(filter))
        .route(
            "/api/blocked-attempts",
            get(blocked_attempts).delete(clear_blocked_attempts),
        )
        .route("/api/blocked-attempts/:id/resolve", post(resolve_attempt))
        .route("/api/audit-log", get(audit_log))
        .route("/api/audit-log/verify", get(verify_audit_log))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Evaluate one page for one child
async fn filter(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DecisionResult>, ApiError> {
    let request = parse_filter_request(&body, &state.limits).map_err(|e| {
        debug!(error = %e, "Rejected filter request");
        telemetry::record_rejection("invalid_request");
        e
    })?;

    let started = Instant::now();
    let result = state.engine.evaluate_request(&request);
    telemetry::record_decision(result.action, started.elapsed());

    if let Some(child_id) = request.child_id.as_deref() {
        state.recorder.lock().record(child_id, &request.url, &result);
    }

    Ok(Json(result))
}

/// Validate and cap a raw filter request.
///
/// Structural problems are rejected; individual malformed controls and
/// policies are dropped.
fn parse_filter_request(body: &[u8], limits: &InputLimits) -> Result<EvaluationRequest, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::invalid("Invalid JSON in request body"))?;
    let Value::Object(body) = value else {
        return Err(ApiError::invalid("Request body must be a valid object"));
    };

    let url = match body.get("url") {
        Some(Value::String(url)) if !url.trim().is_empty() => url,
        _ => return Err(ApiError::invalid("Missing or invalid required field: url")),
    };

    let age_group = match body.get("ageGroup") {
        Some(Value::String(age_group)) if !age_group.is_empty() => age_group,
        _ => return Err(ApiError::invalid("Missing or invalid required field: ageGroup")),
    };
    if age_group.parse::<AgeGroup>().is_err() {
        let valid = AgeGroup::ALL.map(|group| group.as_str()).join(", ");
        return Err(ApiError::invalid(format!(
            "Invalid age group. Must be one of: {}",
            valid
        )));
    }

    let custom_controls = match array_field(&body, "customControls")? {
        Some(items) => items
            .iter()
            .filter_map(parse_control)
            .take(limits.max_controls)
            .collect(),
        None => Vec::new(),
    };

    let site_policies = array_field(&body, "sitePolicies")?.map(|items| {
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<SitePolicy>(item.clone()).ok())
            .filter(|policy| validate_site_policy(policy).is_ok())
            .take(limits.max_policies)
            .collect()
    });

    let metadata = match body.get("metadata") {
        None | Some(Value::Null) => None,
        Some(Value::Object(metadata)) => Some(PageMetadata {
            title: string_field(metadata, "title", limits.max_title_chars),
            description: string_field(metadata, "description", limits.max_description_chars),
        }),
        Some(_) => return Err(ApiError::invalid("metadata must be an object")),
    };

    Ok(EvaluationRequest {
        url: sanitize_url(url, limits.max_url_chars),
        content: string_field(&body, "content", limits.max_content_chars).unwrap_or_default(),
        age_group: age_group.clone(),
        custom_controls,
        site_policies,
        metadata,
        child_id: body
            .get("childId")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string),
    })
}

/// `None` when absent or null, an error when present but not an array
fn array_field<'a>(
    body: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Vec<Value>>, ApiError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(ApiError::invalid(format!("{} must be an array", key))),
    }
}

fn string_field(object: &Map<String, Value>, key: &str, max_chars: usize) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(|s| truncate_chars(s, max_chars).to_string())
}

fn parse_control(item: &Value) -> Option<CustomParentControl> {
    let mut control: CustomParentControl = serde_json::from_value(item.clone()).ok()?;
    control.value = sanitize_text(&control.value, MAX_RULE_VALUE_CHARS);
    validate_control(&control).ok()?;
    Some(control)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    child_id: Option<String>,
    limit: Option<usize>,
}

impl HistoryQuery {
    fn matches(&self, child_id: &str) -> bool {
        self.child_id.as_deref().map_or(true, |wanted| wanted == child_id)
    }

    fn limit(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }
}

/// Blocked attempts, newest first
async fn blocked_attempts(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<BlockedAttempt>> {
    let recorder = state.recorder.lock();
    let attempts = recorder
        .attempts()
        .iter()
        .filter(|attempt| query.matches(&attempt.child_id))
        .take(query.limit())
        .cloned()
        .collect();
    Json(attempts)
}

async fn clear_blocked_attempts(State(state): State<AppState>) -> StatusCode {
    state.recorder.lock().clear_attempts();
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest {
    parent_action: ParentAction,
}

async fn resolve_attempt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<BlockedAttempt>, ApiError> {
    let resolved = state
        .recorder
        .lock()
        .resolve(id, request.parent_action)
        .cloned();

    resolved
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown blocked attempt: {}", id)))
}

/// Audit log entries, newest first
async fn audit_log(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<AuditLogEntry>> {
    let recorder = state.recorder.lock();
    let entries = recorder
        .trail()
        .entries()
        .filter(|entry| query.matches(&entry.child_id))
        .take(query.limit())
        .cloned()
        .collect();
    Json(entries)
}

async fn verify_audit_log(State(state): State<AppState>) -> Json<Value> {
    let recorder = state.recorder.lock();
    Json(json!({
        "valid": recorder.trail().verify(),
        "entries": recorder.trail().len(),
    }))
}

/// Error type for handlers
#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        AppState::new(&ServerConfig::default(), handle).unwrap()
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = create_router(state.clone(), 1024 * 1024)
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(state, method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post_raw(state: &AppState, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/filter")
            .body(Body::from(body))
            .unwrap();
        let response = create_router(state.clone(), 1024 * 1024)
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&test_state(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (status, _) = send(&test_state(), "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_filter_blocks_adult_site() {
        let body = json!({"url": "https://pornhub.com/video/1", "ageGroup": "UNDER_10"});
        let (status, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["blocked"], true);
        assert_eq!(value["action"], "BLOCK");
        assert_eq!(value["categoryId"], "sexual");
        assert_eq!(value["contentTypeId"], "explicit-sexual");
    }

    #[tokio::test]
    async fn test_filter_allows_unrestricted_page() {
        let body = json!({
            "url": "https://randomsite.com",
            "content": "hello world",
            "ageGroup": "AGE_16_18"
        });
        let (status, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["blocked"], false);
        assert_eq!(value["action"], "ALLOW");
        assert!(value["categoryId"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let (status, value) = post_raw(&test_state(), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Invalid JSON in request body");
    }

    #[tokio::test]
    async fn test_non_object_body_rejected() {
        let (status, value) = post_raw(&test_state(), "[1, 2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Request body must be a valid object");
    }

    #[tokio::test]
    async fn test_missing_or_blank_url_rejected() {
        let state = test_state();
        for body in [
            json!({"ageGroup": "UNDER_10"}),
            json!({"url": "   ", "ageGroup": "UNDER_10"}),
            json!({"url": 42, "ageGroup": "UNDER_10"}),
        ] {
            let (status, value) = send_json(&state, "POST", "/api/filter", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value["error"], "Missing or invalid required field: url");
        }
    }

    #[tokio::test]
    async fn test_age_group_validation() {
        let state = test_state();

        let body = json!({"url": "https://example.com"});
        let (status, value) = send_json(&state, "POST", "/api/filter", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "Missing or invalid required field: ageGroup");

        let body = json!({"url": "https://example.com", "ageGroup": "TEEN"});
        let (status, value) = send_json(&state, "POST", "/api/filter", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let expected = concat!(
            "Invalid age group. Must be one of: ",
            "UNDER_10, AGE_10_13, AGE_13_16, AGE_16_18, AGE_18_PLUS"
        );
        assert_eq!(value["error"], expected);
    }

    #[tokio::test]
    async fn test_non_array_lists_rejected() {
        let state = test_state();

        let body = json!({
            "url": "https://example.com",
            "ageGroup": "UNDER_10",
            "customControls": "roblox"
        });
        let (status, value) = send_json(&state, "POST", "/api/filter", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "customControls must be an array");

        let body = json!({
            "url": "https://example.com",
            "ageGroup": "UNDER_10",
            "sitePolicies": {}
        });
        let (status, value) = send_json(&state, "POST", "/api/filter", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "sitePolicies must be an array");
    }

    #[tokio::test]
    async fn test_non_object_metadata_rejected() {
        let body = json!({
            "url": "https://example.com",
            "ageGroup": "UNDER_10",
            "metadata": "title"
        });
        let (status, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "metadata must be an object");
    }

    #[tokio::test]
    async fn test_invalid_controls_are_dropped() {
        let body = json!({
            "url": "https://roblox.com/games",
            "ageGroup": "AGE_13_16",
            "customControls": [
                {"type": "bogus", "value": "roblox", "action": "ALLOW"},
                {"type": "url", "value": "   ", "action": "ALLOW"},
                {"type": "url", "value": "roblox.com", "action": "SOMETIMES"},
                "not an object",
                {"type": "url", "value": "roblox.com", "action": "BLOCK"}
            ]
        });
        let (status, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["action"], "BLOCK");
        assert_eq!(value["reason"], "Custom control: url - roblox.com");
    }

    #[tokio::test]
    async fn test_controls_are_capped() {
        let mut controls: Vec<Value> = (0..100)
            .map(|i| json!({"type": "keyword", "value": format!("unused{}", i), "action": "GATE"}))
            .collect();
        controls.push(json!({"type": "keyword", "value": "chess", "action": "BLOCK"}));

        let body = json!({
            "url": "https://example.com",
            "content": "chess club",
            "ageGroup": "AGE_13_16",
            "customControls": controls
        });
        let (_, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;
        assert_eq!(value["action"], "ALLOW");
    }

    #[tokio::test]
    async fn test_site_policies_applied() {
        let body = json!({
            "url": "https://www.youtube.com/watch?v=1",
            "ageGroup": "AGE_10_13",
            "sitePolicies": [
                {"sitePattern": "youtube.com", "type": "domain", "ageGroup": "AGE_10_13",
                 "action": "GATE", "gateMode": "delay"}
            ]
        });
        let (status, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["action"], "GATE");
        assert_eq!(value["gateMode"], "delay");
    }

    #[tokio::test]
    async fn test_blocked_decisions_are_recorded() {
        let state = test_state();

        let body = json!({
            "url": "https://pornhub.com",
            "ageGroup": "AGE_13_16",
            "childId": "kid-1"
        });
        send_json(&state, "POST", "/api/filter", Some(body)).await;
        let body = json!({
            "url": "https://randomsite.com",
            "ageGroup": "AGE_13_16",
            "childId": "kid-1"
        });
        send_json(&state, "POST", "/api/filter", Some(body)).await;
        let body = json!({"url": "https://pornhub.com", "ageGroup": "AGE_13_16"});
        send_json(&state, "POST", "/api/filter", Some(body)).await;

        let (status, attempts) =
            send_json(&state, "GET", "/api/blocked-attempts?childId=kid-1", None).await;
        assert_eq!(status, StatusCode::OK);
        let attempts = attempts.as_array().unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0]["url"], "https://pornhub.com");
        assert_eq!(attempts[0]["category"], "sexual");

        let (_, entries) = send_json(&state, "GET", "/api/audit-log", None).await;
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["type"], "blocked_attempt");

        let (_, verify) = send_json(&state, "GET", "/api/audit-log/verify", None).await;
        assert_eq!(verify["valid"], true);
        assert_eq!(verify["entries"], 1);
    }

    #[tokio::test]
    async fn test_resolve_and_clear_attempts() {
        let state = test_state();
        let body = json!({
            "url": "https://pornhub.com",
            "ageGroup": "UNDER_10",
            "childId": "kid-1"
        });
        send_json(&state, "POST", "/api/filter", Some(body)).await;

        let (_, attempts) = send_json(&state, "GET", "/api/blocked-attempts", None).await;
        let id = attempts[0]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/blocked-attempts/{}/resolve", id);
        let (status, resolved) =
            send_json(&state, "POST", &uri, Some(json!({"parentAction": "approved_once"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["parentAction"], "approved_once");

        let uri = format!("/api/blocked-attempts/{}/resolve", Uuid::new_v4());
        let (status, _) =
            send_json(&state, "POST", &uri, Some(json!({"parentAction": "blocked"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&state, "DELETE", "/api/blocked-attempts", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, attempts) = send_json(&state, "GET", "/api/blocked-attempts", None).await;
        assert!(attempts.as_array().unwrap().is_empty());

        let (_, entries) = send_json(&state, "GET", "/api/audit-log?limit=1", None).await;
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["type"], "approval");
    }

    #[test]
    fn test_parse_truncates_strings() {
        let limits = InputLimits {
            max_url_chars: 30,
            max_content_chars: 5,
            max_title_chars: 3,
            ..Default::default()
        };
        let body = json!({
            "url": format!("  https://example.com/{}", "a".repeat(100)),
            "content": "abcdefghij",
            "ageGroup": "UNDER_10",
            "metadata": {"title": "Long title", "description": 7}
        });

        let request = parse_filter_request(body.to_string().as_bytes(), &limits).unwrap();
        assert_eq!(request.url.chars().count(), 30);
        assert!(request.url.starts_with("https://"));
        assert_eq!(request.content, "abcde");

        let metadata = request.metadata.unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Lon"));
        assert!(metadata.description.is_none());
    }

    #[test]
    fn test_parse_drops_controls_failing_validation() {
        let body = json!({
            "url": "https://example.com",
            "ageGroup": "AGE_10_13",
            "customControls": [
                {"type": "keyword", "value": "one two three four five six", "action": "BLOCK"},
                {"type": "url", "value": "not a url", "action": "BLOCK"},
                {"type": "keyword", "value": "  minecraft mods  ", "action": "GATE"},
                {"type": "url", "value": "roblox.com", "action": "ALLOW"}
            ]
        });

        let request =
            parse_filter_request(body.to_string().as_bytes(), &InputLimits::default()).unwrap();
        let values: Vec<_> = request.custom_controls.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["minecraft mods", "roblox.com"]);
    }

    #[tokio::test]
    async fn test_long_keyword_control_is_ignored() {
        let body = json!({
            "url": "https://example.com/club",
            "content": "one two three four five six",
            "ageGroup": "AGE_13_16",
            "customControls": [
                {"type": "keyword", "value": "one two three four five six", "action": "BLOCK"}
            ]
        });
        let (status, value) = send_json(&test_state(), "POST", "/api/filter", Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["action"], "ALLOW");
    }
}

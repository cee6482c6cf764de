use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Local;
use moodelix_core::error::StoreError;
use moodelix_core::sounds::scan_sounds;
use moodelix_core::wallpaper::{live_wallpapers, photo_wallpapers};
use moodelix_core::{AuthSession, NewTodo, TodoPatch, UserPreferences};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/:id", patch(update_todo).delete(delete_todo))
        .route("/api/wallpapers", get(list_wallpapers).post(sign_wallpaper))
        .route("/api/sounds", get(list_sounds))
        .route("/api/profile", get(get_profile))
        .route("/api/preferences", put(put_preferences))
        .route("/api/streak/focus-complete", post(post_focus_complete))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn store_error(e: StoreError) -> Response {
    match e {
        StoreError::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        StoreError::NotFound { .. } => error_response(StatusCode::NOT_FOUND, e.to_string()),
        other => {
            error!(error = %other, "store request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthSession, Response> {
    let token = bearer_token(headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    state.store.authenticate(token).await.map_err(store_error)
}

/// Decode a JSON body. Handlers authenticate before calling this, so an
/// anonymous caller sees 401 whatever the payload.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed request body");
        error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}"))
    })
}

#[derive(Serialize)]
struct HealthInfo {
    ok: bool,
    service: &'static str,
    version: &'static str,
    store: String,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthInfo {
        ok: true,
        service: "moodelix-server",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.name().to_string(),
    })
}

async fn list_todos(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.store.list_todos(&session).await {
        Ok(todos) => Json(todos).into_response(),
        Err(e) => store_error(e),
    }
}

async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let body: NewTodo = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if body.title.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Title is required");
    }
    match state.store.insert_todo(&session, &body).await {
        Ok(todo) => {
            info!(user_id = %session.user_id, todo_id = %todo.id, "todo created");
            (StatusCode::CREATED, Json(todo)).into_response()
        }
        Err(e) => store_error(e),
    }
}

async fn update_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let patch: TodoPatch = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if patch.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Nothing to update");
    }
    match state.store.update_todo(&session, &id, &patch).await {
        Ok(todo) => Json(todo).into_response(),
        Err(e) => store_error(e),
    }
}

async fn delete_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.store.delete_todo(&session, &id).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WallpaperRequest {
    #[serde(default)]
    s3_key: Option<String>,
}

async fn sign_wallpaper(
    State(state): State<AppState>,
    body: Option<Json<WallpaperRequest>>,
) -> Response {
    let key = body
        .and_then(|Json(req)| req.s3_key)
        .filter(|k| !k.trim().is_empty());
    let Some(key) = key else {
        return error_response(StatusCode::BAD_REQUEST, "S3 key is required");
    };

    // Signed URLs expire, so the server never serves them from a cache.
    let signed_url = state.resolver.lookup(&key).await;
    Json(json!({ "signedUrl": signed_url })).into_response()
}

async fn list_wallpapers() -> impl IntoResponse {
    Json(json!({
        "live": live_wallpapers(),
        "photo": photo_wallpapers(),
    }))
}

async fn list_sounds(State(state): State<AppState>) -> Response {
    let dir = state.sounds_dir.clone();
    match tokio::task::spawn_blocking(move || scan_sounds(&dir)).await {
        Ok(sounds) => Json(json!({ "count": sounds.len(), "sounds": sounds })).into_response(),
        Err(e) => {
            error!(error = %e, "error scanning sounds");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to scan sounds")
        }
    }
}

async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.store.load_profile(&session).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => store_error(e),
    }
}

async fn put_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let prefs: UserPreferences = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = prefs.validate() {
        warn!(error = %e, "rejected preferences");
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }
    match state.store.save_preferences(&session, &prefs).await {
        Ok(()) => Json(prefs).into_response(),
        Err(e) => store_error(e),
    }
}

#[derive(Deserialize)]
struct FocusComplete {
    minutes: u32,
}

async fn post_focus_complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let body: FocusComplete = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if body.minutes == 0 {
        return error_response(StatusCode::BAD_REQUEST, "minutes must be positive");
    }

    let mut streak = match state.store.load_profile(&session).await {
        Ok(profile) => profile.streak_data,
        Err(e) => return store_error(e),
    };
    streak.record_focus_complete(Local::now().date_naive(), body.minutes);

    match state.store.save_streak(&session, &streak).await {
        Ok(()) => {
            info!(
                user_id = %session.user_id,
                streak = streak.current_streak,
                "focus cycle recorded"
            );
            Json(streak).into_response()
        }
        Err(e) => store_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use moodelix_core::{Database, WallpaperResolver};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        token: String,
        _sounds: tempfile::TempDir,
    }

    fn harness() -> Harness {
        let db = Database::open_memory().unwrap();
        db.upsert_profile("u1", "a@example.com", "Ada").unwrap();
        let token = db.create_session("u1").unwrap();

        let sounds = tempfile::tempdir().unwrap();
        std::fs::write(sounds.path().join("click.mp3"), b"").unwrap();
        std::fs::write(sounds.path().join("readme.md"), b"").unwrap();

        let state = AppState::new(
            Arc::new(db),
            WallpaperResolver::default(),
            sounds.path().to_path_buf(),
        );
        Harness {
            app: router(state),
            token,
            _sounds: sounds,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn todos_require_token() {
        let h = harness();
        let (status, body) = send(&h.app, request("GET", "/api/todos", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = send(&h.app, request("GET", "/api/todos", Some("forged"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn todo_lifecycle() {
        let h = harness();
        let t = Some(h.token.as_str());

        let (status, created) = send(
            &h.app,
            request("POST", "/api/todos", t, Some(json!({"title": "Draft intro"}))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &h.app,
            request("PATCH", &format!("/api/todos/{id}"), t, Some(json!({"completed": true}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], true);

        let (_, list) = send(&h.app, request("GET", "/api/todos", t, None)).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, body) =
            send(&h.app, request("DELETE", &format!("/api/todos/{id}"), t, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (status, _) =
            send(&h.app, request("DELETE", &format!("/api/todos/{id}"), t, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let h = harness();
        let (status, body) = send(
            &h.app,
            request("POST", "/api/todos", Some(&h.token), Some(json!({"title": "   "}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title is required");
    }

    #[tokio::test]
    async fn wallpaper_key_is_required() {
        let h = harness();
        let (status, body) =
            send(&h.app, request("POST", "/api/wallpapers", None, Some(json!({})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "S3 key is required");
    }

    #[tokio::test]
    async fn wallpaper_falls_back_to_local_path() {
        let h = harness();
        let (status, body) = send(
            &h.app,
            request(
                "POST",
                "/api/wallpapers",
                None,
                Some(json!({"s3Key": "photo-wallpaper/1 (1).jpg"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["signedUrl"], "/wallpaper/photo wallpaper/1 (1).jpg");

        let (_, catalog) = send(&h.app, request("GET", "/api/wallpapers", None, None)).await;
        assert_eq!(catalog["live"].as_array().unwrap().len(), 15);
        assert_eq!(catalog["photo"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn sounds_are_listed() {
        let h = harness();
        let (status, body) = send(&h.app, request("GET", "/api/sounds", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["sounds"][0], "/sounds/click.mp3");
    }

    #[tokio::test]
    async fn focus_complete_updates_streak() {
        let h = harness();
        let t = Some(h.token.as_str());
        let (status, streak) = send(
            &h.app,
            request("POST", "/api/streak/focus-complete", t, Some(json!({"minutes": 25}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(streak["current_streak"], 1);
        assert_eq!(streak["today_focused_minutes"], 25);

        let (_, profile) = send(&h.app, request("GET", "/api/profile", t, None)).await;
        assert_eq!(profile["streak_data"]["today_focused_minutes"], 25);
    }

    #[tokio::test]
    async fn preferences_are_validated() {
        let h = harness();
        let t = Some(h.token.as_str());
        let (status, _) = send(
            &h.app,
            request("PUT", "/api/preferences", t, Some(json!({"blur_intensity": 40}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, saved) = send(
            &h.app,
            request(
                "PUT",
                "/api/preferences",
                t,
                Some(json!({"blur_intensity": 6, "wallpaper_brightness": "dark"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["blur_intensity"], 6);
    }

    #[tokio::test]
    async fn break_duration_outside_bounds_is_rejected() {
        let h = harness();
        let t = Some(h.token.as_str());
        for minutes in [0, 500] {
            let (status, body) = send(
                &h.app,
                request(
                    "PUT",
                    "/api/preferences",
                    t,
                    Some(json!({"auto_break_settings": {"breakDuration": minutes}})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("breakDuration"));
        }

        let (_, profile) = send(&h.app, request("GET", "/api/profile", t, None)).await;
        assert_ne!(profile["preferences"]["auto_break_settings"]["breakDuration"], 0);
    }

    fn raw_request(method: &str, uri: &str, token: Option<&str>, body: &'static str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn auth_is_checked_before_body_parsing() {
        let h = harness();
        let cases = [
            ("POST", "/api/todos"),
            ("PATCH", "/api/todos/abc"),
            ("PUT", "/api/preferences"),
            ("POST", "/api/streak/focus-complete"),
        ];
        for (method, uri) in cases {
            let (status, body) = send(&h.app, raw_request(method, uri, None, "{not json")).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"], "Unauthorized");

            let (status, _) =
                send(&h.app, raw_request(method, uri, Some("forged"), "{not json")).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");

            let (status, body) =
                send(&h.app, raw_request(method, uri, Some(&h.token), "{not json")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
        }
    }

    #[tokio::test]
    async fn health_reports_store() {
        let h = harness();
        let (status, body) = send(&h.app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "local");
    }
}

//! Hosted dashboard store: Supabase PostgREST tables plus GoTrue auth.
//!
//! Every request carries the project `apikey` and the caller's bearer
//! token so row-level security applies server side. Queries are also
//! filtered by `user_id` explicitly.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::StoreError;
use crate::profile::{UserPreferences, UserProfile};
use crate::storage::{AuthSession, DashboardStore, NewTodo, Todo, TodoPatch};
use crate::timer::StreakData;

const PROFILE_SELECT: &str = "*,streak_data(*),user_preferences(*)";

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct GoTrueUser {
    id: String,
}

#[derive(Deserialize)]
struct ProfileRow {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    streak_data: Value,
    #[serde(default)]
    user_preferences: Value,
}

impl SupabaseStore {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self::with_client(Client::new(), base_url, anon_key)
    }

    pub fn with_client(client: Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    fn table(&self, method: reqwest::Method, table: &str, session: &AuthSession) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{table}"), &session.access_token)
    }

    async fn check(resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(StoreError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, StoreError> {
        let resp = Self::check(req.send().await?).await?;
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// PostgREST returns rows as an array; take the single affected one.
    async fn single_row<T: DeserializeOwned>(
        req: RequestBuilder,
        entity: &'static str,
        id: &str,
    ) -> Result<T, StoreError> {
        let rows: Vec<T> = Self::send_json(req).await?;
        rows.into_iter().next().ok_or_else(|| StoreError::NotFound {
            entity,
            id: id.to_string(),
        })
    }
}

/// Embedded one-to-one relations may come back as an object, a
/// one-element array or null.
fn embedded<T: DeserializeOwned + Default>(value: Value) -> Result<T, StoreError> {
    let value = match value {
        Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
        Value::Array(_) | Value::Null => return Ok(T::default()),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}

#[async_trait]
impl DashboardStore for SupabaseStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn authenticate(&self, access_token: &str) -> Result<AuthSession, StoreError> {
        if access_token.is_empty() {
            return Err(StoreError::Unauthorized);
        }
        let user: GoTrueUser =
            Self::send_json(self.request(reqwest::Method::GET, "/auth/v1/user", access_token))
                .await?;
        Ok(AuthSession {
            access_token: access_token.to_string(),
            user_id: user.id,
        })
    }

    async fn list_todos(&self, session: &AuthSession) -> Result<Vec<Todo>, StoreError> {
        debug!(user_id = %session.user_id, "fetching todos");
        let req = self
            .table(reqwest::Method::GET, "todos", session)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user_id)),
                ("order", "created_at.desc".to_string()),
            ]);
        Self::send_json(req).await
    }

    async fn insert_todo(&self, session: &AuthSession, todo: &NewTodo) -> Result<Todo, StoreError> {
        let mut body = json!({
            "user_id": session.user_id,
            "title": todo.title,
            "completed": false,
        });
        if let Some(due) = todo.due_at {
            body["due_at"] = json!(due);
        }
        let req = self
            .table(reqwest::Method::POST, "todos", session)
            .header("Prefer", "return=representation")
            .json(&body);
        Self::single_row(req, "todo", &todo.title).await
    }

    async fn update_todo(
        &self,
        session: &AuthSession,
        id: &str,
        patch: &TodoPatch,
    ) -> Result<Todo, StoreError> {
        let req = self
            .table(reqwest::Method::PATCH, "todos", session)
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .header("Prefer", "return=representation")
            .json(patch);
        Self::single_row(req, "todo", id).await
    }

    async fn delete_todo(&self, session: &AuthSession, id: &str) -> Result<(), StoreError> {
        let req = self
            .table(reqwest::Method::DELETE, "todos", session)
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .header("Prefer", "return=representation");
        Self::single_row::<Value>(req, "todo", id).await.map(|_| ())
    }

    async fn load_profile(&self, session: &AuthSession) -> Result<UserProfile, StoreError> {
        let req = self
            .table(reqwest::Method::GET, "profiles", session)
            .query(&[
                ("select", PROFILE_SELECT.to_string()),
                ("id", format!("eq.{}", session.user_id)),
            ]);
        let row: ProfileRow = Self::single_row(req, "profile", &session.user_id).await?;

        Ok(UserProfile {
            id: row.id,
            email: row.email.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            image_url: row.image_url,
            streak_data: embedded::<StreakData>(row.streak_data)?,
            preferences: embedded::<UserPreferences>(row.user_preferences)?,
        })
    }

    async fn save_streak(&self, session: &AuthSession, streak: &StreakData) -> Result<(), StoreError> {
        let req = self
            .table(reqwest::Method::PATCH, "streak_data", session)
            .query(&[("id", format!("eq.{}", session.user_id))])
            .json(streak);
        Self::check(req.send().await?).await.map(|_| ())
    }

    async fn save_preferences(
        &self,
        session: &AuthSession,
        prefs: &UserPreferences,
    ) -> Result<(), StoreError> {
        let req = self
            .table(reqwest::Method::PATCH, "user_preferences", session)
            .query(&[("id", format!("eq.{}", session.user_id))])
            .json(prefs);
        Self::check(req.send().await?).await.map(|_| ())
    }
}

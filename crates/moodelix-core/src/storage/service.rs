//! Page-level todo and profile operations.
//!
//! Each call authenticates the current session first and scopes everything
//! to that user. Store failures are logged and swallowed: callers get an
//! empty list, `None` or `false` and carry on. No retries; last write wins.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{AuthSession, DashboardStore, NewTodo, Todo, TodoPatch};
use crate::profile::{UserPreferences, UserProfile};
use crate::timer::StreakData;

/// Share of completed todos, rounded to a whole percent.
pub fn task_progress_pct(todos: &[Todo]) -> u32 {
    if todos.is_empty() {
        return 0;
    }
    let done = todos.iter().filter(|t| t.completed).count();
    ((done as f64 / todos.len() as f64) * 100.0).round() as u32
}

async fn resolve_session(store: &dyn DashboardStore, token: Option<&str>) -> Option<AuthSession> {
    let token = token?;
    match store.authenticate(token).await {
        Ok(session) => Some(session),
        Err(e) if e.is_unauthorized() => {
            debug!(store = store.name(), "session rejected");
            None
        }
        Err(e) => {
            warn!(store = store.name(), error = %e, "failed to authenticate session");
            None
        }
    }
}

/// Todo list operations for one caller.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn DashboardStore>,
    token: Option<String>,
}

impl TodoService {
    pub fn new(store: Arc<dyn DashboardStore>, token: Option<String>) -> Self {
        Self { store, token }
    }

    async fn session(&self) -> Option<AuthSession> {
        resolve_session(self.store.as_ref(), self.token.as_deref()).await
    }

    pub async fn fetch_todos(&self) -> Vec<Todo> {
        let Some(session) = self.session().await else {
            return Vec::new();
        };
        self.store.list_todos(&session).await.unwrap_or_else(|e| {
            warn!(error = %e, "error fetching todos");
            Vec::new()
        })
    }

    /// Blank titles are ignored without touching the store.
    pub async fn add_todo(&self, title: &str) -> Option<Todo> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let session = self.session().await?;
        self.store
            .insert_todo(&session, &NewTodo::titled(title))
            .await
            .map_err(|e| warn!(error = %e, "error adding todo"))
            .ok()
    }

    pub async fn update_todo(&self, id: &str, patch: &TodoPatch) -> Option<Todo> {
        let session = self.session().await?;
        self.store
            .update_todo(&session, id, patch)
            .await
            .map_err(|e| warn!(todo_id = id, error = %e, "error updating todo"))
            .ok()
    }

    pub async fn delete_todo(&self, id: &str) -> bool {
        let Some(session) = self.session().await else {
            return false;
        };
        match self.store.delete_todo(&session, id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(todo_id = id, error = %e, "error deleting todo");
                false
            }
        }
    }

    /// Flip `completed` on the todo with `id`.
    pub async fn toggle_todo(&self, id: &str) -> Option<Todo> {
        let current = self.fetch_todos().await.into_iter().find(|t| t.id == id)?;
        self.update_todo(id, &TodoPatch::completed(!current.completed))
            .await
    }
}

/// Streak and preference updates for one caller.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DashboardStore>,
    token: Option<String>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DashboardStore>, token: Option<String>) -> Self {
        Self { store, token }
    }

    async fn session(&self) -> Option<AuthSession> {
        resolve_session(self.store.as_ref(), self.token.as_deref()).await
    }

    pub async fn load_profile(&self) -> Option<UserProfile> {
        let session = self.session().await?;
        self.store
            .load_profile(&session)
            .await
            .map_err(|e| warn!(error = %e, "error loading profile"))
            .ok()
    }

    async fn mutate_streak(&self, f: impl FnOnce(&mut StreakData)) -> Option<StreakData> {
        let session = self.session().await?;
        let profile = self
            .store
            .load_profile(&session)
            .await
            .map_err(|e| warn!(error = %e, "error loading profile"))
            .ok()?;

        let mut streak = profile.streak_data;
        f(&mut streak);

        match self.store.save_streak(&session, &streak).await {
            Ok(()) => Some(streak),
            Err(e) => {
                warn!(error = %e, "error saving streak data");
                None
            }
        }
    }

    /// Credit a finished focus cycle and persist the new streak.
    pub async fn record_focus_complete(
        &self,
        today: NaiveDate,
        focus_minutes: u32,
    ) -> Option<StreakData> {
        self.mutate_streak(|s| s.record_focus_complete(today, focus_minutes))
            .await
    }

    pub async fn update_daily_goal(&self, hours: u32) -> Option<StreakData> {
        self.mutate_streak(|s| s.update_daily_goal(hours)).await
    }

    pub async fn save_preferences(&self, prefs: &UserPreferences) -> bool {
        if let Err(e) = prefs.validate() {
            warn!(error = %e, "rejected preferences");
            return false;
        }
        let Some(session) = self.session().await else {
            return false;
        };
        match self.store.save_preferences(&session, prefs).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "error saving preferences");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::Database;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts any token and fails every data call, counting them.
    #[derive(Default)]
    struct BrokenStore {
        calls: AtomicUsize,
    }

    impl BrokenStore {
        fn fail<T>(&self) -> Result<T, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Remote {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    #[async_trait]
    impl DashboardStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }
        async fn authenticate(&self, token: &str) -> Result<AuthSession, StoreError> {
            Ok(AuthSession {
                access_token: token.into(),
                user_id: "u".into(),
            })
        }
        async fn list_todos(&self, _: &AuthSession) -> Result<Vec<Todo>, StoreError> {
            self.fail()
        }
        async fn insert_todo(&self, _: &AuthSession, _: &NewTodo) -> Result<Todo, StoreError> {
            self.fail()
        }
        async fn update_todo(&self, _: &AuthSession, _: &str, _: &TodoPatch) -> Result<Todo, StoreError> {
            self.fail()
        }
        async fn delete_todo(&self, _: &AuthSession, _: &str) -> Result<(), StoreError> {
            self.fail()
        }
        async fn load_profile(&self, _: &AuthSession) -> Result<UserProfile, StoreError> {
            self.fail()
        }
        async fn save_streak(&self, _: &AuthSession, _: &StreakData) -> Result<(), StoreError> {
            self.fail()
        }
        async fn save_preferences(&self, _: &AuthSession, _: &UserPreferences) -> Result<(), StoreError> {
            self.fail()
        }
    }

    fn local() -> (Arc<Database>, String) {
        let db = Database::open_memory().unwrap();
        db.upsert_profile("u1", "a@example.com", "Ada").unwrap();
        let token = db.create_session("u1").unwrap();
        (Arc::new(db), token)
    }

    fn todo(completed: bool) -> Todo {
        Todo {
            id: uuid::Uuid::new_v4().to_string(),
            title: "t".into(),
            completed,
            due_at: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn progress_rounds_and_handles_empty() {
        assert_eq!(task_progress_pct(&[]), 0);
        assert_eq!(task_progress_pct(&[todo(true), todo(false), todo(false)]), 33);
        assert_eq!(task_progress_pct(&[todo(true), todo(true), todo(false)]), 67);
        assert_eq!(task_progress_pct(&[todo(true)]), 100);
    }

    #[tokio::test]
    async fn blank_title_makes_no_store_call() {
        let store = Arc::new(BrokenStore::default());
        let svc = TodoService::new(store.clone(), Some("tok".into()));
        assert!(svc.add_todo("   \t").await.is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_errors_are_swallowed() {
        let store = Arc::new(BrokenStore::default());
        let svc = TodoService::new(store.clone(), Some("tok".into()));
        assert!(svc.fetch_todos().await.is_empty());
        assert!(svc.add_todo("x").await.is_none());
        assert!(!svc.delete_todo("1").await);
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);

        let profiles = ProfileService::new(store, Some("tok".into()));
        assert!(profiles.update_daily_goal(3).await.is_none());
    }

    #[tokio::test]
    async fn no_session_yields_empty_results() {
        let (db, _) = local();
        let svc = TodoService::new(db.clone(), None);
        assert!(svc.fetch_todos().await.is_empty());
        assert!(svc.add_todo("write").await.is_none());

        let bad = TodoService::new(db, Some("forged".into()));
        assert!(bad.add_todo("write").await.is_none());
    }

    #[tokio::test]
    async fn toggle_flips_completed() {
        let (db, token) = local();
        let svc = TodoService::new(db, Some(token));
        let created = svc.add_todo("  read  ").await.unwrap();
        assert_eq!(created.title, "read");

        let toggled = svc.toggle_todo(&created.id).await.unwrap();
        assert!(toggled.completed);
        let back = svc.toggle_todo(&created.id).await.unwrap();
        assert!(!back.completed);
        assert!(svc.toggle_todo("missing").await.is_none());
    }

    #[tokio::test]
    async fn focus_completion_persists_streak() {
        let (db, token) = local();
        let svc = ProfileService::new(db, Some(token));
        let day = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        svc.record_focus_complete(day, 25).await.unwrap();
        let streak = svc.record_focus_complete(day.succ_opt().unwrap(), 25).await.unwrap();
        assert_eq!(streak.current_streak, 2);

        let profile = svc.load_profile().await.unwrap();
        assert_eq!(profile.streak_data.current_streak, 2);
        assert_eq!(svc.update_daily_goal(30).await.unwrap().daily_goal, 12);
    }

    #[tokio::test]
    async fn invalid_preferences_are_not_saved() {
        let (db, token) = local();
        let svc = ProfileService::new(db, Some(token));
        let prefs = UserPreferences {
            blur_intensity: 99,
            ..UserPreferences::default()
        };
        assert!(!svc.save_preferences(&prefs).await);
        assert!(svc.save_preferences(&UserPreferences::default()).await);
    }
}

//! SQLite-backed dashboard store.
//!
//! Provides persistent storage for:
//! - Profiles and bearer-token sessions
//! - Todos, scoped per user
//! - Streak statistics and saved preferences
//!
//! Used as the offline backend and in tests; the hosted backend lives in
//! [`crate::integrations::supabase`].

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{AuthSession, DashboardStore, NewTodo, Todo, TodoPatch};
use crate::error::StoreError;
use crate::profile::{UserPreferences, UserProfile};
use crate::timer::StreakData;

/// SQLite database implementing [`DashboardStore`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/moodelix/moodelix.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StoreError> {
        let path = super::data_dir()
            .map_err(|e| StoreError::Sqlite(e.to_string()))?
            .join("moodelix.db");
        Self::open_path(&path)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_path(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Sqlite("connection lock poisoned".into()))?;
        Ok(f(&conn)?)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS profiles (
                    id        TEXT PRIMARY KEY,
                    email     TEXT NOT NULL,
                    name      TEXT NOT NULL DEFAULT '',
                    image_url TEXT
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    token   TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL REFERENCES profiles(id)
                );

                CREATE TABLE IF NOT EXISTS todos (
                    id         TEXT PRIMARY KEY,
                    user_id    TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    completed  INTEGER NOT NULL DEFAULT 0,
                    due_at     TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT
                );

                CREATE TABLE IF NOT EXISTS streak_data (
                    user_id               TEXT PRIMARY KEY,
                    current_streak        INTEGER NOT NULL DEFAULT 0,
                    total_focused_hours   REAL NOT NULL DEFAULT 0,
                    daily_goal            INTEGER NOT NULL DEFAULT 4,
                    today_focused_minutes INTEGER NOT NULL DEFAULT 0,
                    last_focus_date       TEXT
                );

                CREATE TABLE IF NOT EXISTS user_preferences (
                    user_id TEXT PRIMARY KEY,
                    data    TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_todos_user_created ON todos(user_id, created_at);",
            )
        })
    }

    /// Insert or update a profile row.
    pub fn upsert_profile(&self, id: &str, email: &str, name: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (id, email, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET email = excluded.email, name = excluded.name",
                params![id, email, name],
            )
            .map(|_| ())
        })
    }

    /// Issue a new bearer token for `user_id`.
    pub fn create_session(&self, user_id: &str) -> Result<String, StoreError> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id) VALUES (?1, ?2)",
                params![token, user_id],
            )
        })?;
        Ok(token)
    }

    /// Remove a bearer token. Unknown tokens are ignored.
    pub fn revoke_session(&self, token: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])
                .map(|_| ())
        })
    }

    fn fetch_todo(conn: &Connection, user_id: &str, id: &str) -> Result<Option<Todo>, rusqlite::Error> {
        conn.query_row(
            "SELECT id, title, completed, due_at, created_at, updated_at
             FROM todos WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            row_to_todo,
        )
        .optional()
    }
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> Result<Todo, rusqlite::Error> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        due_at: row.get::<_, Option<DateTime<Utc>>>(3)?,
        created_at: row.get(4)?,
        updated_at: row.get::<_, Option<DateTime<Utc>>>(5)?,
    })
}

fn not_found(entity: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

#[async_trait]
impl DashboardStore for Database {
    fn name(&self) -> &str {
        "local"
    }

    async fn authenticate(&self, access_token: &str) -> Result<AuthSession, StoreError> {
        let user_id = self.with_conn(|conn| {
            conn.query_row(
                "SELECT user_id FROM sessions WHERE token = ?1",
                params![access_token],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })?;

        match user_id {
            Some(user_id) => Ok(AuthSession {
                access_token: access_token.to_string(),
                user_id,
            }),
            None => Err(StoreError::Unauthorized),
        }
    }

    async fn list_todos(&self, session: &AuthSession) -> Result<Vec<Todo>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, completed, due_at, created_at, updated_at
                 FROM todos WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![session.user_id], row_to_todo)?;
            rows.collect()
        })
    }

    async fn insert_todo(&self, session: &AuthSession, todo: &NewTodo) -> Result<Todo, StoreError> {
        let row = Todo {
            id: uuid::Uuid::new_v4().to_string(),
            title: todo.title.trim().to_string(),
            completed: false,
            due_at: todo.due_at,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (id, user_id, title, completed, due_at, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5)",
                params![row.id, session.user_id, row.title, row.due_at, row.created_at],
            )
        })?;
        Ok(row)
    }

    async fn update_todo(
        &self,
        session: &AuthSession,
        id: &str,
        patch: &TodoPatch,
    ) -> Result<Todo, StoreError> {
        let updated = self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE todos SET
                    title = COALESCE(?3, title),
                    completed = COALESCE(?4, completed),
                    due_at = COALESCE(?5, due_at),
                    updated_at = ?6
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    id,
                    session.user_id,
                    patch.title,
                    patch.completed,
                    patch.due_at,
                    Utc::now()
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            Self::fetch_todo(conn, &session.user_id, id)
        })?;
        updated.ok_or_else(|| not_found("todo", id))
    }

    async fn delete_todo(&self, session: &AuthSession, id: &str) -> Result<(), StoreError> {
        let changed = self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM todos WHERE id = ?1 AND user_id = ?2",
                params![id, session.user_id],
            )
        })?;
        if changed == 0 {
            return Err(not_found("todo", id));
        }
        Ok(())
    }

    async fn load_profile(&self, session: &AuthSession) -> Result<UserProfile, StoreError> {
        let user_id = session.user_id.as_str();
        let (profile, streak, prefs) = self.with_conn(|conn| {
            let profile = conn
                .query_row(
                    "SELECT id, email, name, image_url FROM profiles WHERE id = ?1",
                    params![user_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Option<String>>(3)?,
                        ))
                    },
                )
                .optional()?;

            let streak = conn
                .query_row(
                    "SELECT current_streak, total_focused_hours, daily_goal,
                            today_focused_minutes, last_focus_date
                     FROM streak_data WHERE user_id = ?1",
                    params![user_id],
                    |row| {
                        Ok(StreakData {
                            current_streak: row.get(0)?,
                            total_focused_hours: row.get(1)?,
                            daily_goal: row.get(2)?,
                            today_focused_minutes: row.get(3)?,
                            last_focus_date: row.get::<_, Option<NaiveDate>>(4)?,
                        })
                    },
                )
                .optional()?;

            let prefs = conn
                .query_row(
                    "SELECT data FROM user_preferences WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;

            Ok((profile, streak, prefs))
        })?;

        let (id, email, name, image_url) = profile.ok_or_else(|| not_found("profile", user_id))?;
        let preferences = match prefs {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StoreError::Malformed(e.to_string()))?
            }
            None => UserPreferences::default(),
        };

        Ok(UserProfile {
            id,
            email,
            name,
            image_url,
            streak_data: streak.unwrap_or_default(),
            preferences,
        })
    }

    async fn save_streak(&self, session: &AuthSession, streak: &StreakData) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO streak_data (user_id, current_streak, total_focused_hours, daily_goal,
                                          today_focused_minutes, last_focus_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id) DO UPDATE SET
                    current_streak = excluded.current_streak,
                    total_focused_hours = excluded.total_focused_hours,
                    daily_goal = excluded.daily_goal,
                    today_focused_minutes = excluded.today_focused_minutes,
                    last_focus_date = excluded.last_focus_date",
                params![
                    session.user_id,
                    streak.current_streak,
                    streak.total_focused_hours,
                    streak.daily_goal,
                    streak.today_focused_minutes,
                    streak.last_focus_date,
                ],
            )
            .map(|_| ())
        })
    }

    async fn save_preferences(
        &self,
        session: &AuthSession,
        prefs: &UserPreferences,
    ) -> Result<(), StoreError> {
        let data = serde_json::to_string(prefs).map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_preferences (user_id, data) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET data = excluded.data",
                params![session.user_id, data],
            )
            .map(|_| ())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (Database, AuthSession) {
        let db = Database::open_memory().unwrap();
        db.upsert_profile("u1", "a@example.com", "Ada").unwrap();
        let token = db.create_session("u1").unwrap();
        (
            db,
            AuthSession {
                access_token: token,
                user_id: "u1".into(),
            },
        )
    }

    #[tokio::test]
    async fn authenticate_known_and_unknown_token() {
        let (db, session) = seeded();
        let resolved = db.authenticate(&session.access_token).await.unwrap();
        assert_eq!(resolved.user_id, "u1");
        assert!(db.authenticate("nope").await.unwrap_err().is_unauthorized());

        db.revoke_session(&session.access_token).unwrap();
        assert!(db.authenticate(&session.access_token).await.is_err());
    }

    #[tokio::test]
    async fn todos_are_newest_first() {
        let (db, session) = seeded();
        db.insert_todo(&session, &NewTodo::titled("first")).await.unwrap();
        db.insert_todo(&session, &NewTodo::titled("second")).await.unwrap();
        let todos = db.list_todos(&session).await.unwrap();
        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
    }

    #[tokio::test]
    async fn todos_are_scoped_to_user() {
        let (db, session) = seeded();
        db.upsert_profile("u2", "b@example.com", "Bo").unwrap();
        let other = AuthSession {
            access_token: db.create_session("u2").unwrap(),
            user_id: "u2".into(),
        };
        let todo = db.insert_todo(&session, &NewTodo::titled("mine")).await.unwrap();

        assert!(db.list_todos(&other).await.unwrap().is_empty());
        let err = db
            .update_todo(&other, &todo.id, &TodoPatch::completed(true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "todo", .. }));
        assert!(db.delete_todo(&other, &todo.id).await.is_err());
    }

    #[tokio::test]
    async fn patch_leaves_absent_fields() {
        let (db, session) = seeded();
        let todo = db.insert_todo(&session, &NewTodo::titled("write")).await.unwrap();
        let updated = db
            .update_todo(&session, &todo.id, &TodoPatch::completed(true))
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "write");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (db, session) = seeded();
        let todo = db.insert_todo(&session, &NewTodo::titled("gone")).await.unwrap();
        db.delete_todo(&session, &todo.id).await.unwrap();
        assert!(db.list_todos(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_defaults_then_persists() {
        let (db, session) = seeded();
        let profile = db.load_profile(&session).await.unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.streak_data.daily_goal, 4);
        assert_eq!(profile.preferences.blur_intensity, 10);

        let mut streak = profile.streak_data.clone();
        streak.record_focus_complete(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), 25);
        db.save_streak(&session, &streak).await.unwrap();

        let prefs = UserPreferences {
            blur_intensity: 3,
            ..UserPreferences::default()
        };
        db.save_preferences(&session, &prefs).await.unwrap();

        let reloaded = db.load_profile(&session).await.unwrap();
        assert_eq!(reloaded.streak_data, streak);
        assert_eq!(reloaded.preferences.blur_intensity, 3);
    }

    #[test]
    fn open_path_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.db");
        Database::open_path(&path).unwrap();
        assert!(path.exists());
    }
}

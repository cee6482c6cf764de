mod config;
pub mod database;
pub mod service;
mod types;

pub use config::{
    AutoBreakConfig, Config, DisplayConfig, ScheduleConfig, ServerConfig, StorageBackend,
    StorageConfig, WallpaperConfig,
};
pub use database::Database;
pub use service::{task_progress_pct, ProfileService, TodoService};
pub use types::{AuthSession, NewTodo, Todo, TodoPatch};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::{ConfigError, StoreError};
use crate::integrations::SupabaseStore;
use crate::profile::{UserPreferences, UserProfile};
use crate::timer::StreakData;

/// Returns `~/.config/moodelix[-dev]/` based on MOODELIX_ENV.
///
/// Set MOODELIX_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MOODELIX_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("moodelix-dev")
    } else {
        base_dir.join("moodelix")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Persistence backend for todos, streak data and preferences.
///
/// Every todo operation is scoped to the session's user. Implementations
/// do not retry; last write wins.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Short identifier ("supabase", "local").
    fn name(&self) -> &str;

    /// Resolve a bearer token to a session, or `StoreError::Unauthorized`.
    async fn authenticate(&self, access_token: &str) -> Result<AuthSession, StoreError>;

    /// The user's todos, newest first.
    async fn list_todos(&self, session: &AuthSession) -> Result<Vec<Todo>, StoreError>;

    async fn insert_todo(&self, session: &AuthSession, todo: &NewTodo) -> Result<Todo, StoreError>;

    async fn update_todo(
        &self,
        session: &AuthSession,
        id: &str,
        patch: &TodoPatch,
    ) -> Result<Todo, StoreError>;

    async fn delete_todo(&self, session: &AuthSession, id: &str) -> Result<(), StoreError>;

    /// Profile joined with streak data and preferences (defaults when absent).
    async fn load_profile(&self, session: &AuthSession) -> Result<UserProfile, StoreError>;

    async fn save_streak(&self, session: &AuthSession, streak: &StreakData) -> Result<(), StoreError>;

    async fn save_preferences(
        &self,
        session: &AuthSession,
        prefs: &UserPreferences,
    ) -> Result<(), StoreError>;
}

/// Backend opened from the `[storage]` config section.
pub enum ConfiguredStore {
    Local(Arc<Database>),
    Supabase(Arc<SupabaseStore>),
}

impl ConfiguredStore {
    pub fn shared(&self) -> Arc<dyn DashboardStore> {
        match self {
            ConfiguredStore::Local(db) => Arc::clone(db) as Arc<dyn DashboardStore>,
            ConfiguredStore::Supabase(remote) => Arc::clone(remote) as Arc<dyn DashboardStore>,
        }
    }
}

/// Open the backend selected by `storage.backend`.
///
/// # Errors
///
/// Supabase without a URL or anon key fails with
/// [`ConfigError::MissingKey`]. The local database fails with an IO error
/// when its directory cannot be created, or a store error when SQLite
/// cannot open it.
pub fn open_store(cfg: &Config) -> crate::error::Result<ConfiguredStore> {
    match cfg.storage.backend {
        StorageBackend::Supabase => {
            if cfg.storage.supabase_url.is_empty() {
                return Err(ConfigError::MissingKey("storage.supabase_url".into()).into());
            }
            if cfg.storage.supabase_anon_key.is_empty() {
                return Err(ConfigError::MissingKey("storage.supabase_anon_key".into()).into());
            }
            Ok(ConfiguredStore::Supabase(Arc::new(SupabaseStore::new(
                &cfg.storage.supabase_url,
                &cfg.storage.supabase_anon_key,
            ))))
        }
        StorageBackend::Local => {
            let path = cfg.sqlite_path()?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let db = Database::open_path(&path)?;
            info!(path = %path.display(), "opened local database");
            Ok(ConfiguredStore::Local(Arc::new(db)))
        }
    }
}

pub mod config;
pub mod focus;
pub mod media;
pub mod sounds;
pub mod streak;
pub mod todo;
pub mod wallpaper;

use std::error::Error;
use std::sync::Arc;

use moodelix_core::storage::{open_store, ConfiguredStore};
use moodelix_core::{Config, DashboardStore};
use tracing::{info, warn};

/// Profile the CLI signs in as against the local store.
const LOCAL_USER_ID: &str = "local";

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Current-thread runtime for the async store calls.
pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Config file plus environment overrides.
pub fn load_config() -> CliResult<Config> {
    let mut cfg = Config::load()?;
    cfg.apply_env();
    Ok(cfg)
}

/// A store and the token the CLI presents to it.
pub struct Backend {
    pub store: Arc<dyn DashboardStore>,
    pub token: Option<String>,
}

/// Open the configured backend.
///
/// The local backend signs in as a single local profile; its session token
/// is minted on first use and written back to the config file.
pub async fn open_backend(cfg: &mut Config) -> CliResult<Backend> {
    match open_store(cfg)? {
        ConfiguredStore::Supabase(remote) => {
            let token = Some(cfg.storage.access_token.clone()).filter(|t| !t.is_empty());
            if token.is_none() {
                warn!("storage.access_token is empty; remote calls will be skipped");
            }
            Ok(Backend {
                store: remote,
                token,
            })
        }
        ConfiguredStore::Local(db) => {
            let known = !cfg.storage.access_token.is_empty()
                && db.authenticate(&cfg.storage.access_token).await.is_ok();
            if !known {
                db.upsert_profile(LOCAL_USER_ID, "local@moodelix.invalid", "Local")?;
                cfg.storage.access_token = db.create_session(LOCAL_USER_ID)?;
                cfg.save()?;
                info!("created local session");
            }

            Ok(Backend {
                store: db,
                token: Some(cfg.storage.access_token.clone()),
            })
        }
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

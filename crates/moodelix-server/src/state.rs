use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use moodelix_core::storage::open_store;
use moodelix_core::{Config, DashboardStore, WallpaperResolver};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DashboardStore>,
    pub resolver: Arc<WallpaperResolver>,
    pub sounds_dir: PathBuf,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DashboardStore>,
        resolver: WallpaperResolver,
        sounds_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            resolver: Arc::new(resolver),
            sounds_dir,
        }
    }

    /// Open the configured backend and wallpaper signer.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let store = open_store(cfg)
            .context("opening storage backend")?
            .shared();

        let resolver = WallpaperResolver::from_config(&cfg.wallpaper);
        info!(
            store = store.name(),
            presign = resolver.has_presigner(),
            "backends ready"
        );
        Ok(Self::new(store, resolver, cfg.server.sounds_dir.clone()))
    }
}

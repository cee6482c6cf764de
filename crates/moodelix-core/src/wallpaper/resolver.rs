//! Storage key to playable URL resolution.
//!
//! Order: cache, presigned URL, public bucket URL, local static path,
//! raw key. Passthrough, signed and public URLs are cached for the
//! resolver's lifetime; local and raw fallbacks are not, so a key whose
//! signing failed is retried on the next resolve.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::WallpaperItem;
use crate::error::WallpaperError;
use crate::integrations::{RemotePresigner, S3Presigner};
use crate::storage::WallpaperConfig;

const LIVE_PREFIX: &str = "live-wallpapers/";
const PHOTO_PREFIX: &str = "photo-wallpaper/";
const LIVE_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".mov"];

/// Turns an object key into a time-limited URL.
#[async_trait]
pub trait Presigner: Send + Sync {
    async fn presign(&self, key: &str) -> Result<String, WallpaperError>;
}

/// Local static path for a key, if it follows the bucket layout.
pub fn local_path_for(key: &str) -> Option<String> {
    if let Some(file) = key.strip_prefix(LIVE_PREFIX) {
        Some(format!("/wallpaper/live wallpapers/{file}"))
    } else {
        key.strip_prefix(PHOTO_PREFIX)
            .map(|file| format!("/wallpaper/photo wallpaper/{file}"))
    }
}

/// Whether the key names a video wallpaper.
pub fn is_live_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    LIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[derive(Default)]
pub struct WallpaperResolver {
    presigner: Option<Arc<dyn Presigner>>,
    public_base_url: Option<String>,
    cache: HashMap<String, String>,
}

impl WallpaperResolver {
    pub fn new(presigner: Option<Arc<dyn Presigner>>, public_base_url: Option<String>) -> Self {
        Self {
            presigner,
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
            cache: HashMap::new(),
        }
    }

    /// Local S3 signing when credentials are present, otherwise a remote
    /// signing endpoint, otherwise none.
    pub fn from_config(cfg: &WallpaperConfig) -> Self {
        let presigner: Option<Arc<dyn Presigner>> = match S3Presigner::from_config(cfg) {
            Some(s3) => Some(Arc::new(s3) as Arc<dyn Presigner>),
            None => cfg
                .presign_endpoint
                .as_deref()
                .map(|ep| Arc::new(RemotePresigner::new(ep)) as Arc<dyn Presigner>),
        };
        Self::new(presigner, cfg.public_base_url.clone())
    }

    pub fn has_presigner(&self) -> bool {
        self.presigner.is_some()
    }

    pub fn cached(&self, key: &str) -> Option<&str> {
        self.cache.get(key).map(String::as_str)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolve `key` to something a `<video>`/`<img>` can load. Never fails;
    /// the raw key is the last resort.
    pub async fn resolve(&mut self, key: &str) -> String {
        if let Some(url) = self.cache.get(key) {
            debug!(key, "wallpaper url cache hit");
            return url.clone();
        }

        let (url, durable) = self.lookup_with_source(key).await;
        if durable {
            self.cache.insert(key.to_string(), url.clone());
        }
        url
    }

    /// Run the fallback chain without consulting or filling the cache.
    pub async fn lookup(&self, key: &str) -> String {
        self.lookup_with_source(key).await.0
    }

    // The flag is false for local and raw fallbacks.
    async fn lookup_with_source(&self, key: &str) -> (String, bool) {
        if key.starts_with("https://") || key.starts_with("http://") {
            return (key.to_string(), true);
        }

        if let Some(presigner) = &self.presigner {
            match presigner.presign(key).await {
                Ok(url) => return (url, true),
                Err(e) => warn!(key, error = %e, "presign failed, falling back"),
            }
        }

        if let Some(base) = &self.public_base_url {
            return (format!("{base}/{key}"), true);
        }

        let url = local_path_for(key).unwrap_or_else(|| {
            debug!(key, "no fallback pattern matched, using key as-is");
            key.to_string()
        });
        (url, false)
    }

    /// Warm the cache for the slides around `index`: next, previous and the
    /// one after next.
    pub async fn preload_neighbors(&mut self, items: &[WallpaperItem], index: usize) {
        let n = items.len();
        if n == 0 {
            return;
        }
        let i = index % n;
        for j in [(i + 1) % n, (i + n - 1) % n, (i + 2) % n] {
            self.resolve(items[j].key).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallpaper::live_wallpapers;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPresigner {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingPresigner {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Presigner for CountingPresigner {
        async fn presign(&self, key: &str) -> Result<String, WallpaperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(WallpaperError::Rejected { status: 403 })
            } else {
                Ok(format!("https://signed.example/{key}?sig=1"))
            }
        }
    }

    #[test]
    fn local_paths_follow_prefix() {
        assert_eq!(
            local_path_for("live-wallpapers/rain.mp4").as_deref(),
            Some("/wallpaper/live wallpapers/rain.mp4")
        );
        assert_eq!(
            local_path_for("photo-wallpaper/sky.jpg").as_deref(),
            Some("/wallpaper/photo wallpaper/sky.jpg")
        );
        assert!(local_path_for("misc/sky.jpg").is_none());
    }

    #[test]
    fn live_key_by_extension() {
        assert!(is_live_key("a/b.MP4"));
        assert!(is_live_key("x.webm"));
        assert!(is_live_key("clip.mov"));
        assert!(!is_live_key("photo.jpg"));
    }

    #[tokio::test]
    async fn rejected_presign_falls_back_to_local_path() {
        let presigner = CountingPresigner::new(true);
        let mut resolver = WallpaperResolver::new(Some(presigner.clone() as Arc<dyn Presigner>), None);
        let url = resolver.resolve("live-wallpapers/cyberpunk.mp4").await;
        assert_eq!(url, "/wallpaper/live wallpapers/cyberpunk.mp4");
        assert_eq!(presigner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_is_not_cached_and_signing_is_retried() {
        let presigner = CountingPresigner::new(true);
        let mut resolver = WallpaperResolver::new(Some(presigner.clone() as Arc<dyn Presigner>), None);
        resolver.resolve("live-wallpapers/cyberpunk.mp4").await;
        let again = resolver.resolve("live-wallpapers/cyberpunk.mp4").await;
        assert_eq!(again, "/wallpaper/live wallpapers/cyberpunk.mp4");
        assert_eq!(presigner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cache_len(), 0);
        assert!(resolver.cached("live-wallpapers/cyberpunk.mp4").is_none());
    }

    #[tokio::test]
    async fn second_resolve_hits_cache() {
        let presigner = CountingPresigner::new(false);
        let mut resolver = WallpaperResolver::new(Some(presigner.clone() as Arc<dyn Presigner>), None);
        let first = resolver.resolve("photo-wallpaper/a.jpg").await;
        let second = resolver.resolve("photo-wallpaper/a.jpg").await;
        assert_eq!(first, second);
        assert_eq!(presigner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached("photo-wallpaper/a.jpg"), Some(first.as_str()));
    }

    #[tokio::test]
    async fn public_base_beats_local_path() {
        let mut resolver =
            WallpaperResolver::new(None, Some("https://walls.s3.amazonaws.com/".into()));
        let url = resolver.resolve("photo-wallpaper/a.jpg").await;
        assert_eq!(url, "https://walls.s3.amazonaws.com/photo-wallpaper/a.jpg");
        assert_eq!(resolver.cached("photo-wallpaper/a.jpg"), Some(url.as_str()));
    }

    #[tokio::test]
    async fn unknown_key_is_returned_raw() {
        let mut resolver = WallpaperResolver::default();
        assert_eq!(resolver.resolve("misc/thing.png").await, "misc/thing.png");
        assert_eq!(
            resolver.resolve("https://cdn.example/x.mp4").await,
            "https://cdn.example/x.mp4"
        );
        assert!(resolver.cached("misc/thing.png").is_none());
        assert!(resolver.cached("https://cdn.example/x.mp4").is_some());
    }

    #[tokio::test]
    async fn preload_wraps_around() {
        let presigner = CountingPresigner::new(false);
        let mut resolver = WallpaperResolver::new(Some(presigner.clone() as Arc<dyn Presigner>), None);
        let live = live_wallpapers();
        let n = live.len();
        resolver.preload_neighbors(&live, 0).await;
        assert_eq!(resolver.cache_len(), 3);
        assert_eq!(presigner.calls.load(Ordering::SeqCst), 3);
        assert!(resolver.cached(live[0].key).is_none());
        assert!(resolver.cached(live[n - 1].key).is_some());
        assert!(resolver.cached(live[1].key).is_some());
        assert!(resolver.cached(live[2].key).is_some());
    }

    #[tokio::test]
    async fn preload_on_short_list_signs_each_key_once() {
        let presigner = CountingPresigner::new(false);
        let mut resolver = WallpaperResolver::new(Some(presigner.clone() as Arc<dyn Presigner>), None);
        let live = live_wallpapers();
        // indices 1, 2, 2
        resolver.preload_neighbors(&live[..3], 0).await;
        assert_eq!(resolver.cache_len(), 2);
        assert_eq!(presigner.calls.load(Ordering::SeqCst), 2);
    }
}

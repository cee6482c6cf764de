//! # Moodelix Core Library
//!
//! Business logic for the Moodelix focus dashboard. Both the HTTP server and
//! the CLI are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: focus/break state machine with auto-scheduled
//!   mid-session breaks; the caller drives it with `tick()` once a second
//! - **Storage**: the [`DashboardStore`] seam with a SQLite backend, the
//!   todo/profile services and TOML configuration
//! - **Integrations**: Supabase (PostgREST + GoTrue) and S3 URL signing
//! - **Wallpapers**: static catalog and a caching URL resolver
//! - **Media**: YouTube/Spotify embed URLs and play/pause relay
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: focus timer state machine
//! - [`DashboardStore`]: persistence backend trait
//! - [`WallpaperResolver`]: storage key to playable URL
//! - [`MediaSource`]: parsed music link
//! - [`DashboardState`]: dashboard display state reducer

pub mod dashboard;
pub mod error;
pub mod events;
pub mod integrations;
pub mod media;
pub mod profile;
pub mod sounds;
pub mod storage;
pub mod timer;
pub mod wallpaper;

pub use dashboard::{Action, DashboardState, QuoteTicker};
pub use error::{
    ConfigError, CoreError, MediaParseError, StoreError, ValidationError, WallpaperError,
};
pub use events::Event;
pub use media::{MediaSource, MusicController, PlayerChannel, PlayerCommand};
pub use profile::{UserPreferences, UserProfile, WallpaperBrightness};
pub use storage::{
    AuthSession, Config, DashboardStore, Database, NewTodo, ProfileService, Todo, TodoPatch,
    TodoService,
};
pub use timer::{
    AutoBreakSettings, FocusMode, ScheduledBreak, StreakData, TimerDurations, TimerEngine,
};
pub use wallpaper::{Presigner, WallpaperItem, WallpaperResolver};

//! Background music embeds (YouTube, Spotify).

mod player;
mod source;

pub use player::{MpscPlayerChannel, MusicController, PlayerChannel, PlayerCommand};
pub use source::{MediaSource, Platform, SpotifyKind, DEFAULT_PLAYLIST_ID};

//! Pasted YouTube/Spotify links and their embed URLs.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MediaParseError;

const YOUTUBE_EMBED_PARAMS: &str =
    "autoplay=1&mute=0&controls=1&rel=0&showinfo=1&iv_load_policy=1&vq=medium&preload=auto&buffering=1";

/// Built-in "Lofi Study Music" playlist.
pub const DEFAULT_PLAYLIST_ID: &str = "2Al9G2jrWkwDlRFMZaw1GX";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Spotify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotifyKind {
    Track,
    Playlist,
    Album,
}

impl SpotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotifyKind::Track => "track",
            SpotifyKind::Playlist => "playlist",
            SpotifyKind::Album => "album",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum MediaSource {
    Youtube { id: String },
    Spotify { kind: SpotifyKind, id: String },
}

struct Patterns {
    youtube: [Regex; 2],
    spotify: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("media pattern is a valid regex");
        Patterns {
            youtube: [
                re(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([a-zA-Z0-9_-]{11})"),
                re(r"youtube\.com/live/([a-zA-Z0-9_-]{11})"),
            ],
            spotify: re(r"spotify\.com/(track|playlist|album)/([a-zA-Z0-9]+)"),
        }
    })
}

impl MediaSource {
    /// Recognise a YouTube or Spotify link. YouTube is tried first.
    pub fn parse(url: &str) -> Result<Self, MediaParseError> {
        let url = url.trim();
        let p = patterns();

        for re in &p.youtube {
            if let Some(caps) = re.captures(url) {
                return Ok(MediaSource::Youtube {
                    id: caps[1].to_string(),
                });
            }
        }

        if let Some(caps) = p.spotify.captures(url) {
            let kind = match &caps[1] {
                "playlist" => SpotifyKind::Playlist,
                "album" => SpotifyKind::Album,
                _ => SpotifyKind::Track,
            };
            return Ok(MediaSource::Spotify {
                kind,
                id: caps[2].to_string(),
            });
        }

        Err(MediaParseError {
            url: url.to_string(),
        })
    }

    pub fn default_playlist() -> Self {
        MediaSource::Spotify {
            kind: SpotifyKind::Playlist,
            id: DEFAULT_PLAYLIST_ID.to_string(),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            MediaSource::Youtube { .. } => Platform::Youtube,
            MediaSource::Spotify { .. } => Platform::Spotify,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            MediaSource::Youtube { id } | MediaSource::Spotify { id, .. } => id,
        }
    }

    pub fn embed_url(&self) -> String {
        match self {
            MediaSource::Youtube { id } => {
                format!("https://www.youtube.com/embed/{id}?{YOUTUBE_EMBED_PARAMS}")
            }
            MediaSource::Spotify { kind, id } => format!(
                "https://open.spotify.com/embed/{}/{id}?utm_source=generator",
                kind.as_str()
            ),
        }
    }

    pub fn display_title(&self) -> &'static str {
        match self {
            MediaSource::Youtube { .. } => "YouTube Video",
            MediaSource::Spotify { id, .. } if id == DEFAULT_PLAYLIST_ID => "Lofi Study Music",
            MediaSource::Spotify { .. } => "Spotify Music",
        }
    }
}

impl std::str::FromStr for MediaSource {
    type Err = MediaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_variants_share_id() {
        for url in [
            "https://www.youtube.com/watch?v=jfKfPfyJRdk",
            "https://youtu.be/jfKfPfyJRdk?t=10",
            "https://www.youtube.com/embed/jfKfPfyJRdk",
            "https://www.youtube.com/v/jfKfPfyJRdk",
            "https://www.youtube.com/live/jfKfPfyJRdk?si=abc",
        ] {
            assert_eq!(
                MediaSource::parse(url).unwrap(),
                MediaSource::Youtube {
                    id: "jfKfPfyJRdk".into()
                },
                "{url}"
            );
        }
    }

    #[test]
    fn spotify_kinds() {
        let src = MediaSource::parse("https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy").unwrap();
        assert_eq!(
            src,
            MediaSource::Spotify {
                kind: SpotifyKind::Album,
                id: "4aawyAB9vmqN3uQ7FjRGTy".into()
            }
        );
        assert_eq!(
            src.embed_url(),
            "https://open.spotify.com/embed/album/4aawyAB9vmqN3uQ7FjRGTy?utm_source=generator"
        );
        assert_eq!(src.display_title(), "Spotify Music");
    }

    #[test]
    fn youtube_embed_url() {
        let src = MediaSource::parse("https://youtu.be/jfKfPfyJRdk").unwrap();
        assert_eq!(
            src.embed_url(),
            "https://www.youtube.com/embed/jfKfPfyJRdk?autoplay=1&mute=0&controls=1&rel=0&showinfo=1&iv_load_policy=1&vq=medium&preload=auto&buffering=1"
        );
        assert_eq!(src.display_title(), "YouTube Video");
    }

    #[test]
    fn rejects_other_links() {
        for url in ["", "https://vimeo.com/123", "https://youtu.be/short", "not a url"] {
            assert!(MediaSource::parse(url).is_err(), "{url}");
        }
    }

    #[test]
    fn default_playlist_title() {
        let src = MediaSource::default_playlist();
        assert_eq!(src.display_title(), "Lofi Study Music");
        assert_eq!(src.platform(), Platform::Spotify);
    }
}

//! Fire-and-forget play/pause relay to an embedded player.
//!
//! The embed iframe is the source of truth for playback. Commands are
//! posted without acknowledgement; if nobody is listening they are
//! dropped.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use super::{MediaSource, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
}

impl PlayerCommand {
    /// Function name understood by the platform's embed API.
    pub fn func(&self, platform: Platform) -> &'static str {
        match (platform, self) {
            (Platform::Youtube, PlayerCommand::Play) => "playVideo",
            (Platform::Youtube, PlayerCommand::Pause) => "pauseVideo",
            (Platform::Spotify, PlayerCommand::Play) => "resume",
            (Platform::Spotify, PlayerCommand::Pause) => "pause",
        }
    }

    /// `postMessage` body for the iframe.
    pub fn payload(&self, platform: Platform) -> String {
        json!({ "event": "command", "func": self.func(platform) }).to_string()
    }
}

/// Transport to the embedded player.
pub trait PlayerChannel: Send + Sync {
    /// Post `message`; returns immediately.
    fn send(&self, message: String);
}

/// Unbounded in-process channel; commands are dropped once the receiver
/// is gone.
#[derive(Clone)]
pub struct MpscPlayerChannel {
    tx: mpsc::UnboundedSender<String>,
}

impl MpscPlayerChannel {
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PlayerChannel for MpscPlayerChannel {
    fn send(&self, message: String) {
        if self.tx.send(message).is_err() {
            debug!("player channel closed, command dropped");
        }
    }
}

/// Current track and play state for the music panel.
pub struct MusicController<C: PlayerChannel> {
    channel: C,
    current: Option<MediaSource>,
    playing: bool,
}

impl<C: PlayerChannel> MusicController<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            current: None,
            playing: false,
        }
    }

    pub fn current(&self) -> Option<&MediaSource> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Load a new source. The embed autoplays, so no command is sent.
    pub fn play(&mut self, source: MediaSource) -> String {
        let url = source.embed_url();
        self.current = Some(source);
        self.playing = true;
        url
    }

    pub fn stop(&mut self) {
        self.current = None;
        self.playing = false;
    }

    /// Relay play/pause to the loaded player. No-op without a source.
    pub fn set_playing(&mut self, playing: bool) {
        let Some(source) = &self.current else {
            return;
        };
        self.playing = playing;
        let cmd = if playing {
            PlayerCommand::Play
        } else {
            PlayerCommand::Pause
        };
        self.channel.send(cmd.payload(source.platform()));
    }

    pub fn toggle(&mut self) {
        self.set_playing(!self.playing);
    }
}

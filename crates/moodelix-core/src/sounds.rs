//! UI sound effects discovered from a directory of audio files.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];
pub const DEFAULT_VOLUME: f32 = 0.3;

/// Public URLs (`/sounds/<file>`) of the audio files in `dir`, sorted.
/// A missing or unreadable directory yields an empty list.
pub fn scan_sounds(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "sounds folder not found or empty");
            return Vec::new();
        }
    };

    let mut sounds: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_audio_file(name))
        .map(|name| format!("/sounds/{name}"))
        .collect();
    sounds.sort();
    sounds
}

fn is_audio_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundRole {
    Click,
    Click2,
    Exit,
    Toggle,
}

/// Which file plays for which UI action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SoundSet {
    pub click: Option<String>,
    pub click2: Option<String>,
    pub exit: Option<String>,
    pub toggle: Option<String>,
}

impl SoundSet {
    /// Assign roles by file name; the first match wins.
    pub fn from_files(files: &[String]) -> Self {
        let find = |pred: &dyn Fn(&str) -> bool| files.iter().find(|f| pred(f)).cloned();
        Self {
            click: find(&|f| f.contains("click") && !f.contains("click 2")),
            click2: find(&|f| f.contains("click 2")),
            exit: find(&|f| f.contains("exit")),
            toggle: find(&|f| f.contains("toggle")),
        }
    }

    pub fn get(&self, role: SoundRole) -> Option<&str> {
        match role {
            SoundRole::Click => self.click.as_deref(),
            SoundRole::Click2 => self.click2.as_deref(),
            SoundRole::Exit => self.exit.as_deref(),
            SoundRole::Toggle => self.toggle.as_deref(),
        }
    }
}

/// Picks the sound for each action. Returns the URL to play, if any.
#[derive(Debug, Clone)]
pub struct SoundBoard {
    set: SoundSet,
    enabled: bool,
    volume: f32,
    alternate: bool,
}

impl SoundBoard {
    pub fn new(set: SoundSet, enabled: bool) -> Self {
        Self {
            set,
            enabled,
            volume: DEFAULT_VOLUME,
            alternate: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    fn play(&self, role: SoundRole) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.set.get(role)
    }

    /// Alternates between the two click sounds. The alternation only
    /// advances when a sound actually played.
    pub fn click(&mut self) -> Option<String> {
        let role = if self.alternate {
            SoundRole::Click2
        } else {
            SoundRole::Click
        };
        let url = self.play(role)?.to_string();
        self.alternate = !self.alternate;
        Some(url)
    }

    pub fn exit(&self) -> Option<&str> {
        self.play(SoundRole::Exit)
    }

    pub fn toggle(&self) -> Option<&str> {
        self.play(SoundRole::Toggle)
    }
}

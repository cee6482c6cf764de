use clap::Subcommand;
use moodelix_core::media::{MpscPlayerChannel, PlayerCommand};
use moodelix_core::{MediaSource, MusicController};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum MediaAction {
    /// Parse a YouTube or Spotify link into its embed URL
    Parse {
        url: String,
    },
    /// Show the default study playlist
    Default,
    /// Load a link and print the player commands a play/pause cycle sends
    Play {
        url: String,
    },
}

fn describe(source: &MediaSource) -> serde_json::Value {
    let platform = source.platform();
    serde_json::json!({
        "source": source,
        "title": source.display_title(),
        "embed_url": source.embed_url(),
        "play_command": PlayerCommand::Play.payload(platform),
        "pause_command": PlayerCommand::Pause.payload(platform),
    })
}

pub fn run(action: MediaAction) -> CliResult {
    match action {
        MediaAction::Parse { url } => {
            let source = MediaSource::parse(&url)?;
            print_json(&describe(&source))?;
        }
        MediaAction::Default => {
            print_json(&describe(&MediaSource::default_playlist()))?;
        }
        MediaAction::Play { url } => {
            let source = MediaSource::parse(&url)?;
            let (channel, mut rx) = MpscPlayerChannel::unbounded();
            let mut player = MusicController::new(channel);

            let embed_url = player.play(source);
            player.toggle();
            player.toggle();
            drop(player);

            let mut sent = Vec::new();
            while let Ok(message) = rx.try_recv() {
                sent.push(message);
            }
            print_json(&serde_json::json!({ "embed_url": embed_url, "sent": sent }))?;
        }
    }
    Ok(())
}

use std::path::PathBuf;

use clap::Subcommand;
use moodelix_core::sounds::{scan_sounds, SoundSet};

use super::{load_config, print_json, CliResult};

#[derive(Subcommand)]
pub enum SoundsAction {
    /// List audio files and the UI role each one plays
    Scan {
        /// Sounds directory; defaults to server.sounds_dir
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

pub fn run(action: SoundsAction) -> CliResult {
    match action {
        SoundsAction::Scan { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => load_config()?.server.sounds_dir,
            };
            let sounds = scan_sounds(&dir);
            let roles = SoundSet::from_files(&sounds);
            print_json(&serde_json::json!({
                "count": sounds.len(),
                "sounds": sounds,
                "roles": roles,
            }))?;
        }
    }
    Ok(())
}

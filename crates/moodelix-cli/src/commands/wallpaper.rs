use clap::Subcommand;
use moodelix_core::wallpaper::{self, Category, WallpaperResolver};
use moodelix_core::WallpaperError;

use super::{load_config, print_json, runtime, CliResult};

#[derive(Subcommand)]
pub enum WallpaperAction {
    /// List the built-in wallpapers
    List {
        /// live or photo
        #[arg(long)]
        category: Option<Category>,
    },
    /// Resolve a storage key to a playable URL
    Resolve {
        /// Storage key, e.g. live-wallpapers/cyberpunk.mp4
        key: String,
    },
    /// Pick a wallpaper at random and resolve it
    Random {
        /// live or photo
        #[arg(long)]
        category: Option<Category>,
    },
}

pub fn run(action: WallpaperAction) -> CliResult {
    match action {
        WallpaperAction::List { category } => {
            let items = match category {
                Some(c) => wallpaper::by_category(c),
                None => wallpaper::catalog().to_vec(),
            };
            print_json(&items)?;
        }
        WallpaperAction::Resolve { key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err(WallpaperError::EmptyKey.into());
            }
            let resolver = WallpaperResolver::from_config(&load_config()?.wallpaper);
            let url = runtime()?.block_on(resolver.lookup(key));
            println!("{url}");
        }
        WallpaperAction::Random { category } => {
            let item = wallpaper::random(category).ok_or("wallpaper catalog is empty")?;
            let resolver = WallpaperResolver::from_config(&load_config()?.wallpaper);
            let url = runtime()?.block_on(resolver.lookup(item.key));
            print_json(&serde_json::json!({ "wallpaper": item, "resolved_url": url }))?;
        }
    }
    Ok(())
}

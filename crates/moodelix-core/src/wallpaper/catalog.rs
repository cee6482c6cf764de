//! Built-in wallpaper catalog.

use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Live,
    Photo,
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Category::Live),
            "photo" | "photos" => Ok(Category::Photo),
            other => Err(format!("unknown wallpaper category '{other}' (live|photo)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WallpaperItem {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Storage key, resolved to a playable URL on demand.
    #[serde(rename = "url")]
    pub key: &'static str,
    /// Storage key of the preview shown in the picker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<&'static str>,
    pub category: Category,
}

// Every bucket object doubles as its own preview.
const fn live(id: &'static str, name: &'static str, key: &'static str) -> WallpaperItem {
    WallpaperItem {
        id,
        name,
        kind: MediaKind::Video,
        key,
        thumbnail: Some(key),
        category: Category::Live,
    }
}

const fn photo(id: &'static str, name: &'static str, key: &'static str) -> WallpaperItem {
    WallpaperItem {
        id,
        name,
        kind: MediaKind::Image,
        key,
        thumbnail: Some(key),
        category: Category::Photo,
    }
}

static CATALOG: [WallpaperItem; 22] = [
    live("1", "Grand Theft Auto VI", "live-wallpapers/grand-theft-auto-vi.mp4"),
    live(
        "2",
        "Minecraft Autumn Mountains",
        "live-wallpapers/minecraft-autumn-mountains.mp4",
    ),
    live("3", "Cyberpunk", "live-wallpapers/cyberpunk.mp4"),
    live(
        "4",
        "Lilac Field at Night",
        "live-wallpapers/lilac-field-at-night-minecraft.mp4",
    ),
    live(
        "5",
        "Scarlet Rock Shrine",
        "live-wallpapers/scarlet-rock-shrine-ghost-of-tsushima.mp4",
    ),
    live("6", "Cartethiya", "live-wallpapers/cartethiya.mp4"),
    live(
        "7",
        "Ferrari Testarossa",
        "live-wallpapers/ferrari-testarossa-highway-cruise.mp4",
    ),
    live(
        "8",
        "Sunset Drive Synthwave",
        "live-wallpapers/sunset-drive-synthwave.mp4",
    ),
    live("9", "Synthwave Cyberpunk", "live-wallpapers/synthwave-cyberpunk.mp4"),
    live(
        "10",
        "Purrple Cat Picnic",
        "live-wallpapers/purrple-cat-picnic-universe.mp4",
    ),
    live("11", "Black Hole", "live-wallpapers/black-hole.mp4"),
    live("12", "Void Hole", "live-wallpapers/void-hole.mp4"),
    live(
        "13",
        "Ghost Ready for Battle",
        "live-wallpapers/ghost-ready-for-battle.mp4",
    ),
    live("14", "Asuka Evangelion", "live-wallpapers/asuka-x-evangelion.mp4"),
    live("15", "Toyota AE86 Trueno", "live-wallpapers/toyota-ae86-trueno.mp4"),
    // Only photos under ~2 MB are listed.
    photo("16", "Photo 1", "photo-wallpaper/1 (1).jpg"),
    photo("17", "Photo 2", "photo-wallpaper/1 (18).jpg"),
    photo("18", "Photo 3", "photo-wallpaper/1 (21).jpg"),
    photo("19", "Photo 4", "photo-wallpaper/1 (29).jpg"),
    photo("20", "Photo 5", "photo-wallpaper/1 (33).jpg"),
    photo("21", "Photo 6", "photo-wallpaper/1 (5).jpg"),
    photo("22", "Photo 7", "photo-wallpaper/1 (7).jpg"),
];

pub fn catalog() -> &'static [WallpaperItem] {
    &CATALOG
}

pub fn by_category(category: Category) -> Vec<WallpaperItem> {
    CATALOG
        .iter()
        .filter(|w| w.category == category)
        .copied()
        .collect()
}

pub fn live_wallpapers() -> Vec<WallpaperItem> {
    by_category(Category::Live)
}

pub fn photo_wallpapers() -> Vec<WallpaperItem> {
    by_category(Category::Photo)
}

/// Uniform pick, optionally within one category.
pub fn random(category: Option<Category>) -> Option<WallpaperItem> {
    let pool = match category {
        Some(c) => by_category(c),
        None => CATALOG.to_vec(),
    };
    pool.choose(&mut rand::thread_rng()).copied()
}

pub fn find_by_key(key: &str) -> Option<WallpaperItem> {
    CATALOG.iter().find(|w| w.key == key).copied()
}

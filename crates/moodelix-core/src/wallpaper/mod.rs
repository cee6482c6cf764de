//! Wallpaper catalog and URL resolution.

mod catalog;
mod resolver;

pub use catalog::{
    by_category, catalog, find_by_key, live_wallpapers, photo_wallpapers, random, Category,
    MediaKind, WallpaperItem,
};
pub use resolver::{is_live_key, local_path_for, Presigner, WallpaperResolver};

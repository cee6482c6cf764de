//! Dashboard display state as a value with a reducer.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::QuoteTicker;
use crate::profile::{UserPreferences, WallpaperBrightness, MAX_BLUR_INTENSITY};
use crate::wallpaper::Category;

pub const MIN_SLIDESHOW_SECS: u32 = 5;
pub const MAX_SLIDESHOW_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    SpaceGrotesk,
    Handwriting,
    Inter,
    Poppins,
    Roboto,
    Cinzel,
    Playfair,
    Merriweather,
    Lora,
    Crimson,
    SourceSerif,
    LibreBaskerville,
    Vollkorn,
    BreeSerif,
    JosefinSans,
    Quicksand,
    Comfortaa,
    Fredoka,
    Nunito,
    Montserrat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Title,
    BottomMenu,
    Slideshow,
    Todo,
    Focus,
    Music,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub title: bool,
    pub bottom_menu: bool,
    pub slideshow: bool,
    pub todo: bool,
    pub focus: bool,
    pub music: bool,
    pub settings: bool,
    /// Hides everything except the background and the restore button.
    pub hide_everything: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            title: true,
            bottom_menu: true,
            slideshow: true,
            todo: false,
            focus: false,
            music: false,
            settings: false,
            hide_everything: false,
        }
    }
}

impl Visibility {
    fn flag(&mut self, panel: Panel) -> &mut bool {
        match panel {
            Panel::Title => &mut self.title,
            Panel::BottomMenu => &mut self.bottom_menu,
            Panel::Slideshow => &mut self.slideshow,
            Panel::Todo => &mut self.todo,
            Panel::Focus => &mut self.focus,
            Panel::Music => &mut self.music,
            Panel::Settings => &mut self.settings,
        }
    }

    pub fn is_shown(&self, panel: Panel) -> bool {
        if self.hide_everything {
            return false;
        }
        match panel {
            Panel::Title => self.title,
            Panel::BottomMenu => self.bottom_menu,
            Panel::Slideshow => self.slideshow,
            Panel::Todo => self.todo,
            Panel::Focus => self.focus,
            Panel::Music => self.music,
            Panel::Settings => self.settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slideshow {
    pub enabled: bool,
    pub randomized: bool,
    pub speed_secs: u32,
}

impl Default for Slideshow {
    fn default() -> Self {
        Self {
            enabled: false,
            randomized: true,
            speed_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub font: FontFamily,
    pub logo_size: ElementSize,
    pub quote_size: ElementSize,
    pub button_size: ElementSize,
    pub blur_intensity: u32,
    pub brightness: WallpaperBrightness,
    pub slideshow: Slideshow,
    pub visibility: Visibility,
    pub wallpaper_category: Category,
    /// Position in the live catalog; `None` when a photo or a wallpaper
    /// outside the slideshow is showing.
    pub wallpaper_index: Option<usize>,
    pub volume: f32,
    pub muted: bool,
    pub quotes: QuoteTicker,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            font: FontFamily::SpaceGrotesk,
            logo_size: ElementSize::Large,
            quote_size: ElementSize::Large,
            button_size: ElementSize::Medium,
            blur_intensity: 10,
            brightness: WallpaperBrightness::Normal,
            slideshow: Slideshow::default(),
            visibility: Visibility::default(),
            wallpaper_category: Category::Live,
            wallpaper_index: Some(0),
            volume: 0.7,
            muted: false,
            quotes: QuoteTicker::new(),
        }
    }
}

/// One user interaction (or clock tick) on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFont(FontFamily),
    SetLogoSize(ElementSize),
    SetQuoteSize(ElementSize),
    SetButtonSize(ElementSize),
    SetBlur(u32),
    SetBrightness(WallpaperBrightness),
    ToggleSlideshow,
    SetSlideshowRandomized(bool),
    SetSlideshowSpeed(u32),
    TogglePanel(Panel),
    ToggleHideEverything,
    SelectWallpaper {
        category: Category,
        index: Option<usize>,
    },
    ShowSlide(usize),
    SetVolume(f32),
    ToggleMute,
    Tick(Duration),
}

impl DashboardState {
    /// Initial state with the signed-in user's saved display preferences.
    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        Self {
            blur_intensity: prefs.blur_intensity.min(MAX_BLUR_INTENSITY),
            brightness: prefs.wallpaper_brightness,
            ..Self::default()
        }
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SetFont(font) => self.font = font,
            Action::SetLogoSize(size) => self.logo_size = size,
            Action::SetQuoteSize(size) => self.quote_size = size,
            Action::SetButtonSize(size) => self.button_size = size,
            Action::SetBlur(blur) => self.blur_intensity = blur.min(MAX_BLUR_INTENSITY),
            Action::SetBrightness(b) => self.brightness = b,
            Action::ToggleSlideshow => self.slideshow.enabled = !self.slideshow.enabled,
            Action::SetSlideshowRandomized(r) => self.slideshow.randomized = r,
            Action::SetSlideshowSpeed(secs) => {
                self.slideshow.speed_secs = secs.clamp(MIN_SLIDESHOW_SECS, MAX_SLIDESHOW_SECS)
            }
            Action::TogglePanel(panel) => {
                let flag = self.visibility.flag(panel);
                *flag = !*flag;
            }
            Action::ToggleHideEverything => {
                self.visibility.hide_everything = !self.visibility.hide_everything
            }
            Action::SelectWallpaper { category, index } => {
                self.wallpaper_category = category;
                self.wallpaper_index = match category {
                    Category::Live => index,
                    Category::Photo => None,
                };
            }
            Action::ShowSlide(index) => {
                self.wallpaper_category = Category::Live;
                self.wallpaper_index = Some(index);
            }
            Action::SetVolume(v) => {
                self.volume = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
            }
            Action::ToggleMute => self.muted = !self.muted,
            Action::Tick(dt) => self.quotes.advance(dt),
        }
        self
    }

    /// Effective playback volume.
    pub fn output_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

/// Next slideshow position among `len` live wallpapers. Random order never
/// repeats the current slide when there is more than one.
pub fn next_slide<R: Rng + ?Sized>(
    current: Option<usize>,
    len: usize,
    randomized: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if !randomized {
        return Some(current.map_or(0, |i| (i + 1) % len));
    }
    if len == 1 {
        return Some(0);
    }
    loop {
        let candidate = rng.gen_range(0..len);
        if Some(candidate) != current {
            return Some(candidate);
        }
    }
}

//! Dashboard view state: display settings, panel visibility, slideshow
//! position and the rotating quote.

mod quotes;
mod state;

pub use quotes::{QuoteTicker, QUOTES, QUOTE_ROTATION, TYPEWRITER_STEP};
pub use state::{
    next_slide, Action, DashboardState, ElementSize, FontFamily, Panel, Slideshow, Visibility,
    MAX_SLIDESHOW_SECS, MIN_SLIDESHOW_SECS,
};

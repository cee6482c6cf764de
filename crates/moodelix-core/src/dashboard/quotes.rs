use std::time::Duration;

pub const QUOTES: [&str; 5] = [
    "Small steps every day.",
    "Focus is a skill. Practice it.",
    "You become what you repeat.",
    "Deep work beats shallow busyness.",
    "Consistency compounds.",
];

pub const QUOTE_ROTATION: Duration = Duration::from_secs(8);
pub const TYPEWRITER_STEP: Duration = Duration::from_millis(60);

/// Rotating quote with a typewriter reveal, driven by elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteTicker {
    elapsed: Duration,
}

impl QuoteTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }

    pub fn index(&self) -> usize {
        let rotations = self.elapsed.as_millis() / QUOTE_ROTATION.as_millis();
        (rotations % QUOTES.len() as u128) as usize
    }

    pub fn quote(&self) -> &'static str {
        QUOTES[self.index()]
    }

    /// Prefix of the current quote revealed so far.
    pub fn typed(&self) -> &'static str {
        let quote = self.quote();
        let into_quote = self.elapsed.as_millis() % QUOTE_ROTATION.as_millis();
        let chars = (into_quote / TYPEWRITER_STEP.as_millis()) as usize;
        match quote.char_indices().nth(chars) {
            Some((byte, _)) => &quote[..byte],
            None => quote,
        }
    }

    pub fn is_fully_typed(&self) -> bool {
        self.typed().len() == self.quote().len()
    }
}

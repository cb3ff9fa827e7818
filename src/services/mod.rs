//! External collaborators consumed by the bot: intent recognition, text
//! correction, and the hotel result store. Each sits behind a trait; the
//! implementations here are local stand-ins.

pub mod corrector;
pub mod nlu;
pub mod store;

pub use corrector::{DictionaryCorrector, TextCorrector};
pub use nlu::{KeywordRecognizer, NluClient};
pub use store::{HotelStore, SampleHotelStore};

/// Split text into word tokens with their byte offsets.
///
/// Letters, digits, apostrophes and hyphens form words; everything else
/// separates them.
pub(crate) fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() || c == '\'' || c == '-' {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            out.push((s, &text[s..i]));
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }

    out
}

//! Report decoding pipeline.
//!
//! A [`RecordDecoder`] holds an ordered list of [`SentenceLayout`]s. Each
//! inbound line is offered to the layouts in registration order and the
//! first one to accept it produces the record. The stock layout understands
//! the vendor GPRMC dialect; additional dialects slot in through
//! [`RecordDecoder::register`] without touching dispatch.

pub mod checksum;
pub mod geo;
mod gprmc;

pub use gprmc::GprmcLayout;

use crate::types::TrackRecord;

/// A recognizer for one report dialect.
pub trait SentenceLayout: Send + Sync {

    /// Attempt to decode one raw report line.
    ///
    /// Returns `None` when the line does not belong to this dialect.
    /// Implementations must not panic on arbitrary input; a line that cannot
    /// be decoded is declined, not an error.
    fn try_decode(&self, raw: &str) -> Option<TrackRecord>;
}

/// Ordered collection of report layouts.
pub struct RecordDecoder {
    layouts: Vec<Box<dyn SentenceLayout>>,
}
impl RecordDecoder {
    /// Create a decoder recognizing the stock GPRMC dialect.
    pub fn new() -> Self {
        Self {
            layouts: vec![Box::new(GprmcLayout)],
        }
    }

    /// Append a layout, consulted after all previously registered ones.
    pub fn register(&mut self, layout: impl SentenceLayout + 'static) {
        self.layouts.push(Box::new(layout));
    }

    /// Decode one raw line.
    ///
    /// Layouts are tried in registration order and the first acceptance
    /// wins. `None` means no layout recognized the line.
    pub fn decode(&self, raw: &str) -> Option<TrackRecord> {
        self.layouts.iter().find_map(|layout| layout.try_decode(raw))
    }
}
impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the leading integer of a field: surrounding whitespace and anything
/// after the first run of digits is ignored, an optional sign is honored.
/// Fields without a leading digit read as `None`.
pub(crate) fn leading_int(field: &str) -> Option<i64> {
    let trimmed = field.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

//! Adaptive summary length derivation.

use serde::Serialize;

/// Lower bound of `max_length`.
pub const MAX_LENGTH_FLOOR: usize = 20;
/// Upper bound of `max_length`.
pub const MAX_LENGTH_CEILING: usize = 150;
/// Lower bound of `min_length`.
pub const MIN_LENGTH_FLOOR: usize = 10;

const MAX_LENGTH_RATIO: f64 = 0.6;
const MIN_LENGTH_RATIO: f64 = 0.3;

/// Summary length bounds scaled to the input size.
///
/// Always satisfies `20 <= max_length <= 150`, `min_length >= 10` and
/// `min_length < max_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryParams {
    pub word_count: usize,
    pub max_length: usize,
    pub min_length: usize,
}

impl SummaryParams {
    /// Derive the bounds for a text.
    pub fn for_text(text: &str) -> Self {
        Self::derive(word_count(text))
    }

    /// Derive the bounds from a word count. Counts below one are treated as one.
    ///
    /// Halfway products round to the even neighbour, so `35 * 0.3` gives 10.
    pub fn derive(word_count: usize) -> Self {
        let word_count = word_count.max(1);
        let max_length = ((word_count as f64 * MAX_LENGTH_RATIO).round_ties_even() as usize)
            .clamp(MAX_LENGTH_FLOOR, MAX_LENGTH_CEILING);
        let min_length = ((max_length as f64 * MIN_LENGTH_RATIO).round_ties_even() as usize)
            .max(MIN_LENGTH_FLOOR);
        Self {
            word_count,
            max_length,
            min_length,
        }
    }
}

/// Whitespace-delimited token count, at least one.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

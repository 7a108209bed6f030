//! Watermark domain type
//!
//! The watermark is the highest item id that has already been processed. It
//! is the lower bound for the next search and it never moves backwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;

/// Highest processed item id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(u64);

impl Watermark {
    /// Starting point used when no checkpoint has ever been written.
    ///
    /// An item id from April 2018, so the first poll does not ask for the
    /// beginning of time.
    pub const EPOCH: Watermark = Watermark(981_588_894_067_118_080);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns true if an item with this id has not been processed yet
    pub fn admits(self, id: u64) -> bool {
        id > self.0
    }

    /// Moves the watermark forward to `id` if it is higher
    pub fn advance_to(self, id: u64) -> Self {
        Self(self.0.max(id))
    }

    /// Parses the text stored in a checkpoint slot
    ///
    /// A single trailing newline (`\n` or `\r\n`) is tolerated. Anything else
    /// around the digits is rejected.
    pub fn parse_checkpoint(raw: &str) -> Result<Self, ParseIntError> {
        let trimmed = raw
            .strip_suffix("\r\n")
            .or_else(|| raw.strip_suffix('\n'))
            .unwrap_or(raw);
        trimmed.parse::<u64>().map(Self)
    }

    /// Text written to a checkpoint slot
    pub fn to_checkpoint_text(self) -> String {
        format!("{}\n", self.0)
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::EPOCH
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_trailing_newline() {
        assert_eq!(Watermark::parse_checkpoint("123").unwrap(), Watermark::new(123));
        assert_eq!(Watermark::parse_checkpoint("123\n").unwrap(), Watermark::new(123));
        assert_eq!(Watermark::parse_checkpoint("123\r\n").unwrap(), Watermark::new(123));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Watermark::parse_checkpoint("not-a-number").is_err());
        assert!(Watermark::parse_checkpoint("").is_err());
        assert!(Watermark::parse_checkpoint("-1").is_err());
        assert!(Watermark::parse_checkpoint(" 12").is_err());
        assert!(Watermark::parse_checkpoint("12\n\n").is_err());
        assert!(Watermark::parse_checkpoint("18446744073709551616").is_err());
    }

    #[test]
    fn test_checkpoint_text_parses_back() {
        let mark = Watermark::new(u64::MAX);
        let text = mark.to_checkpoint_text();
        assert_eq!(text, "18446744073709551615\n");
        assert_eq!(Watermark::parse_checkpoint(&text).unwrap(), mark);
    }

    #[test]
    fn test_admits_is_strict() {
        let mark = Watermark::new(100);
        assert!(!mark.admits(99));
        assert!(!mark.admits(100));
        assert!(mark.admits(101));
    }

    #[test]
    fn test_advance_never_decreases() {
        let mark = Watermark::new(100);
        assert_eq!(mark.advance_to(50), mark);
        assert_eq!(mark.advance_to(150), Watermark::new(150));
    }

    #[test]
    fn test_default_is_epoch() {
        assert_eq!(Watermark::default(), Watermark::EPOCH);
    }
}

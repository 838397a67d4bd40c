//! Process (case) numbers.
//!
//! Users type case numbers with or without punctuation. Only digits are kept;
//! display uses the CNJ mask `NNNNNNN-DD.AAAA.J.TR.OOOO`.

use serde::{Deserialize, Serialize};

/// Minimum digits before a number can be used to fetch movements.
pub const MIN_DIGITS: usize = 7;

/// Digits in a complete CNJ number.
pub const FULL_DIGITS: usize = 20;

/// A normalized case number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessNumber(String);

impl ProcessNumber {
    /// Keep the digits of `input` (at most 20). Returns `None` when fewer
    /// than [`MIN_DIGITS`] remain.
    pub fn parse(input: &str) -> Option<Self> {
        let digits: String = input
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(FULL_DIGITS)
            .collect();

        if digits.len() < MIN_DIGITS {
            return None;
        }
        Some(Self(digits))
    }

    /// The bare digits.
    pub fn digits(&self) -> &str {
        &self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == FULL_DIGITS
    }

    /// The number with the CNJ mask applied as far as the digits go.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(FULL_DIGITS + 5);
        for (i, c) in self.0.chars().enumerate() {
            match i {
                7 => out.push('-'),
                9 | 13 | 14 | 16 => out.push('.'),
                _ => {}
            }
            out.push(c);
        }
        out
    }
}

impl std::fmt::Display for ProcessNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl std::str::FromStr for ProcessNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("process number needs at least {MIN_DIGITS} digits: {s:?}")
        })
    }
}

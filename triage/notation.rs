//! Strict parser for single-residue substitution notation such as `R34H`.
//!
//! Only the exact shape `<uppercase letter><decimal digits><uppercase letter>`
//! is accepted once surrounding whitespace has been trimmed. Insertions,
//! deletions, frameshifts (`V75fs`), stop-gains (`R12*`), three-letter codes and
//! `p.` prefixes are rejected: the feature model only has meaning for a
//! one-for-one residue swap.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A parsed substitution. The position is carried for traceability only, as
/// the digit text it was written with, so leading zeros and positions of any
/// length survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Substitution {
    pub reference: char,
    pub position: String,
    pub mutant: char,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("'{0}' is not a single-residue substitution (expected e.g. R34H)")]
    NoMatch(String),
}

impl Substitution {
    /// Parses `text` after trimming. Any deviation from the grammar is a `NoMatch`.
    pub fn parse(text: &str) -> Result<Self, NotationError> {
        let trimmed = text.trim();
        let no_match = || NotationError::NoMatch(trimmed.to_string());

        let bytes = trimmed.as_bytes();
        if bytes.len() < 3 {
            return Err(no_match());
        }
        let (first, rest) = (bytes[0], &bytes[1..]);
        let (digits, last) = (&rest[..rest.len() - 1], rest[rest.len() - 1]);

        if !first.is_ascii_uppercase() || !last.is_ascii_uppercase() {
            return Err(no_match());
        }
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(no_match());
        }
        // Positions are 1-based.
        if digits.iter().all(|&d| d == b'0') {
            return Err(no_match());
        }

        Ok(Self {
            reference: first as char,
            // Digits are ASCII here, so the slice is valid UTF-8.
            position: trimmed[1..trimmed.len() - 1].to_string(),
            mutant: last as char,
        })
    }

    /// True when reference and mutant residues are identical (a silent change).
    pub fn is_synonymous(&self) -> bool {
        self.reference == self.mutant
    }
}

impl FromStr for Substitution {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.reference, self.position, self.mutant)
    }
}

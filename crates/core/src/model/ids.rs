use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::catalog::CatalogError;

/// Position of a section in the catalog.
///
/// Doubles as the join key into the completion store and as the string key
/// of the persisted snapshot document.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionIndex(usize);

impl SectionIndex {
    /// Creates a new `SectionIndex`
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying position
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Chapter number of a section, constrained to `1..=7`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Chapter(u8);

impl Chapter {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 7;

    /// Creates a validated chapter number.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidChapter` if `number` is outside `1..=7`.
    pub fn new(number: u8) -> Result<Self, CatalogError> {
        if (Self::FIRST..=Self::LAST).contains(&number) {
            Ok(Self(number))
        } else {
            Err(CatalogError::InvalidChapter(number))
        }
    }

    /// Returns the chapter number
    #[must_use]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Short label used by charts ("Ch 3").
    #[must_use]
    pub fn label(&self) -> String {
        format!("Ch {}", self.0)
    }
}

impl fmt::Debug for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionIndex({})", self.0)
    }
}

impl fmt::Debug for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chapter({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

/// Only the canonical decimal form is accepted, so each index has exactly
/// one spelling: no sign, no leading zeros, no whitespace.
impl FromStr for SectionIndex {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError {
            kind: "SectionIndex",
            raw: s.to_owned(),
        };
        let canonical = !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'));
        if !canonical {
            return Err(err());
        }
        s.parse::<usize>().map(SectionIndex::new).map_err(|_| err())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

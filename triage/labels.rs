//! The binary outcome and the policy that assigns it from free-text annotations.

use std::fmt;

/// Class label. The integer encoding (0 = benign, 1 = pathogenic) is what the
/// derived feature table stores in its `Class` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Benign,
    Pathogenic,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Benign, Label::Pathogenic];

    /// Pathogenic iff the lower-cased annotation contains `pathogenic` anywhere.
    ///
    /// The match is a plain substring test, so "Likely Pathogenic (ClinVar)"
    /// and "Pathogenic (confirmed)" both count. Keep it that way: source files
    /// carry free-text annotations rather than a controlled vocabulary.
    pub fn from_classification(text: &str) -> Self {
        if text.to_lowercase().contains("pathogenic") {
            Label::Pathogenic
        } else {
            Label::Benign
        }
    }

    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(Label::Benign),
            1 => Some(Label::Pathogenic),
            _ => None,
        }
    }

    pub fn class(self) -> u8 {
        match self {
            Label::Benign => 0,
            Label::Pathogenic => 1,
        }
    }

    pub fn index(self) -> usize {
        self.class() as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Label::Benign => "Benign",
            Label::Pathogenic => "Pathogenic",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

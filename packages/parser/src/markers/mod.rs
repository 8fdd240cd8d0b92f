//! Structural marker detection.
//!
//! The scanner finds candidate markers for a set of kinds inside a region of
//! flattened text; the citation classifier decides whether a candidate is a
//! real heading or a cross-reference embedded in prose, and whether a list
//! marker is a numeral cited in prose ("Anexo I -", "incisos I e II -").

mod citation;
mod patterns;
mod scanner;

pub use citation::{classify, classify_list_marker, CitationCue, Verdict};
pub use patterns::{describe_heuristics, heading_kind, pattern_for, priority, TOP_LEVEL_KINDS};
pub use scanner::{find_candidates, ordinal_of, resolve_overlaps, roman_to_int};

use crate::types::DeviceKind;

/// A detected structural boundary.
///
/// Offsets are byte positions in the text that was scanned. Markers are
/// consumed into nodes right after the scan that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: DeviceKind,
    /// Marker text as it appeared ("Art. 5º", "§ 1º", "II", "a)").
    pub label: String,
    /// Start of the marker.
    pub start: usize,
    /// End of the marker, where the device's own content begins.
    pub end: usize,
    /// Parsed numeral or letter, normalized for identifiers.
    pub ordinal: Option<String>,
}

impl Marker {
    #[must_use]
    pub fn new(kind: DeviceKind, label: impl Into<String>, start: usize, end: usize) -> Self {
        let label = label.into();
        let ordinal = ordinal_of(kind, &label);
        Self {
            kind,
            label,
            start,
            end,
            ordinal,
        }
    }

    /// Whether the label starts like a heading ("Art", "§", "CAPÍTULO")
    /// rather than a lowercase mention ("art.").
    #[must_use]
    pub fn is_capitalized(&self) -> bool {
        self.label
            .chars()
            .next()
            .is_some_and(|c| c == '§' || c.is_uppercase())
    }
}

/// How sure the classifier is that an accepted marker is a real heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Certainty {
    /// Opens the text or follows a sentence end.
    Strong,
    /// Capitalized, no citation cue around it.
    Plain,
    /// Lowercase, no citation cue around it.
    Weak,
}

//! Splitting strategies for device extraction.

use crate::config::ParserConfig;
use crate::markers::{classify, classify_list_marker, Marker, Verdict};
use crate::types::DeviceKind;

/// Trait for configurable splitting strategies.
///
/// Implementations decide whether a candidate marker opens a device.
pub trait SplitStrategy {
    /// Judge a candidate found in `text`.
    fn judge(&self, text: &str, marker: &Marker) -> Verdict;
}

/// Strategy that rejects markers embedded in prose as cross-references.
///
/// Article, paragraph and heading markers are judged on the citing words
/// around them. Incisos, alíneas and items are judged on the word before
/// them only, since list entries follow any text.
pub struct CitationAwareStrategy {
    prefix_chars: usize,
    suffix_chars: usize,
}

impl CitationAwareStrategy {
    #[must_use]
    pub fn new(prefix_chars: usize, suffix_chars: usize) -> Self {
        Self {
            prefix_chars,
            suffix_chars,
        }
    }

    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.citation_prefix_chars, config.citation_suffix_chars)
    }
}

impl Default for CitationAwareStrategy {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}

impl SplitStrategy for CitationAwareStrategy {
    fn judge(&self, text: &str, marker: &Marker) -> Verdict {
        match marker.kind {
            DeviceKind::Inciso | DeviceKind::Alinea | DeviceKind::Item => {
                classify_list_marker(text, marker)
            }
            _ => classify(text, marker, self.prefix_chars, self.suffix_chars),
        }
    }
}

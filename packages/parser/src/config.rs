//! Configuration constants, validation functions and tunables for the parser.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ParserError, Result};

/// Default confidence below which a result is routed to assisted review.
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.75;

/// Penalty applied per orphan child (alínea without inciso, item without alínea).
pub const DEFAULT_ORPHAN_PENALTY: f64 = 0.10;

/// Penalty applied per marker accepted with low certainty.
pub const DEFAULT_WEAK_MARKER_PENALTY: f64 = 0.02;

/// Penalty applied per structural path collision.
pub const DEFAULT_COLLISION_PENALTY: f64 = 0.05;

/// Penalty applied per amendment phrase without a parseable quoted block.
pub const DEFAULT_UNRESOLVED_ALTERATION_PENALTY: f64 = 0.05;

/// Confidence cap when no structural marker was found at all.
pub const DEFAULT_NO_MARKER_CONFIDENCE: f64 = 0.30;

/// Confidence cap when the body is empty because an annex marker opens the text.
pub const DEFAULT_EMPTY_BODY_CONFIDENCE: f64 = 0.50;

/// Characters inspected before a marker when checking for citations.
pub const DEFAULT_CITATION_PREFIX_CHARS: usize = 40;

/// Characters inspected after a marker when checking for citations.
pub const DEFAULT_CITATION_SUFFIX_CHARS: usize = 60;

/// Text wrap width for terminal summaries.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Date format used by the input contract.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// LexML URN pattern: `urn:lex:` followed by at least one further segment.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEX_URN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^urn:lex:[a-z]{2}(?:[:;][^\s:;]+)+$").expect("valid regex"));

/// Semicolon URN pattern: `br;go;<locality>;<tipo>;YYYY-MM-DD;<numero>`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SHORT_URN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2};[a-z]{2};[a-z0-9.]+;[a-z.]+;\d{4}-\d{2}-\d{2};[0-9a-z.\-]+$")
        .expect("valid regex")
});

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate an act identifier.
///
/// # Arguments
/// * `urn` - Either a LexML URN (`urn:lex:br;...`) or the semicolon form
///   `br;go;aparecida.goiania;lei;2023-03-10;1234`
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(ParserError::InvalidUrn)` if invalid
///
/// # Examples
/// ```
/// use atlas_parser::config::validate_urn;
///
/// assert!(validate_urn("br;go;aparecida.goiania;lei;2023-03-10;1234").is_ok());
/// assert!(validate_urn("urn:lex:br;goias;estadual:lei:2023-03-10;1234").is_ok());
/// assert!(validate_urn("lei 1234").is_err());
/// ```
pub fn validate_urn(urn: &str) -> Result<()> {
    if LEX_URN_PATTERN.is_match(urn) || SHORT_URN_PATTERN.is_match(urn) {
        Ok(())
    } else {
        Err(ParserError::InvalidUrn(urn.to_string()))
    }
}

/// Validate date format (YYYY-MM-DD) and that it names a real calendar day.
///
/// # Examples
/// ```
/// use atlas_parser::config::validate_date;
///
/// assert!(validate_date("2023-03-10").is_ok());
/// assert!(validate_date("2023-02-30").is_err());
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    parse_date(date_str).map(|_| ())
}

/// Parse a YYYY-MM-DD date.
pub fn parse_date(date_str: &str) -> Result<chrono::NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(ParserError::InvalidDate(date_str.to_string()));
    }
    chrono::NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|_| ParserError::InvalidDate(date_str.to_string()))
}

/// Tunable parameters of the deterministic parser.
///
/// All fields have defaults, so a YAML file only needs to name the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Confidence below which assisted review is requested.
    pub review_threshold: f64,
    pub orphan_penalty: f64,
    pub weak_marker_penalty: f64,
    pub collision_penalty: f64,
    pub unresolved_alteration_penalty: f64,
    /// Cap applied when the body has no structural marker.
    pub no_marker_confidence: f64,
    /// Cap applied when the body is empty.
    pub empty_body_confidence: f64,
    /// Window before a marker inspected for citation prepositions.
    pub citation_prefix_chars: usize,
    /// Window after a marker inspected for citation continuations.
    pub citation_suffix_chars: usize,
    /// Fold a leading article numbered above 1 into the preamble.
    pub leading_article_as_preamble: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            orphan_penalty: DEFAULT_ORPHAN_PENALTY,
            weak_marker_penalty: DEFAULT_WEAK_MARKER_PENALTY,
            collision_penalty: DEFAULT_COLLISION_PENALTY,
            unresolved_alteration_penalty: DEFAULT_UNRESOLVED_ALTERATION_PENALTY,
            no_marker_confidence: DEFAULT_NO_MARKER_CONFIDENCE,
            empty_body_confidence: DEFAULT_EMPTY_BODY_CONFIDENCE,
            citation_prefix_chars: DEFAULT_CITATION_PREFIX_CHARS,
            citation_suffix_chars: DEFAULT_CITATION_SUFFIX_CHARS,
            leading_article_as_preamble: true,
        }
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl ParserConfig {
    /// Defaults overridden by `ATLAS_REVIEW_THRESHOLD`, `ATLAS_ORPHAN_PENALTY`
    /// and `ATLAS_WEAK_MARKER_PENALTY`.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            review_threshold: env_f64("ATLAS_REVIEW_THRESHOLD", DEFAULT_REVIEW_THRESHOLD),
            orphan_penalty: env_f64("ATLAS_ORPHAN_PENALTY", DEFAULT_ORPHAN_PENALTY),
            weak_marker_penalty: env_f64("ATLAS_WEAK_MARKER_PENALTY", DEFAULT_WEAK_MARKER_PENALTY),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every ratio lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("review_threshold", self.review_threshold),
            ("orphan_penalty", self.orphan_penalty),
            ("weak_marker_penalty", self.weak_marker_penalty),
            ("collision_penalty", self.collision_penalty),
            (
                "unresolved_alteration_penalty",
                self.unresolved_alteration_penalty,
            ),
            ("no_marker_confidence", self.no_marker_confidence),
            ("empty_body_confidence", self.empty_body_confidence),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParserError::Config(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_review_threshold(mut self, threshold: f64) -> Self {
        self.review_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_orphan_penalty(mut self, penalty: f64) -> Self {
        self.orphan_penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_weak_marker_penalty(mut self, penalty: f64) -> Self {
        self.weak_marker_penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_citation_window(mut self, prefix_chars: usize, suffix_chars: usize) -> Self {
        self.citation_prefix_chars = prefix_chars;
        self.citation_suffix_chars = suffix_chars;
        self
    }

    #[must_use]
    pub fn with_leading_article_as_preamble(mut self, enabled: bool) -> Self {
        self.leading_article_as_preamble = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_urn_valid() {
        assert!(validate_urn("br;go;aparecida.goiania;lei;2023-03-10;1234").is_ok());
        assert!(validate_urn("br;go;aparecida.goiania;lei.complementar;2020-01-02;45").is_ok());
        assert!(validate_urn("br;go;estadual;decreto;2019-12-31;9.876").is_ok());
        assert!(validate_urn("urn:lex:br;goias:estadual:lei:2023-03-10;1234").is_ok());
    }

    #[test]
    fn test_validate_urn_invalid() {
        assert!(validate_urn("").is_err());
        assert!(validate_urn("urn:lex:").is_err());
        assert!(validate_urn("br;go;lei;2023-03-10").is_err());
        assert!(validate_urn("BR;GO;ESTADUAL;LEI;2023-03-10;1").is_err());
        assert!(validate_urn("br;go;estadual;lei;10/03/2023;1").is_err());
    }

    #[test]
    fn test_validate_date_valid() {
        assert!(validate_date("2023-03-10").is_ok());
        assert!(validate_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_validate_date_invalid() {
        assert!(validate_date("").is_err());
        assert!(validate_date("10/03/2023").is_err());
        assert!(validate_date("2023-3-10").is_err());
        assert!(validate_date("2023-13-01").is_err());
        assert!(validate_date("2023-02-29").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ParserConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.review_threshold, DEFAULT_REVIEW_THRESHOLD);
        assert!(config.leading_article_as_preamble);
    }

    #[test]
    fn test_builder_setters() {
        let config = ParserConfig::default()
            .with_review_threshold(0.5)
            .with_orphan_penalty(0.2)
            .with_citation_window(10, 20)
            .with_leading_article_as_preamble(false);
        assert_eq!(config.review_threshold, 0.5);
        assert_eq!(config.orphan_penalty, 0.2);
        assert_eq!(config.citation_prefix_chars, 10);
        assert_eq!(config.citation_suffix_chars, 20);
        assert!(!config.leading_article_as_preamble);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ParserConfig::default().with_review_threshold(1.5);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("review_threshold"));
    }

    #[test]
    fn test_from_yaml_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "review_threshold: 0.6\norphan_penalty: 0.15").unwrap();

        let config = ParserConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.review_threshold, 0.6);
        assert_eq!(config.orphan_penalty, 0.15);
        assert_eq!(config.collision_penalty, DEFAULT_COLLISION_PENALTY);
    }

    #[test]
    fn test_from_yaml_file_rejects_invalid_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "no_marker_confidence: -0.1").unwrap();

        let result = ParserConfig::from_yaml_file(file.path());
        assert!(matches!(result, Err(ParserError::Config(_))));
    }
}

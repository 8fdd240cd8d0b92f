//! Error types for the parser.
//!
//! Uses the dual-error pattern: `ParserError` for library consumers with
//! detailed context, and `AssistUnavailable` for the optional assisted-parse
//! collaborator. Recoverable parse conditions are not errors at all; they are
//! recorded as [`Diagnostic`](crate::types::Diagnostic) values.

use thiserror::Error;

use crate::types::{Diagnostic, DiagnosticCode};

/// Main error type for the parser library.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Text is empty or whitespace-only after normalization.
    #[error("Malformed input for {urn}: text is empty after normalization")]
    MalformedInput { urn: String },

    /// Invalid act identifier.
    #[error("Invalid URN: '{0}'. Expected 'urn:lex:...' or 'br;uf;...;tipo;YYYY-MM-DD;numero'")]
    InvalidUrn(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2023-03-10)")]
    InvalidDate(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ParserError {
    /// Whether this error means the document itself is unusable, as opposed
    /// to an environment or invocation problem.
    #[must_use]
    pub fn is_document_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. } | Self::InvalidUrn(_) | Self::InvalidDate(_)
        )
    }

    /// The error-severity diagnostic reported for a document failure.
    #[must_use]
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        let code = match self {
            Self::MalformedInput { .. } => DiagnosticCode::MalformedInput,
            Self::InvalidUrn(_) | Self::InvalidDate(_) => DiagnosticCode::InvalidMetadata,
            _ => return None,
        };
        Some(Diagnostic::error(code, self.to_string()))
    }
}

/// The assisted-parse collaborator could not produce a result.
#[derive(Debug, Clone, Error)]
#[error("Assisted parse unavailable: {reason}")]
pub struct AssistUnavailable {
    pub reason: String,
}

impl AssistUnavailable {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

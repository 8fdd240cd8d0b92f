//! Atlas Parser - Turn raw Brazilian legal-act text into a device tree.
//!
//! This crate splits the text of a law, decree or ordinance into its
//! structural devices (artigos, parágrafos, incisos, alíneas, itens and
//! the grouping headings above them), gives each one a stable structural
//! path and content hash, and reports how confident the split is.
//! Parsing is deterministic and pure: no I/O, no global state.
//!
//! # Example
//!
//! ```
//! use atlas_parser::{parse_act, DeviceKind, ParserConfig, RawAct};
//!
//! let act = RawAct::new(
//!     "br;go;goiania;lei;2023-03-10;1",
//!     "Art. 1º Compete ao órgão: I - planejar; II - executar.",
//! );
//! let result = parse_act(&act, &ParserConfig::default()).unwrap();
//!
//! let article = &result.devices[0];
//! assert_eq!(article.kind, DeviceKind::Article);
//! assert_eq!(article.children[1].structural_path, "art1/inc2");
//! ```
//!
//! # Architecture
//!
//! The parser is organized into several modules:
//!
//! - [`config`]: Constants, input validation and parser tunables
//! - [`types`]: Core data types (RawAct, DeviceNode, ParseResult, etc.)
//! - [`error`]: Error types and Result alias
//! - [`normalize`]: Text normalization and hash canonicalization
//! - [`segment`]: Body and annex segmentation
//! - [`markers`]: Marker patterns and citation disambiguation
//! - [`splitting`]: Recursive device splitting
//! - [`alteration`]: Amendment blocks quoted inside devices
//! - [`closing`]: Closing clause isolation
//! - [`relations`]: Cross-reference relation markers
//! - [`identify`]: Structural paths and content hashes
//! - [`parser`]: Main parser service
//! - [`assisted`]: Review routing to an assisted collaborator
//! - [`output`]: JSON/YAML output and terminal summaries
//! - [`cli`]: Command-line interface

pub mod alteration;
pub mod assisted;
pub mod cli;
pub mod closing;
pub mod config;
pub mod error;
pub mod identify;
pub mod markers;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod relations;
pub mod segment;
pub mod splitting;
pub mod types;

// Re-export main functions
pub use assisted::{parse_with_review, structurally_equivalent, AssistedParser, Origin, ReviewOutcome};
pub use markers::describe_heuristics;
pub use parser::{parse_act, Parser};

// Re-export commonly used items
pub use config::{validate_date, validate_urn, ParserConfig};
pub use error::{AssistUnavailable, ParserError, Result};
pub use types::{
    ActMetadata, AnnexNode, ClosingClause, DeviceKind, DeviceNode, Diagnostic, DiagnosticCode,
    NormalizationAudit, ParseResult, RawAct, Relation, RelationKind, Severity, TextVersion,
    ValidityStatus,
};

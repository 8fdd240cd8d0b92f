//! Review routing to an optional assisted-parse collaborator.
//!
//! The deterministic parser never depends on the collaborator. When a
//! result's confidence falls below the review threshold and a
//! collaborator is supplied, it gets one attempt; its answer replaces the
//! deterministic result, and an unavailable answer keeps it.

use crate::config::ParserConfig;
use crate::error::{AssistUnavailable, Result};
use crate::normalize::normalize_for_hash;
use crate::parser::parse_act;
use crate::types::{
    ActMetadata, DeviceKind, DeviceNode, Diagnostic, DiagnosticCode, ParseResult, RawAct,
};

/// Alternate parse path, e.g. a model-assisted parser.
pub trait AssistedParser: Send + Sync {
    /// Parse `text` or report why no result can be produced.
    fn attempt_assisted_parse(
        &self,
        text: &str,
        metadata: &ActMetadata,
    ) -> std::result::Result<ParseResult, AssistUnavailable>;
}

/// Which path produced the final result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Deterministic,
    Assisted,
}

/// Result of [`parse_with_review`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub result: ParseResult,
    pub origin: Origin,
    /// Set when the assisted result differs structurally from the
    /// deterministic one.
    pub divergent: bool,
}

/// Whether a result should be routed to review.
#[must_use]
pub fn needs_review(result: &ParseResult, config: &ParserConfig) -> bool {
    result.confidence < config.review_threshold
}

/// Parse deterministically, then route low-confidence results to the
/// collaborator when one is given.
///
/// # Arguments
/// * `act` - The raw act
/// * `config` - Parser tunables, including the review threshold
/// * `assistant` - Optional collaborator
///
/// # Returns
/// The final result plus its origin. Only a malformed input fails.
pub fn parse_with_review(
    act: &RawAct,
    config: &ParserConfig,
    assistant: Option<&dyn AssistedParser>,
) -> Result<ReviewOutcome> {
    let mut deterministic = parse_act(act, config)?;

    let Some(assistant) = assistant.filter(|_| needs_review(&deterministic, config)) else {
        return Ok(ReviewOutcome {
            result: deterministic,
            origin: Origin::Deterministic,
            divergent: false,
        });
    };

    tracing::info!(
        urn = %act.urn,
        confidence = deterministic.confidence,
        threshold = config.review_threshold,
        "confidence below threshold, requesting assisted parse"
    );

    match assistant.attempt_assisted_parse(&act.texto_bruto, &deterministic.source) {
        Ok(assisted) => {
            let divergent = !structurally_equivalent(&deterministic, &assisted);
            if divergent {
                tracing::warn!(urn = %act.urn, "assisted parse diverges from deterministic parse");
            }
            Ok(ReviewOutcome {
                result: assisted,
                origin: Origin::Assisted,
                divergent,
            })
        }
        Err(unavailable) => {
            tracing::warn!(urn = %act.urn, reason = %unavailable.reason, "assisted parse unavailable");
            deterministic.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::AssistUnavailable,
                unavailable.to_string(),
            ));
            Ok(ReviewOutcome {
                result: deterministic,
                origin: Origin::Deterministic,
                divergent: false,
            })
        }
    }
}

/// Compare two results by structure alone.
///
/// `order` values, pseudo-nodes and the closing clause are ignored; kinds,
/// labels, normalized texts and child structure must match.
#[must_use]
pub fn structurally_equivalent(a: &ParseResult, b: &ParseResult) -> bool {
    same_siblings(&a.devices, &b.devices)
}

fn same_siblings(a: &[DeviceNode], b: &[DeviceNode]) -> bool {
    let (a, b) = (substantive(a), substantive(b));
    a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| same_node(x, y))
}

fn substantive(nodes: &[DeviceNode]) -> Vec<&DeviceNode> {
    nodes
        .iter()
        .filter(|node| node.kind != DeviceKind::Auxiliary)
        .collect()
}

fn same_node(a: &DeviceNode, b: &DeviceNode) -> bool {
    a.kind == b.kind
        && a.label == b.label
        && normalize_for_hash(&a.text) == normalize_for_hash(&b.text)
        && same_siblings(&a.children, &b.children)
}

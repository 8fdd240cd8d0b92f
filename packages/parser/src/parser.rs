//! Deterministic parser that ties all stages together.

use crate::closing::isolate_closing;
use crate::config::{parse_date, ParserConfig};
use crate::error::{ParserError, Result};
use crate::identify::assign_identifiers;
use crate::normalize::{flatten, normalize};
use crate::relations::attach_relations;
use crate::segment::segment;
use crate::splitting::{
    create_brazilian_act_hierarchy, CitationAwareStrategy, Findings, SplitContext, SplitEngine,
};
use crate::types::{DeviceKind, DeviceNode, DiagnosticCode, ParseResult, RawAct};

/// Label and path of the text before the first device.
pub const PREAMBLE_LABEL: &str = "preambulo";

/// Label and path of the single node kept when no device is found.
pub const WHOLE_TEXT_LABEL: &str = "texto_integral";

/// Parse one act with the given configuration.
///
/// # Arguments
/// * `act` - The raw act as delivered by the acquisition step
/// * `config` - Parser tunables
///
/// # Returns
/// The device tree, annexes, closing clause, confidence and diagnostics.
/// Only text that is empty after normalization is an error.
///
/// # Examples
/// ```
/// use atlas_parser::{parse_act, ParserConfig, RawAct};
///
/// let act = RawAct::new(
///     "br;go;goiania;lei;2023-03-10;1",
///     "Art. 1º Fica instituído o programa. § 1º O programa é gratuito.",
/// );
/// let result = parse_act(&act, &ParserConfig::default()).unwrap();
/// assert_eq!(result.devices[0].label, "Art. 1º");
/// assert_eq!(result.devices[0].children[0].structural_path, "art1/p1");
/// ```
pub fn parse_act(act: &RawAct, config: &ParserConfig) -> Result<ParseResult> {
    Parser::new(config.clone()).parse(act)
}

/// Reusable parser: the hierarchy and strategy are built once.
///
/// Holds no per-document state, so one instance can be shared across
/// threads for batch runs.
pub struct Parser {
    config: ParserConfig,
    engine: SplitEngine<CitationAwareStrategy>,
}

impl Parser {
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        let engine = SplitEngine::new(
            create_brazilian_act_hierarchy(),
            CitationAwareStrategy::from_config(&config),
        );
        Self { config, engine }
    }

    /// Parse one act.
    pub fn parse(&self, act: &RawAct) -> Result<ParseResult> {
        let normalized = normalize(&act.texto_bruto);
        if normalized.is_empty() {
            tracing::warn!(urn = %act.urn, "text is empty after normalization");
            return Err(ParserError::MalformedInput {
                urn: act.urn.clone(),
            });
        }

        let mut findings = Findings::new();

        let segments = segment(&normalized);
        if segments.empty_body {
            findings.warn(
                DiagnosticCode::EmptyBody,
                "an annex marker opens the text; the body is empty",
            );
        }

        let ctx = SplitContext::new(validity_start(act))
            .with_fold_leading_article(self.config.leading_article_as_preamble);
        let body = flatten(&segments.body);

        let mut devices = Vec::new();
        let mut no_markers = false;
        if !body.is_empty() {
            let tree = self.engine.split_body(&body, &ctx, &mut findings);
            if tree.devices.is_empty() {
                no_markers = true;
                findings.warn(
                    DiagnosticCode::NoStructuralMarkers,
                    "no structural marker found; the body is kept as a single node",
                );
                devices.push(pseudo_node(WHOLE_TEXT_LABEL, tree.leading, tree.leading_alterations));
            } else {
                if !tree.leading.is_empty() || !tree.leading_alterations.is_empty() {
                    devices.push(pseudo_node(PREAMBLE_LABEL, tree.leading, tree.leading_alterations));
                }
                devices.extend(tree.devices);
            }
        }

        let closing = isolate_closing(&mut devices);
        attach_relations(&mut devices);
        assign_identifiers(&mut devices, &mut findings);

        let confidence = self.confidence(&findings, no_markers, segments.empty_body);
        let result = ParseResult {
            source: act.metadata(),
            devices,
            annexes: segments.annexes,
            closing,
            confidence,
            diagnostics: findings.diagnostics,
        };

        tracing::info!(
            urn = %act.urn,
            devices = result.device_count(),
            annexes = result.annexes.len(),
            confidence = result.confidence,
            "act parsed"
        );
        Ok(result)
    }

    /// Confidence in `[0, 1]`: penalties per recorded condition, capped
    /// when the body had no markers or no content.
    fn confidence(&self, findings: &Findings, no_markers: bool, empty_body: bool) -> f64 {
        let config = &self.config;
        let penalties = [
            (findings.orphans, config.orphan_penalty),
            (findings.weak_markers, config.weak_marker_penalty),
            (findings.collisions, config.collision_penalty),
            (findings.unresolved_alterations, config.unresolved_alteration_penalty),
        ];
        let mut score = penalties
            .iter()
            .fold(1.0, |score, (count, penalty)| score - *count as f64 * penalty);
        if no_markers {
            score = score.min(config.no_marker_confidence);
        }
        if empty_body {
            score = score.min(config.empty_body_confidence);
        }
        score.clamp(0.0, 1.0)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

fn pseudo_node(label: &str, text: String, children: Vec<DeviceNode>) -> DeviceNode {
    DeviceNode::new(DeviceKind::Auxiliary, label, text)
        .with_order(0)
        .with_children(children)
}

/// Validity start for amended wordings: publication date, else the
/// legislation date.
fn validity_start(act: &RawAct) -> Option<chrono::NaiveDate> {
    let raw = act
        .data_publicacao
        .as_deref()
        .or(act.data_legislacao.as_deref())?;
    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(urn = %act.urn, error = %e, "ignoring unparseable act date");
            None
        }
    }
}

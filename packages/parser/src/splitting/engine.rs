//! Split engine that carves a flattened body into a device tree using the
//! hierarchy registry.

use std::ops::Range;

use super::config::nesting_rank;
use super::registry::HierarchyRegistry;
use super::strategy::SplitStrategy;
use super::types::{Findings, SplitContext};
use crate::alteration::{block_label, find_blocks, text_version, AlterationBlock};
use crate::markers::{find_candidates, resolve_overlaps, Certainty, Marker, Verdict, TOP_LEVEL_KINDS};
use crate::normalize::flatten;
use crate::types::{DeviceKind, DeviceNode, DiagnosticCode};

/// Result of splitting a body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyTree {
    /// Text before the first accepted top-level marker.
    pub leading: String,
    /// Amendment blocks quoted in the leading text.
    pub leading_alterations: Vec<DeviceNode>,
    /// Top-level devices in source order, `order` starting at 1.
    pub devices: Vec<DeviceNode>,
}

/// Engine for splitting legal text using the hierarchy schema.
///
/// Finds top-level markers, then walks each marker's window level by
/// level according to the hierarchy, producing one `DeviceNode` per
/// accepted marker.
pub struct SplitEngine<S: SplitStrategy> {
    hierarchy: HierarchyRegistry,
    strategy: S,
}

impl<S: SplitStrategy> SplitEngine<S> {
    /// Create a new split engine.
    #[must_use]
    pub fn new(hierarchy: HierarchyRegistry, strategy: S) -> Self {
        Self {
            hierarchy,
            strategy,
        }
    }

    /// Split a flattened body (or the content of an amendment block).
    pub fn split_body(&self, text: &str, ctx: &SplitContext, findings: &mut Findings) -> BodyTree {
        let scan = find_blocks(text);
        for offset in &scan.unresolved {
            findings.unresolved_alterations += 1;
            findings.warn(
                DiagnosticCode::UnresolvedAlteration,
                format!("amendment phrase at offset {offset} has no quoted (NR) block; text kept"),
            );
        }

        let candidates = resolve_overlaps(find_candidates(
            text,
            0..text.len(),
            TOP_LEVEL_KINDS,
            &scan.protected_spans(),
        ));
        let mut accepted = self.accept(text, candidates, findings);
        tracing::debug!(markers = accepted.len(), depth = ctx.depth, "top-level markers accepted");

        if ctx.fold_leading_article && accepted.len() > 1 && !opens_numbering(&accepted[0]) {
            let folded = accepted.remove(0);
            findings.info(
                DiagnosticCode::LeadingArticleAsPreamble,
                format!("'{}' precedes the numbered articles; kept in the preamble", folded.label),
            );
        }

        let leading_range = 0..accepted.first().map_or(text.len(), |m| m.start);
        let leading_alterations = self.alterations_in(&leading_range, &scan.blocks, ctx, findings);
        let leading = remove_child_texts(
            residual(text, &leading_range, &scan.blocks),
            &leading_alterations,
        );

        let mut devices = Vec::with_capacity(accepted.len());
        for (i, marker) in accepted.iter().enumerate() {
            let end = accepted.get(i + 1).map_or(text.len(), |next| next.start);
            let node = self.decompose(text, marker, marker.end..end, &scan.blocks, &ctx.nested(), findings);
            devices.push(node.with_order(i + 1));
        }

        BodyTree {
            leading,
            leading_alterations,
            devices,
        }
    }

    /// Build the node for `marker`, whose content is `content`.
    fn decompose(
        &self,
        text: &str,
        marker: &Marker,
        content: Range<usize>,
        blocks: &[AlterationBlock],
        ctx: &SplitContext,
        findings: &mut Findings,
    ) -> DeviceNode {
        let spec = self.hierarchy.get_spec(marker.kind);
        if spec.is_none() {
            tracing::warn!(
                kind = %marker.kind,
                "Unknown device kind in splitting hierarchy, keeping as leaf"
            );
        }

        let searched = match spec {
            Some(spec) if spec.is_split_point && !ctx.exhausted() => spec.searched_kinds(),
            _ => Vec::new(),
        };

        let direct = if searched.is_empty() {
            Vec::new()
        } else {
            let protected: Vec<Range<usize>> = blocks.iter().map(|b| b.span.clone()).collect();
            let candidates = resolve_overlaps(find_candidates(text, content.clone(), &searched, &protected));
            direct_children(self.accept(text, candidates, findings))
        };

        let caput_range = content.start..direct.first().map_or(content.end, |m| m.start);
        let mut children = self.alterations_in(&caput_range, blocks, ctx, findings);

        for (i, child) in direct.iter().enumerate() {
            let end = direct.get(i + 1).map_or(content.end, |next| next.start);
            if spec.is_some_and(|s| s.is_orphan(child.kind)) {
                findings.orphans += 1;
                findings.warn(
                    DiagnosticCode::OrphanChild,
                    format!(
                        "{} '{}' has no enclosing level; attached to {} '{}'",
                        child.kind, child.label, marker.kind, marker.label
                    ),
                );
            }
            children.push(self.decompose(text, child, child.end..end, blocks, &ctx.nested(), findings));
        }

        renumber(&mut children);
        let caput = remove_child_texts(residual(text, &caput_range, blocks), &children);
        DeviceNode::new(marker.kind, marker.label.clone(), caput).with_children(children)
    }

    /// Alteration nodes for the blocks lying inside `range`.
    fn alterations_in(
        &self,
        range: &Range<usize>,
        blocks: &[AlterationBlock],
        ctx: &SplitContext,
        findings: &mut Findings,
    ) -> Vec<DeviceNode> {
        let mut nodes = Vec::new();
        for block in blocks.iter().filter(|b| b.within(range)) {
            let node = self.alteration_node(block, nodes.len() + 1, ctx, findings);
            nodes.push(node);
        }
        nodes
    }

    /// Parse a quoted block into an alteration node.
    fn alteration_node(
        &self,
        block: &AlterationBlock,
        index: usize,
        ctx: &SplitContext,
        findings: &mut Findings,
    ) -> DeviceNode {
        let inner = ctx.for_alteration();

        let (text, mut children) = if inner.exhausted() {
            (block.content.clone(), Vec::new())
        } else {
            let tree = self.split_body(&block.content, &inner, findings);
            let mut children = tree.leading_alterations;
            children.extend(tree.devices);
            (tree.leading, children)
        };
        renumber(&mut children);

        let label = block_label(&children, index);
        let text = remove_child_texts(text, &children);
        let mut node = DeviceNode::new(DeviceKind::Alteration, label, text).with_children(children);
        node.versions.push(text_version(&block.content, ctx.valid_from));
        node
    }

    /// Apply the strategy to candidates, recording how each was resolved.
    fn accept(&self, text: &str, candidates: Vec<Marker>, findings: &mut Findings) -> Vec<Marker> {
        candidates
            .into_iter()
            .filter(|marker| match self.strategy.judge(text, marker) {
                Verdict::Heading(Certainty::Strong) => true,
                Verdict::Heading(Certainty::Plain) => {
                    findings.info(
                        DiagnosticCode::AmbiguousMarkerResolved,
                        format!("'{}' at offset {} kept as a device", marker.label, marker.start),
                    );
                    true
                }
                Verdict::Heading(Certainty::Weak) => {
                    findings.weak_markers += 1;
                    findings.info(
                        DiagnosticCode::AmbiguousMarkerResolved,
                        format!(
                            "'{}' at offset {} kept as a device despite lowercase label",
                            marker.label, marker.start
                        ),
                    );
                    true
                }
                Verdict::Citation(cue) => {
                    findings.info(
                        DiagnosticCode::AmbiguousMarkerResolved,
                        format!("'{}' at offset {} read as a citation: {cue}", marker.label, marker.start),
                    );
                    false
                }
            })
            .collect()
    }
}

/// Keep the candidates that open a direct child.
///
/// A candidate following one of higher rank lies in that candidate's
/// window and is found again when it is decomposed.
fn direct_children(accepted: Vec<Marker>) -> Vec<Marker> {
    let mut direct: Vec<Marker> = Vec::with_capacity(accepted.len());
    for marker in accepted {
        let nested = direct
            .last()
            .is_some_and(|parent| nesting_rank(marker.kind) < nesting_rank(parent.kind));
        if !nested {
            direct.push(marker);
        }
    }
    direct
}

/// Whether an article marker is numbered 0 or 1 (or carries no number).
fn opens_numbering(marker: &Marker) -> bool {
    if marker.kind != DeviceKind::Article {
        return true;
    }
    marker
        .ordinal
        .as_deref()
        .map(|ordinal| ordinal.split('-').next().unwrap_or(ordinal))
        .and_then(|number| number.parse::<u32>().ok())
        .map_or(true, |number| number <= 1)
}

/// Text of `range` without the amendment blocks inside it, flattened and
/// stripped of the separators that follow a label.
fn residual(text: &str, range: &Range<usize>, blocks: &[AlterationBlock]) -> String {
    let mut out = String::new();
    let mut pos = range.start;
    for block in blocks.iter().filter(|b| b.within(range)) {
        out.push_str(&text[pos..block.span.start]);
        out.push(' ');
        pos = block.span.end;
    }
    out.push_str(&text[pos..range.end]);

    flatten(&out)
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | '-' | '–' | '—'))
        .to_string()
}

/// Remove every child's text from the parent's own text.
///
/// Repeats until no child text occurs in the parent, since one removal can
/// join fragments into a new occurrence.
fn remove_child_texts(mut text: String, children: &[DeviceNode]) -> String {
    loop {
        let mut changed = false;
        for child in children {
            let needle = child.text.as_str();
            if needle.is_empty() {
                continue;
            }
            if let Some(pos) = text.find(needle) {
                text.replace_range(pos..pos + needle.len(), " ");
                text = flatten(&text);
                changed = true;
            }
        }
        if !changed {
            return text;
        }
    }
}

fn renumber(children: &mut [DeviceNode]) {
    for (i, child) in children.iter_mut().enumerate() {
        child.order = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitting::{create_brazilian_act_hierarchy, CitationAwareStrategy};
    use crate::types::ValidityStatus;
    use pretty_assertions::assert_eq;

    fn engine() -> SplitEngine<CitationAwareStrategy> {
        SplitEngine::new(create_brazilian_act_hierarchy(), CitationAwareStrategy::default())
    }

    fn split(text: &str) -> (BodyTree, Findings) {
        let mut findings = Findings::new();
        let tree = engine().split_body(text, &SplitContext::new(None), &mut findings);
        (tree, findings)
    }

    fn outline(nodes: &[DeviceNode]) -> Vec<(String, String)> {
        nodes
            .iter()
            .flat_map(DeviceNode::iter)
            .map(|n| (n.label.clone(), n.text.clone()))
            .collect()
    }

    #[test]
    fn test_article_with_paragraphs() {
        let (tree, findings) =
            split("Art. 1º Fica instituído o programa. § 1º O programa é gratuito. § 2º Revogado.");

        assert_eq!(tree.leading, "");
        assert_eq!(tree.devices.len(), 1);
        let article = &tree.devices[0];
        assert_eq!(article.label, "Art. 1º");
        assert_eq!(article.text, "Fica instituído o programa.");
        assert_eq!(article.order, 1);

        let children: Vec<(&str, &str, usize)> = article
            .children
            .iter()
            .map(|c| (c.label.as_str(), c.text.as_str(), c.order))
            .collect();
        assert_eq!(
            children,
            vec![("§ 1º", "O programa é gratuito.", 1), ("§ 2º", "Revogado.", 2)]
        );
        assert!(findings.diagnostics.is_empty());
    }

    #[test]
    fn test_citation_not_promoted() {
        let (tree, findings) = split("Art. 2º Aplica-se o disposto no art. 1º desta Lei.");
        assert_eq!(tree.devices.len(), 1);
        assert_eq!(tree.devices[0].text, "Aplica-se o disposto no art. 1º desta Lei.");
        assert_eq!(findings.diagnostics.len(), 1);
        assert_eq!(findings.diagnostics[0].code, DiagnosticCode::AmbiguousMarkerResolved);
    }

    #[test]
    fn test_full_hierarchy() {
        let text = "Art. 5º São deveres: I - zelar; II - cumprir: a) prazos; b) metas: 1. mensais; \
                    2. anuais; § 1º Aplica-se: I - aos servidores. Parágrafo único. Vale já.";
        let (tree, findings) = split(text);

        assert_eq!(
            outline(&tree.devices),
            vec![
                ("Art. 5º".into(), "São deveres:".into()),
                ("I".into(), "zelar;".into()),
                ("II".into(), "cumprir:".into()),
                ("a)".into(), "prazos;".into()),
                ("b)".into(), "metas:".into()),
                ("1.".into(), "mensais;".into()),
                ("2.".into(), "anuais;".into()),
                ("§ 1º".into(), "Aplica-se:".into()),
                ("I".into(), "aos servidores.".into()),
                ("Parágrafo único".into(), "Vale já.".into()),
            ]
        );
        assert_eq!(findings.orphans, 0);
    }

    #[test]
    fn test_orphan_alinea_under_article() {
        let (tree, findings) = split("Art. 3º Compete: a) planejar; b) executar.");
        let article = &tree.devices[0];
        assert_eq!(article.children.len(), 2);
        assert_eq!(article.children[0].kind, DeviceKind::Alinea);
        assert_eq!(findings.orphans, 2);
        assert!(findings
            .diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::OrphanChild));
    }

    #[test]
    fn test_orphan_item_under_article() {
        let (tree, findings) = split("Art. 1º Constam: 1. um; 2. dois.");
        let kinds: Vec<DeviceKind> = tree.devices[0].children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![DeviceKind::Item, DeviceKind::Item]);
        assert_eq!(findings.orphans, 2);
    }

    #[test]
    fn test_incisos_with_period_and_colon() {
        let (tree, findings) = split("Art. 1º Compete ao órgão: I. planejar; II: executar. Consta do Anexo I.");
        let article = &tree.devices[0];
        assert_eq!(
            outline(&article.children),
            vec![
                ("I".into(), "planejar;".into()),
                ("II".into(), "executar. Consta do Anexo I.".into()),
            ]
        );
        assert_eq!(findings.orphans, 0);
    }

    #[test]
    fn test_numbered_noun_is_not_an_inciso() {
        let (tree, findings) =
            split("Art. 1º Fica aprovado o Anexo I - Tabela de Cargos, parte integrante desta Lei.");
        assert!(tree.devices[0].children.is_empty());
        assert!(findings.diagnostics.iter().any(|d| {
            d.code == DiagnosticCode::AmbiguousMarkerResolved && d.message.contains("'anexo'")
        }));
    }

    #[test]
    fn test_headings_are_flat_siblings() {
        let (tree, _) = split(
            "TÍTULO I DAS DISPOSIÇÕES GERAIS CAPÍTULO I DO OBJETO Art. 1º Esta Lei dispõe. \
             CAPÍTULO II - DOS PRAZOS Art. 2º Os prazos contam.",
        );
        let top: Vec<(DeviceKind, &str, &str)> = tree
            .devices
            .iter()
            .map(|d| (d.kind, d.label.as_str(), d.text.as_str()))
            .collect();
        assert_eq!(
            top,
            vec![
                (DeviceKind::Title, "TÍTULO I", "DAS DISPOSIÇÕES GERAIS"),
                (DeviceKind::Chapter, "CAPÍTULO I", "DO OBJETO"),
                (DeviceKind::Article, "Art. 1º", "Esta Lei dispõe."),
                (DeviceKind::Chapter, "CAPÍTULO II", "DOS PRAZOS"),
                (DeviceKind::Article, "Art. 2º", "Os prazos contam."),
            ]
        );
        let orders: Vec<usize> = tree.devices.iter().map(|d| d.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_preamble_is_leading_text() {
        let (tree, _) = split("O GOVERNADOR DO ESTADO DECRETA: Art. 1º Fica aprovado.");
        assert_eq!(tree.leading, "O GOVERNADOR DO ESTADO DECRETA:");
        assert_eq!(tree.devices.len(), 1);
    }

    #[test]
    fn test_alteration_block_becomes_child() {
        let text = "Art. 1º A Lei nº 10 passa a vigorar com a seguinte redação: \
                    “Art. 5º Texto novo. § 1º Prazo novo.” (NR) Art. 2º Esta Lei entra em vigor.";
        let (tree, findings) = split(text);

        assert_eq!(tree.devices.len(), 2);
        let article = &tree.devices[0];
        assert_eq!(article.text, "A Lei nº 10 passa a vigorar com a seguinte redação:");
        assert_eq!(article.children.len(), 1);

        let alteration = &article.children[0];
        assert_eq!(alteration.kind, DeviceKind::Alteration);
        assert_eq!(alteration.label, "Art. 5º");
        assert_eq!(alteration.order, 1);
        assert_eq!(alteration.children[0].label, "Art. 5º");
        assert_eq!(alteration.children[0].text, "Texto novo.");
        assert_eq!(alteration.children[0].children[0].label, "§ 1º");
        assert_eq!(alteration.versions.len(), 1);
        assert_eq!(
            alteration.versions[0].texto_original,
            "Art. 5º Texto novo. § 1º Prazo novo."
        );
        assert!(findings.diagnostics.is_empty());
    }

    #[test]
    fn test_cited_article_does_not_label_alteration() {
        let text = "Art. 1º O art. 5º passa a vigorar acrescido do seguinte parágrafo: \
                    “Parágrafo único. Aplica-se o disposto no art. 3º.” (NR)";
        let (tree, _) = split(text);
        let alteration = &tree.devices[0].children[0];
        assert_eq!(alteration.kind, DeviceKind::Alteration);
        assert_eq!(alteration.label, "alteracao_1");
        assert!(alteration.iter().all(|d| d.kind != DeviceKind::Article));
    }

    #[test]
    fn test_revoked_wording_sets_status() {
        let text = "Art. 1º A Lei nº 2 passa a vigorar com as seguintes alterações: \
                    “Art. 4º (Revogado).” (NR) “Art. 6º Prazo de dez dias.” (NR)";
        let (tree, _) = split(text);
        let statuses: Vec<(&str, ValidityStatus)> = tree.devices[0]
            .children
            .iter()
            .map(|a| (a.label.as_str(), a.versions[0].status_vigencia))
            .collect();
        assert_eq!(
            statuses,
            vec![("Art. 4º", ValidityStatus::Revogado), ("Art. 6º", ValidityStatus::Vigente)]
        );
    }

    #[test]
    fn test_alteration_in_paragraph() {
        let text = "Art. 1º Altera a Lei. § 1º O art. 3º passa a vigorar com a seguinte redação: \
                    “Art. 3º Novo.” (NR) § 2º Outro.";
        let (tree, _) = split(text);
        let article = &tree.devices[0];
        assert_eq!(article.children.len(), 2);
        assert_eq!(article.children[0].children[0].kind, DeviceKind::Alteration);
        assert_eq!(article.children[1].label, "§ 2º");
    }

    #[test]
    fn test_unresolved_alteration_keeps_text() {
        let text = "Art. 1º O art. 3º passa a vigorar com a seguinte redação: novo texto.";
        let (tree, findings) = split(text);
        assert!(tree.devices[0].text.contains("passa a vigorar"));
        assert_eq!(findings.unresolved_alterations, 1);
    }

    #[test]
    fn test_leading_article_folded_when_enabled() {
        let text = "Nos termos do Art. 84 da Constituição. Art. 37 Fica criado o órgão. Art. 1º Texto. Art. 2º Outro.";
        let mut findings = Findings::new();
        let ctx = SplitContext::new(None).with_fold_leading_article(true);
        let tree = engine().split_body(text, &ctx, &mut findings);

        assert!(tree.leading.ends_with("Art. 37 Fica criado o órgão."));
        let labels: Vec<&str> = tree.devices.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Art. 1º", "Art. 2º"]);
        assert!(findings
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::LeadingArticleAsPreamble));
    }

    #[test]
    fn test_leading_article_kept_when_disabled() {
        let (tree, _) = split("Art. 37 Fica criado o órgão. Art. 38 Outro.");
        assert_eq!(tree.devices.len(), 2);
    }

    #[test]
    fn test_direct_children() {
        let markers = vec![
            Marker::new(DeviceKind::Inciso, "I", 0, 3),
            Marker::new(DeviceKind::Alinea, "a)", 10, 12),
            Marker::new(DeviceKind::Paragraph, "§ 1º", 20, 24),
            Marker::new(DeviceKind::Inciso, "I", 30, 33),
            Marker::new(DeviceKind::Paragraph, "§ 2º", 40, 44),
        ];
        let labels: Vec<String> = direct_children(markers).into_iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["I", "§ 1º", "§ 2º"]);
    }

    #[test]
    fn test_remove_child_texts() {
        let child = DeviceNode::new(DeviceKind::Paragraph, "§ 1º", "Revogado.");
        assert_eq!(
            remove_child_texts("Texto. Revogado. Fim.".into(), &[child]),
            "Texto. Fim."
        );
    }
}

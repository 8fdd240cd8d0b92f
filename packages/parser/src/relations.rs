//! Cross-reference relation markers.
//!
//! Device texts mention other acts, either in consolidation notes
//! ("(Redação dada pela Lei nº 13.000, de 2015)") or in running prose
//! ("nos termos da Lei nº 8.666, de 21 de junho de 1993"). The parser
//! only records the phrase and what it can read from it; resolving the
//! target act is left to a linker.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::types::{DeviceNode, Relation, RelationKind};

/// A numbered act: type, number and optional year.
const ACT: &str = concat!(
    r"\b(?P<tipo>Lei\s+Complementar|Lei\s+Ordin[áa]ria|Decreto-Lei|Decreto\s+Legislativo|Lei|Decreto",
    r"|Portaria|Resolu[çc][ãa]o|Instru[çc][ãa]o\s+Normativa|Emenda\s+Constitucional",
    r"|Medida\s+Provis[óo]ria)",
    r"\s+(?:n[º°o.]*\s*)?(?P<numero>\d[\d.]*(?:/\d{2,4})?)",
    r"(?:\s*,\s*de\s+(?:\d{1,2}º?\s+de\s+\p{L}+\s+de\s+)?(?P<ano>\d{4}))?",
);

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SPECIFIC: LazyLock<Vec<(RelationKind, Regex)>> = LazyLock::new(|| {
    [
        (RelationKind::Altera, r"reda[çc][ãa]o\s+dada\s+pel[oa]\s+"),
        (RelationKind::Revoga, r"revogad[oa]s?\s+pel[oa]\s+"),
        (RelationKind::Regulamenta, r"regulamentad[oa]s?\s+pel[oa]\s+"),
        (RelationKind::Remete, r"\(\s*vide\s+"),
    ]
    .into_iter()
    .map(|(kind, lead)| {
        let regex = Regex::new(&format!("(?i){lead}{ACT}")).expect("valid regex");
        (kind, regex)
    })
    .collect()
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static GENERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){ACT}")).expect("valid regex"));

/// Detect relation markers in a text, in source order.
///
/// Specific phrasings win over a plain mention of the same act.
///
/// # Examples
/// ```
/// use atlas_parser::relations::detect_relations;
/// use atlas_parser::RelationKind;
///
/// let found = detect_relations("Texto. (Redação dada pela Lei nº 13.000, de 2015)");
/// assert_eq!(found[0].tipo, RelationKind::Altera);
/// assert_eq!(found[0].numero.as_deref(), Some("13.000"));
/// assert_eq!(found[0].ano.as_deref(), Some("2015"));
/// ```
pub fn detect_relations(text: &str) -> Vec<Relation> {
    let mut found: Vec<(Range<usize>, Relation)> = Vec::new();

    for (kind, regex) in SPECIFIC.iter() {
        for caps in regex.captures_iter(text) {
            if let Some(whole) = caps.get(0) {
                found.push((whole.range(), relation(*kind, &caps)));
            }
        }
    }

    for caps in GENERIC.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let overlaps = found
            .iter()
            .any(|(range, _)| range.start < whole.end() && whole.start() < range.end);
        if !overlaps {
            found.push((whole.range(), relation(RelationKind::Cita, &caps)));
        }
    }

    found.sort_by_key(|(range, _)| range.start);
    found.into_iter().map(|(_, relation)| relation).collect()
}

/// Attach relation markers to every node of a tree.
pub fn attach_relations(devices: &mut [DeviceNode]) {
    for node in devices {
        node.relations = detect_relations(&node.text);
        attach_relations(&mut node.children);
    }
}

fn relation(tipo: RelationKind, caps: &regex::Captures<'_>) -> Relation {
    Relation {
        tipo,
        trecho: caps.get(0).map_or_else(String::new, |m| m.as_str().to_string()),
        tipo_ato: caps.name("tipo").map(|m| act_type_slug(m.as_str())),
        numero: caps
            .name("numero")
            .map(|m| m.as_str().trim_end_matches('.').to_string()),
        ano: caps.name("ano").map(|m| m.as_str().to_string()),
    }
}

/// URN-style act type: "Lei Complementar" → `lei.complementar`,
/// "Decreto-Lei" → `decreto.lei`, "Resolução" → `resolucao`.
#[must_use]
pub fn act_type_slug(raw: &str) -> String {
    let ascii: String = raw.nfd().filter(char::is_ascii).collect();
    let slug = ascii
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    if slug == "lei.ordinaria" {
        "lei".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<RelationKind> {
        detect_relations(text).into_iter().map(|r| r.tipo).collect()
    }

    #[test]
    fn test_specific_relations() {
        assert_eq!(
            kinds("I - prazo; (Redação dada pela Lei Complementar nº 100, de 2019)"),
            vec![RelationKind::Altera]
        );
        assert_eq!(kinds("§ 2º (Revogado pela Lei nº 9.000, de 2001)"), vec![RelationKind::Revoga]);
        assert_eq!(
            kinds("Regulamentado pelo Decreto nº 7.000, de 5 de maio de 2010"),
            vec![RelationKind::Regulamenta]
        );
        assert_eq!(kinds("(Vide Lei nº 1.234, de 2020)"), vec![RelationKind::Remete]);
    }

    #[test]
    fn test_generic_citations() {
        let found = detect_relations(
            "nos termos da Lei nº 8.666, de 21 de junho de 1993, e do Decreto-Lei nº 200.",
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].tipo, RelationKind::Cita);
        assert_eq!(found[0].tipo_ato.as_deref(), Some("lei"));
        assert_eq!(found[0].numero.as_deref(), Some("8.666"));
        assert_eq!(found[0].ano.as_deref(), Some("1993"));
        assert_eq!(found[1].tipo_ato.as_deref(), Some("decreto.lei"));
        assert_eq!(found[1].numero.as_deref(), Some("200"));
        assert_eq!(found[1].ano, None);
    }

    #[test]
    fn test_specific_wins_over_generic() {
        let found = detect_relations("(Redação dada pela Lei nº 10, de 2000) e Lei nº 11, de 2001");
        assert_eq!(
            found.iter().map(|r| r.tipo).collect::<Vec<_>>(),
            vec![RelationKind::Altera, RelationKind::Cita]
        );
        assert_eq!(found[1].numero.as_deref(), Some("11"));
    }

    #[test]
    fn test_mentions_without_number_are_ignored() {
        assert!(detect_relations("Esta Lei entra em vigor; revoga-se o decreto anterior.").is_empty());
    }

    #[test]
    fn test_act_type_slug() {
        assert_eq!(act_type_slug("Lei Complementar"), "lei.complementar");
        assert_eq!(act_type_slug("Lei Ordinária"), "lei");
        assert_eq!(act_type_slug("Decreto-Lei"), "decreto.lei");
        assert_eq!(act_type_slug("Resolução"), "resolucao");
        assert_eq!(act_type_slug("Medida   Provisória"), "medida.provisoria");
    }

    #[test]
    fn test_attach_relations_recurses() {
        let mut devices = vec![DeviceNode::new(
            crate::types::DeviceKind::Article,
            "Art. 1º",
            "Caput.",
        )
        .with_children(vec![DeviceNode::new(
            crate::types::DeviceKind::Paragraph,
            "§ 1º",
            "Conforme a Portaria nº 12, de 2022.",
        )])];
        attach_relations(&mut devices);

        assert!(devices[0].relations.is_empty());
        assert_eq!(devices[0].children[0].relations.len(), 1);
        assert_eq!(
            devices[0].children[0].relations[0].tipo_ato.as_deref(),
            Some("portaria")
        );
    }
}

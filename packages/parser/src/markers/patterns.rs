//! Statically-initialised pattern tables for structural markers.
//!
//! Every pattern runs over flattened text (single spaces, no newlines).
//! Rust regexes have no look-around, so the context rules that patterns
//! cannot express (word boundaries before roman numerals, the character
//! before an item number) are checked by the scanner.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::DeviceKind;

/// "Art. 5º", "art. 10", "Artigo 3º", "Art. 5º-A".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:art(?:igo)?)\.?\s*\d+[ºo°ª]?(?:-[A-Z]\b)?").expect("valid regex")
});

/// "§ 1º", "§2o".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"§\s*\d+[ºo°ª]?(?:-[A-Z]\b)?").expect("valid regex")
});

/// "Parágrafo único".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static SOLE_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:par[áa]grafo\s+[úu]nico)\b").expect("valid regex")
});

/// "IV -", "II –", "III. ", "V: ". Roman validity and the list context of
/// the period and colon forms are checked by the scanner.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static INCISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[IVXLCDM]+(?:\s*[-–—]|[.:]\s)").expect("valid regex"));

/// "a)", "b)".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static ALINEA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z]\)").expect("valid regex"));

/// "1. ", "12. ". The preceding context is checked by the scanner.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}\.\s").expect("valid regex"));

/// Grouping headings in upper or title case: "CAPÍTULO II", "Seção I",
/// "PARTE GERAL", "TÍTULO ÚNICO".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(T[ÍI]TULO|T[íi]tulo|LIVRO|Livro|PARTE|Parte|SUBSE[ÇC][ÃA]O|Subse[çc][ãa]o",
        r"|SE[ÇC][ÃA]O|Se[çc][ãa]o|CAP[ÍI]TULO|Cap[íi]tulo)",
        r"\s+([IVXLCDM]+|[ÚU]NICO|[Úú]nico|GERAL|Geral|ESPECIAL|Especial)\b",
    ))
    .expect("valid regex")
});

/// Marker kinds searched at the top level of a body.
pub const TOP_LEVEL_KINDS: &[DeviceKind] = &[
    DeviceKind::Article,
    DeviceKind::Part,
    DeviceKind::Book,
    DeviceKind::Title,
    DeviceKind::Chapter,
    DeviceKind::Section,
    DeviceKind::Subsection,
];

/// Pattern for a marker kind.
///
/// All heading kinds share one pattern; the keyword decides the kind.
#[must_use]
pub fn pattern_for(kind: DeviceKind) -> Option<&'static Regex> {
    match kind {
        DeviceKind::Article => Some(&*ARTICLE),
        DeviceKind::Paragraph => Some(&*PARAGRAPH),
        DeviceKind::SoleParagraph => Some(&*SOLE_PARAGRAPH),
        DeviceKind::Inciso => Some(&*INCISO),
        DeviceKind::Alinea => Some(&*ALINEA),
        DeviceKind::Item => Some(&*ITEM),
        DeviceKind::Title
        | DeviceKind::Book
        | DeviceKind::Part
        | DeviceKind::Chapter
        | DeviceKind::Section
        | DeviceKind::Subsection => Some(&*HEADING),
        DeviceKind::Alteration | DeviceKind::Auxiliary => None,
    }
}

/// Heading kind named by a keyword as matched by [`HEADING`].
#[must_use]
pub fn heading_kind(keyword: &str) -> Option<DeviceKind> {
    let lower = keyword.to_lowercase();
    let kind = if lower.starts_with("subse") {
        DeviceKind::Subsection
    } else if lower.starts_with("se") {
        DeviceKind::Section
    } else if lower.starts_with("cap") {
        DeviceKind::Chapter
    } else if lower.starts_with("t") {
        DeviceKind::Title
    } else if lower.starts_with("livro") {
        DeviceKind::Book
    } else if lower.starts_with("parte") {
        DeviceKind::Part
    } else {
        return None;
    };
    Some(kind)
}

/// Priority when two markers claim the same span.
///
/// Article beats subsection, subsection beats section, section beats
/// chapter, and chapter beats the remaining kinds.
#[must_use]
pub fn priority(kind: DeviceKind) -> u8 {
    match kind {
        DeviceKind::Article => 10,
        DeviceKind::Subsection => 9,
        DeviceKind::Section => 8,
        DeviceKind::Chapter => 7,
        DeviceKind::Title => 6,
        DeviceKind::Book => 5,
        DeviceKind::Part => 4,
        DeviceKind::Paragraph | DeviceKind::SoleParagraph => 3,
        DeviceKind::Inciso => 2,
        DeviceKind::Alinea => 1,
        DeviceKind::Item | DeviceKind::Alteration | DeviceKind::Auxiliary => 0,
    }
}

/// Human-readable listing of the marker patterns and disambiguation rules.
///
/// Shown by the `heuristics` command and available to assisted reviewers
/// so they apply the same conventions as the deterministic parser.
#[must_use]
pub fn describe_heuristics() -> String {
    let rows: [(&str, &Regex); 8] = [
        ("artigo", &*ARTICLE),
        ("paragrafo", &*PARAGRAPH),
        ("paragrafo_unico", &*SOLE_PARAGRAPH),
        ("inciso", &*INCISO),
        ("alinea", &*ALINEA),
        ("item", &*ITEM),
        ("titulo/livro/parte/capitulo/secao/subsecao", &*HEADING),
        ("alteracao", &*crate::alteration::TRIGGER),
    ];

    let mut out = String::from("Marker patterns:\n");
    for (name, regex) in rows {
        out.push_str(&format!("  {name:<44} {}\n", regex.as_str()));
    }
    out.push_str(concat!(
        "\nHierarchy:\n",
        "  artigo    -> paragrafo | paragrafo_unico | inciso   (orphan: alinea, item)\n",
        "  paragrafo -> inciso                                 (orphan: alinea, item)\n",
        "  inciso    -> alinea                                 (orphan: item)\n",
        "  alinea    -> item\n",
        "  headings (titulo, livro, parte, capitulo, secao, subsecao) are flat siblings\n",
        "\nCitation rules (artigo, paragrafo, headings):\n",
        "  - accepted outright at the start of the text or after a sentence end\n",
        "  - rejected when the preceding words end in a citing preposition\n",
        "    (no, na, do, da, conforme, nos termos de, deste, nesta, ...)\n",
        "  - rejected when followed by a citing continuation\n",
        "    (da Lei, do Decreto, deste artigo, §, inciso, alinea, ...)\n",
        "  - a heading that opens a sentence is still rejected when a lowercase\n",
        "    'da Lei', 'do Decreto', ... follows it\n",
        "\nList rules (inciso, alinea, item):\n",
        "  - 'I.' and 'I:' only count after ':' or ';' (or '; e'); 'I -' counts anywhere\n",
        "  - rejected after a noun numbered in prose (Anexo I, Grupo C, Tabela II, incisos)\n",
        "  - rejected inside an enumeration of citations (incisos I e II, alineas a) e b))\n",
        "\nSegmentation:\n",
        "  - a line starting with ANEXO, QUADRO, TABELA or APÊNDICE opens an annex\n",
        "  - a trailing '<place>, <day> de <month> de <year>' block is the closing clause\n",
        "  - quoted blocks ending in (NR) after 'passa a vigorar com a seguinte redação'\n",
        "    are amendment blocks parsed as nested trees\n",
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(regex: &Regex, text: &str) -> Vec<String> {
        regex.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }

    #[test]
    fn test_article_pattern() {
        assert_eq!(
            matches(&ARTICLE, "Art. 1º X. art. 10 Y. Artigo 3º Z. Art. 5º-A W."),
            vec!["Art. 1º", "art. 10", "Artigo 3º", "Art. 5º-A"]
        );
    }

    #[test]
    fn test_article_pattern_ignores_plural_and_words() {
        assert!(matches(&ARTICLE, "arts. 1º e 2º, parte 3").is_empty());
        assert!(matches(&ARTICLE, "a arte 5 vezes").is_empty());
    }

    #[test]
    fn test_paragraph_patterns() {
        assert_eq!(matches(&PARAGRAPH, "§ 1º a. §2o b."), vec!["§ 1º", "§2o"]);
        assert_eq!(
            matches(&SOLE_PARAGRAPH, "Parágrafo único. X PARÁGRAFO ÚNICO Y"),
            vec!["Parágrafo único", "PARÁGRAFO ÚNICO"]
        );
    }

    #[test]
    fn test_inciso_alinea_item_patterns() {
        assert_eq!(matches(&INCISO, "I - um; II – dois; IV—três"), vec!["I -", "II –", "IV—"]);
        assert_eq!(matches(&INCISO, "I. um; II: dois; III.5"), vec!["I. ", "II: "]);
        assert_eq!(matches(&ALINEA, "a) um; b) dois"), vec!["a)", "b)"]);
        assert_eq!(matches(&ITEM, "1. um; 2. dois"), vec!["1. ", "2. "]);
    }

    #[test]
    fn test_heading_pattern() {
        let caps = HEADING.captures("CAPÍTULO II DAS DISPOSIÇÕES").unwrap();
        assert_eq!(&caps[1], "CAPÍTULO");
        assert_eq!(&caps[2], "II");

        assert!(HEADING.is_match("Seção I Do objeto"));
        assert!(HEADING.is_match("PARTE GERAL"));
        assert!(HEADING.is_match("TÍTULO ÚNICO"));
        assert!(!HEADING.is_match("capítulo II"));
    }

    #[test]
    fn test_heading_kind() {
        assert_eq!(heading_kind("SUBSEÇÃO"), Some(DeviceKind::Subsection));
        assert_eq!(heading_kind("Seção"), Some(DeviceKind::Section));
        assert_eq!(heading_kind("CAPÍTULO"), Some(DeviceKind::Chapter));
        assert_eq!(heading_kind("TÍTULO"), Some(DeviceKind::Title));
        assert_eq!(heading_kind("Livro"), Some(DeviceKind::Book));
        assert_eq!(heading_kind("PARTE"), Some(DeviceKind::Part));
        assert_eq!(heading_kind("ANEXO"), None);
    }

    #[test]
    fn test_priority_order() {
        assert!(priority(DeviceKind::Article) > priority(DeviceKind::Subsection));
        assert!(priority(DeviceKind::Subsection) > priority(DeviceKind::Section));
        assert!(priority(DeviceKind::Section) > priority(DeviceKind::Chapter));
        assert!(priority(DeviceKind::Chapter) > priority(DeviceKind::Title));
    }

    #[test]
    fn test_describe_heuristics_lists_every_kind() {
        let text = describe_heuristics();
        for name in ["artigo", "paragrafo_unico", "inciso", "alinea", "item", "alteracao"] {
            assert!(text.contains(name), "missing {name}");
        }
    }
}

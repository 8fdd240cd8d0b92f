//! Text canonicalization.
//!
//! [`normalize`] turns extracted text into the canonical form every other
//! stage works on. [`normalize_for_hash`] is the stricter form that content
//! hashes are computed over, and [`strip_editorial_notes`] removes the
//! consolidation notes that publishers insert between parentheses.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::types::NormalizationAudit;

/// Rule name recorded when editorial parentheticals are removed.
pub const RULE_EDITORIAL_NOTES: &str = "notas_editoriais";

/// Words that mark a parenthetical as an editorial note rather than text.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static EDITORIAL_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:reda[çc][ãa]o dada|inclu[íi]d[oa]|revogad[oa]|vide|regulamenta|acrescentad[oa]|alterad[oa]|renumerad[oa]|com reda[çc][ãa]o|dispositivo vetado|vig[êe]ncia|produ[çc][ãa]o de efeito)",
    )
    .expect("valid regex")
});

/// Innermost parenthetical.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("valid regex"));

/// Canonicalize raw act text.
///
/// - Unicode NFC, byte-order marks removed
/// - `\r\n` and `\r` become `\n`
/// - horizontal whitespace runs collapse to one space, lines are trimmed
/// - lines made only of digits (page numbers) are dropped
/// - runs of blank lines collapse to one blank line
/// - the result is trimmed
///
/// Never fails; an empty result is the caller's concern.
///
/// # Examples
/// ```
/// use atlas_parser::normalize::normalize;
///
/// let text = "Art. 1º  Texto.\r\n\r\n12\r\n\r\n\r\nArt. 2º\tOutro.";
/// assert_eq!(normalize(text), "Art. 1º Texto.\n\nArt. 2º Outro.");
/// ```
pub fn normalize(raw: &str) -> String {
    let composed: String = raw.chars().filter(|c| *c != '\u{feff}').nfc().collect();
    let unified = composed.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if is_page_number(&collapsed) {
            continue;
        }
        if collapsed.is_empty() && lines.last().is_some_and(String::is_empty) {
            continue;
        }
        lines.push(collapsed);
    }

    lines.join("\n").trim().to_string()
}

fn is_page_number(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Canonical form used for content hashing: NFC with every whitespace run,
/// newlines included, collapsed to one space.
pub fn normalize_for_hash(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Flatten text to a single line for structural scanning.
pub fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove editorial parentheticals such as "(Redação dada pela Lei nº 1, de 2020)".
///
/// Parentheticals without a trigger word (e.g. "(NR)", "(I)", "(vinte dias)")
/// are kept. The result is flattened.
pub fn strip_editorial_notes(text: &str) -> String {
    strip_editorial_notes_audited(text).0
}

/// [`strip_editorial_notes`], also reporting which rules changed the text
/// and how many characters the removed notes held.
///
/// # Examples
/// ```
/// use atlas_parser::normalize::strip_editorial_notes_audited;
///
/// let (text, audit) = strip_editorial_notes_audited("Texto (Incluído pela Lei nº 2).");
/// assert_eq!(text, "Texto.");
/// assert_eq!(audit.regras_aplicadas, vec!["notas_editoriais"]);
/// assert_eq!(audit.removido_total_chars, 24);
/// ```
pub fn strip_editorial_notes_audited(text: &str) -> (String, NormalizationAudit) {
    let mut removed = 0;
    let stripped = PARENTHETICAL.replace_all(text, |caps: &regex::Captures<'_>| {
        if EDITORIAL_TRIGGER.is_match(&caps[1]) {
            removed += caps[0].chars().count();
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let flat = flatten(&stripped);
    // Removal can leave "texto ." behind.
    let cleaned = flat.replace(" .", ".").replace(" ;", ";").replace(" ,", ",");

    let mut audit = NormalizationAudit::default();
    if removed > 0 {
        audit.regras_aplicadas.push(RULE_EDITORIAL_NOTES.to_string());
        audit.removido_total_chars = removed;
    }
    (cleaned, audit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_normalize_drops_page_numbers() {
        assert_eq!(normalize("Art. 1º Texto\n  17  \ncontinua"), "Art. 1º Texto\ncontinua");
    }

    #[test]
    fn test_normalize_keeps_numbers_inside_text() {
        assert_eq!(normalize("Lei nº 1234\n2020 foi o ano"), "Lei nº 1234\n2020 foi o ano");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  a \t\u{a0} b  \n\n\n\n c "), "a b\n\nc");
    }

    #[test]
    fn test_normalize_removes_bom_and_composes() {
        let decomposed = "\u{feff}Art. 1\u{ba} Fica institu\u{69}\u{301}do.";
        assert_eq!(normalize(decomposed), "Art. 1º Fica instituído.");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t\r\n 3 \n"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Art. 1º  X\r\n\r\n\r\n2\r\nY",
            "\n\n  \u{feff} a\u{301}\n\n 1 \n\n b",
            "Goiânia, 10 de março de 2023.\n\n\nJOÃO",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_for_hash_collapses_newlines() {
        assert_eq!(normalize_for_hash("a\n b\t\tc "), "a b c");
        assert_eq!(
            normalize_for_hash("institu\u{69}\u{301}do"),
            normalize_for_hash("instituído")
        );
    }

    #[test]
    fn test_strip_editorial_notes() {
        let text = "O prazo é de trinta dias. (Redação dada pela Lei nº 2.000, de 2021)";
        assert_eq!(strip_editorial_notes(text), "O prazo é de trinta dias.");

        let text = "I - primeiro inciso (Incluído pela Lei nº 10, de 2019);";
        assert_eq!(strip_editorial_notes(text), "I - primeiro inciso;");
    }

    #[test]
    fn test_strip_editorial_notes_keeps_plain_parentheticals() {
        let text = "no prazo de 10 (dez) dias, conforme o inciso (I)";
        assert_eq!(strip_editorial_notes(text), text);

        let text = "adotará as (providências cabíveis)";
        assert_eq!(strip_editorial_notes(text), text);
    }
}

//! Citation-versus-heading disambiguation.
//!
//! A marker such as "art. 1º" is very often a cross-reference inside prose
//! ("aplica-se o disposto no art. 1º desta Lei") rather than the start of a
//! new device. The classifier looks at a short window of text on each side
//! of the candidate. The word lists are empirical and meant to be tuned
//! against real acts; the window sizes come from
//! [`ParserConfig`](crate::config::ParserConfig).

use regex::Regex;
use std::sync::LazyLock;

use super::scanner::roman_to_int;
use super::{Certainty, Marker};
use crate::types::DeviceKind;

/// Words that, ending the text before a marker, introduce a cross-reference.
const CITING_WORDS: &[&str] = &[
    "no", "na", "nos", "nas", "do", "da", "dos", "das", "ao", "aos", "à", "às", "o", "a", "os",
    "as", "pelo", "pela", "pelos", "pelas", "conforme", "segundo", "deste", "desta", "desse",
    "dessa", "desses", "dessas", "neste", "nesta", "nesse", "nessa", "e", "ou", "com", "em",
    "sob", "até", "vide", "ver",
];

/// Nouns that take a roman numeral or a letter in prose ("Anexo I",
/// "Grupo C", "incisos I"), so a list marker right after them is a label.
const NUMBERED_NOUNS: &[&str] = &[
    "anexo", "anexos", "apêndice", "capítulo", "capitulo", "seção", "secao", "subseção",
    "subsecao", "título", "titulo", "livro", "parte", "tabela", "tabelas", "quadro", "quadros",
    "grupo", "grupos", "classe", "classes", "tipo", "tipos", "nível", "nivel", "padrão", "padrao",
    "categoria", "faixa", "fase", "etapa", "inciso", "incisos", "alínea", "alinea", "alíneas",
    "alineas",
];

/// Two-word phrases with the same effect.
const CITING_PHRASES: &[&str] = &["nos termos", "na forma", "de acordo", "por força"];

/// Sentence boundary inside the prefix window. Abbreviations such as
/// "art. 5º" do not count because a digit follows the period.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[;:!?]\s|\.\s+\p{Lu})").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w§ºª°]+").expect("valid regex"));

/// Prefix ending in a device word: "... do §", "... inciso", "... alínea".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PREFIX_DEVICE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:§|\bart\.?|\bartigo|\binciso|\bal[íi]nea|\bcaput)\s*$").expect("valid regex")
});

/// Prefix ending in an article reference: "no art. 5º, " before "§ 1º".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PREFIX_ARTICLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bart(?:igo)?\.?\s*\d+[ºo°ª]?(?:-[A-Z])?\s*,?\s*$").expect("valid regex")
});

/// Suffix continuing a cross-reference: "desta Lei", "do Decreto", ", § 2º".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUFFIX_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^[\s,;:]*(?:",
        r"(?:d[oa]s?|n[oa]s?|a[os]?|às?|de|dest[ea]s?|nest[ea]s?|ness[ea]s?|dess[ea]s?|pel[oa]s?)\s+",
        r"(?:(?:artigos?|arts?|par[áa]grafos?|incisos?|al[íi]neas?|itens|item|caput|lei|decreto|",
        r"portaria|resolu[çc][ãa]o|constitui[çc][ãa]o|c[óo]digo|emenda|medida|instru[çc][ãa]o|",
        r"regimento|estatuto|cap[íi]tulo|se[çc][ãa]o|subse[çc][ãa]o|t[íi]tulo|livro|anexo)\b|§)",
        r"|(?:§|(?:incisos?|al[íi]neas?|caput)\b)",
        r")",
    ))
    .expect("valid regex")
});

/// Names of other acts right after a marker that opens a sentence:
/// "Art. 2º da Lei nº 5 fica revogado". The preposition must be lowercase,
/// since a device's own text starts with a capital.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ACT_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[\s,]*(?:d[oa]s?|dest[ea]s?)\s+",
        r"(?i:lei|decreto|portaria|resolu[çc][ãa]o|constitui[çc][ãa]o|c[óo]digo|emenda|medida\s+provis[óo]ria)\b",
    ))
    .expect("valid regex")
});

/// Why a candidate was judged to be a cross-reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationCue {
    /// Preceded by a citing word or phrase ("no", "nos termos").
    CitingWord(String),
    /// Preceded by a device reference ("§", "art. 5º,").
    DeviceReference,
    /// Followed by a reference continuation ("desta Lei", ", inciso II").
    Continuation,
    /// A list marker labelling a noun ("Anexo I -", "Grupo C -").
    NumberedNoun(String),
    /// A list marker inside an enumeration ("incisos I e II -").
    Enumeration,
}

impl std::fmt::Display for CitationCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CitingWord(word) => write!(f, "preceded by '{word}'"),
            Self::DeviceReference => f.write_str("preceded by a device reference"),
            Self::Continuation => f.write_str("followed by a reference continuation"),
            Self::NumberedNoun(noun) => write!(f, "label of '{noun}'"),
            Self::Enumeration => f.write_str("part of an enumeration of citations"),
        }
    }
}

/// Outcome of classifying a candidate marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Heading(Certainty),
    Citation(CitationCue),
}

/// Decide whether `marker` opens a device or cites one.
///
/// # Arguments
/// * `text` - The text the marker was found in
/// * `marker` - The candidate
/// * `prefix_chars` - How far back to look for citing words
/// * `suffix_chars` - How far ahead to look for continuations
///
/// # Examples
/// ```
/// use atlas_parser::markers::{classify, find_candidates, Verdict};
/// use atlas_parser::DeviceKind;
///
/// let text = "Art. 2º Aplica-se o disposto no art. 1º desta Lei.";
/// let markers = find_candidates(text, 0..text.len(), &[DeviceKind::Article], &[]);
/// assert!(matches!(classify(text, &markers[0], 40, 60), Verdict::Heading(_)));
/// assert!(matches!(classify(text, &markers[1], 40, 60), Verdict::Citation(_)));
/// ```
pub fn classify(text: &str, marker: &Marker, prefix_chars: usize, suffix_chars: usize) -> Verdict {
    let before = &text[..marker.start];
    let after = head_chars(&text[marker.end..], suffix_chars);

    if marker.is_capitalized() && opens_sentence(before) {
        if ACT_CONTINUATION.is_match(after) {
            return Verdict::Citation(CitationCue::Continuation);
        }
        return Verdict::Heading(Certainty::Strong);
    }

    if let Some(cue) = prefix_cue(tail_chars(before, prefix_chars)) {
        return Verdict::Citation(cue);
    }

    if SUFFIX_CONTINUATION.is_match(after) {
        return Verdict::Citation(CitationCue::Continuation);
    }

    if marker.is_capitalized() {
        Verdict::Heading(Certainty::Plain)
    } else {
        Verdict::Heading(Certainty::Weak)
    }
}

/// Decide whether an inciso, alínea or item marker opens a list entry.
///
/// List markers are accepted unless the word before them shows a numeral
/// used in prose: a numbered noun ("Anexo I - Tabela") or an enumeration
/// of cited devices ("os incisos I e II -"). A word closed by ":", ";" or
/// "." ends the previous entry and never counts.
///
/// # Examples
/// ```
/// use atlas_parser::markers::{classify_list_marker, find_candidates, Verdict};
/// use atlas_parser::DeviceKind;
///
/// let text = "Compete: I - aprovar o Anexo II - Tabela de Cargos;";
/// let markers = find_candidates(text, 0..text.len(), &[DeviceKind::Inciso], &[]);
/// assert!(matches!(classify_list_marker(text, &markers[0]), Verdict::Heading(_)));
/// assert!(matches!(classify_list_marker(text, &markers[1]), Verdict::Citation(_)));
/// ```
pub fn classify_list_marker(text: &str, marker: &Marker) -> Verdict {
    let mut words = text[..marker.start].split_whitespace().rev();
    let Some(previous) = words.next().filter(|w| !closes_entry(w)) else {
        return Verdict::Heading(Certainty::Strong);
    };

    let word = bare_word(previous).to_lowercase();
    if NUMBERED_NOUNS.contains(&word.as_str()) {
        return Verdict::Citation(CitationCue::NumberedNoun(word));
    }

    let listed = if word == "e" || word == "ou" {
        words.next().filter(|w| !closes_entry(w))
    } else {
        Some(previous)
    };
    if listed.is_some_and(|w| is_sibling_label(marker.kind, w)) {
        return Verdict::Citation(CitationCue::Enumeration);
    }

    Verdict::Heading(Certainty::Strong)
}

fn closes_entry(word: &str) -> bool {
    word.ends_with([':', ';', '.'])
}

fn bare_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Whether `word` is itself a label of the same kind ("I,", "a)").
fn is_sibling_label(kind: DeviceKind, word: &str) -> bool {
    match kind {
        DeviceKind::Inciso => roman_to_int(bare_word(word)).is_some(),
        DeviceKind::Alinea => {
            let word = word.trim_end_matches(',');
            let mut chars = word.chars();
            matches!(
                (chars.next(), chars.next(), chars.next()),
                (Some(letter), Some(')'), None) if letter.is_ascii_lowercase()
            )
        }
        _ => false,
    }
}

/// Whether the text before a marker ends a sentence or a heading name.
fn opens_sentence(before: &str) -> bool {
    let trimmed = before.trim_end();
    let Some(last) = trimmed.chars().next_back() else {
        return true;
    };
    if matches!(last, '.' | ';' | ':' | '!' | '?' | '"' | '”' | ')') {
        return true;
    }
    // Heading names are set in capitals: "DAS DISPOSIÇÕES GERAIS Art. 1º".
    trimmed.split_whitespace().next_back().is_some_and(|word| {
        let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
        letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
    })
}

fn prefix_cue(window: &str) -> Option<CitationCue> {
    let clause = SENTENCE_BOUNDARY
        .find_iter(window)
        .last()
        .map_or(window, |m| &window[m.start() + 1..]);

    if PREFIX_DEVICE_WORD.is_match(clause) || PREFIX_ARTICLE_REFERENCE.is_match(clause) {
        return Some(CitationCue::DeviceReference);
    }

    let tokens: Vec<String> = TOKEN
        .find_iter(clause)
        .map(|t| t.as_str().to_lowercase())
        .collect();
    let last = tokens.last()?;
    if CITING_WORDS.contains(&last.as_str()) {
        return Some(CitationCue::CitingWord(last.clone()));
    }
    if let [.., a, b] = tokens.as_slice() {
        let phrase = format!("{a} {b}");
        if CITING_PHRASES.contains(&phrase.as_str()) {
            return Some(CitationCue::CitingWord(phrase));
        }
    }
    None
}

/// Last `n` characters of `s`.
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}

/// First `n` characters of `s`.
fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

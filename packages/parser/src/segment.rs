//! Body/annex segmentation.
//!
//! Annexes, tables and schedules are introduced by a line starting with an
//! uppercase keyword (`ANEXO`, `QUADRO`, `TABELA`, `APÊNDICE`), optionally
//! followed by an ordinal. Everything before the first such line is the
//! body; each marker opens a flat annex block that runs to the next marker.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::AnnexNode;

/// Annex marker at the start of a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LINE_ANNEX_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:ANEXO|QUADRO|TABELA|AP[ÊE]NDICE)(?:[ \t]+(?:[IVXLCDM]+|\d+|[ÚU]NICO)\b[^\n]*)?$",
    )
    .expect("valid regex")
});

/// Annex marker inside single-line text; the ordinal is mandatory here.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INLINE_ANNEX_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:ANEXO|QUADRO|TABELA|AP[ÊE]NDICE) (?:[IVXLCDM]+|[ÚU]NICO)\b")
        .expect("valid regex")
});

/// Title part of an annex heading.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANNEX_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(ANEXO|QUADRO|TABELA|AP[ÊE]NDICE)(?:[ \t]+([IVXLCDM]+|\d+|[ÚU]NICO)\b)?[ \t]*[:\-–—]?[ \t]*",
    )
    .expect("valid regex")
});

/// Words that, right before a marker, make it a mention ("conforme o ANEXO I").
const MENTION_WORDS: &[&str] = &[
    "o", "a", "os", "as", "no", "na", "nos", "nas", "do", "da", "dos", "das", "ao", "aos", "em",
    "e", "ou", "conforme", "constante", "constantes", "vide", "ver",
];

/// Result of segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    /// Text before the first annex marker, trimmed.
    pub body: String,
    pub annexes: Vec<AnnexNode>,
    /// An annex marker opens the text.
    pub empty_body: bool,
}

/// Split normalized text into body and annexes.
///
/// # Examples
/// ```
/// use atlas_parser::segment::segment;
///
/// let segments = segment("Art. 1º Fica aprovada a tabela.\nANEXO I\nCargo | Vagas");
/// assert_eq!(segments.body, "Art. 1º Fica aprovada a tabela.");
/// assert_eq!(segments.annexes[0].titulo, "ANEXO I");
/// ```
pub fn segment(text: &str) -> Segments {
    let starts = annex_starts(text);

    let Some(&first) = starts.first() else {
        return Segments {
            body: text.trim().to_string(),
            annexes: Vec::new(),
            empty_body: false,
        };
    };

    let mut annexes = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        annexes.push(split_annex(&text[start..end]));
    }
    tracing::debug!(count = annexes.len(), offset = first, "annexes found");

    Segments {
        body: text[..first].trim().to_string(),
        annexes,
        empty_body: first == 0,
    }
}

/// Byte offsets of accepted annex markers, ascending.
fn annex_starts(text: &str) -> Vec<usize> {
    let pattern: &Regex = if text.contains('\n') {
        &LINE_ANNEX_MARKER
    } else {
        &INLINE_ANNEX_MARKER
    };
    pattern
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&start| !is_mention(&text[..start]))
        .collect()
}

fn is_mention(before: &str) -> bool {
    before
        .split_whitespace()
        .next_back()
        .is_some_and(|word| MENTION_WORDS.contains(&word.to_lowercase().as_str()))
}

/// Split an annex block into its title and content.
///
/// The title is the keyword plus an optional ordinal; whatever follows on
/// the heading line (after `:` or a dash) starts the content.
pub fn split_annex(block: &str) -> AnnexNode {
    let block = block.trim();
    match ANNEX_TITLE.captures(block) {
        Some(caps) => {
            let keyword = &caps[1];
            let titulo = match caps.get(2) {
                Some(ordinal) => format!("{keyword} {}", ordinal.as_str()),
                None => keyword.to_string(),
            };
            let rest = caps.get(0).map_or(block, |m| &block[m.end()..]);
            AnnexNode {
                titulo,
                conteudo: rest.trim().to_string(),
            }
        }
        None => AnnexNode {
            titulo: String::new(),
            conteudo: block.to_string(),
        },
    }
}

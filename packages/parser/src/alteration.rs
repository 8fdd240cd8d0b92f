//! Amendment ("nova redação") blocks.
//!
//! An amending act quotes the new wording of another act's devices:
//!
//! ```text
//! Art. 1º A Lei nº 10, de 2001, passa a vigorar com a seguinte redação:
//! “Art. 5º Texto novo.” (NR)
//! ```
//!
//! A block is only recognised after an introduction phrase, and runs from
//! an opening quote to a closing quote followed by `(NR)`. Several blocks
//! may follow one phrase. Block content is parsed as its own device tree
//! by the splitting engine.

use chrono::NaiveDate;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::identify::content_hash;
use crate::normalize::strip_editorial_notes_audited;
use crate::types::{DeviceKind, DeviceNode, TextVersion, ValidityStatus};

/// Introduction phrase: "passa a vigorar com a seguinte redação",
/// "passam a vigorar com as seguintes alterações",
/// "passa a vigorar acrescido dos seguintes".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub(crate) static TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)passa(?:m)?\s+a\s+vigorar\s+(?:",
        r"com\s+as?\s+seguintes?\s+(?:reda[çc](?:[ãa]o|[õo]es)|altera[çc](?:[ãa]o|[õo]es))",
        r"|acrescid[oa]s?\s+d[oa]s?\s+seguintes?",
        r")",
    ))
    .expect("valid regex")
});

/// Wording that only records a revocation: "Art. 5º (Revogado).",
/// "§ 2º Revogado pela Lei nº 9, de 2001.", "(Revogada)".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REVOKED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:art(?:igo)?\.?\s*\d+[ºo°ª]?(?:-[A-Z])?|§\s*\d+[ºo°ª]?|par[áa]grafo\s+[úu]nico|[IVXLCDM]+\s*[-–—]|[a-z]\))?",
        r"[\s.:\-–—]*\(?\s*revogad[oa]s?\b[^()]*\)?[\s.;]*$",
    ))
    .expect("valid regex")
});

/// Quoted block closed by the "(NR)" marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)[“"](.+?)[”"]\s*\(\s*NR\s*\)"#).expect("valid regex")
});

/// A quoted amendment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterationBlock {
    /// Byte span of the block, quotes and "(NR)" included.
    pub span: Range<usize>,
    /// Quoted text without quotes and marker.
    pub content: String,
}

impl AlterationBlock {
    /// Whether the block lies entirely inside `range`.
    #[must_use]
    pub fn within(&self, range: &Range<usize>) -> bool {
        self.span.start >= range.start && self.span.end <= range.end
    }
}

/// Blocks found in a text, plus introduction phrases left without one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockScan {
    pub blocks: Vec<AlterationBlock>,
    /// Byte offsets of introduction phrases with no quoted block.
    pub unresolved: Vec<usize>,
}

impl BlockScan {
    /// Spans to shield from marker scans.
    #[must_use]
    pub fn protected_spans(&self) -> Vec<Range<usize>> {
        self.blocks.iter().map(|b| b.span.clone()).collect()
    }
}

/// Find the amendment blocks of a text.
///
/// Blocks are searched from the end of each introduction phrase up to the
/// next phrase outside a block. Phrases quoted inside a block belong to
/// the nested text and are handled when that block is parsed.
///
/// # Examples
/// ```
/// use atlas_parser::alteration::find_blocks;
///
/// let text = "A Lei nº 10 passa a vigorar com a seguinte redação: “Art. 5º Novo.” (NR)";
/// let scan = find_blocks(text);
/// assert_eq!(scan.blocks.len(), 1);
/// assert_eq!(scan.blocks[0].content, "Art. 5º Novo.");
/// ```
pub fn find_blocks(text: &str) -> BlockScan {
    let triggers: Vec<Range<usize>> = TRIGGER.find_iter(text).map(|m| m.range()).collect();
    let mut scan = BlockScan::default();
    let mut consumed = 0;

    for trigger in &triggers {
        if trigger.start < consumed {
            continue;
        }
        let mut pos = trigger.end;
        let mut found = 0;
        loop {
            let limit = triggers
                .iter()
                .map(|t| t.start)
                .find(|&start| start >= pos)
                .unwrap_or(text.len());
            let Some(caps) = BLOCK.captures_at(text, pos) else {
                break;
            };
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            if whole.start() >= limit {
                break;
            }
            scan.blocks.push(AlterationBlock {
                span: whole.range(),
                content: inner.as_str().trim().to_string(),
            });
            found += 1;
            pos = whole.end();
        }
        if found == 0 {
            scan.unresolved.push(trigger.start);
        }
        consumed = pos;
    }

    scan
}

/// Label for an alteration node, taken from the devices parsed out of the
/// block.
///
/// The first article wins, then the first heading; otherwise a synthetic
/// `alteracao_<n>`. Markers the block only cites never became devices, so
/// they cannot become labels.
#[must_use]
pub fn block_label(devices: &[DeviceNode], index: usize) -> String {
    let mut nodes = devices.iter().flat_map(DeviceNode::iter);
    nodes
        .find(|d| d.kind == DeviceKind::Article)
        .or_else(|| devices.iter().find(|d| d.kind.is_heading()))
        .map_or_else(|| format!("alteracao_{index}"), |d| d.label.clone())
}

/// The wording an alteration block introduces.
///
/// A wording that only says the device is revoked is recorded as
/// [`ValidityStatus::Revogado`].
#[must_use]
pub fn text_version(content: &str, valid_from: Option<NaiveDate>) -> TextVersion {
    let (normalized, audit) = strip_editorial_notes_audited(content);
    let status = if REVOKED.is_match(content.trim()) {
        ValidityStatus::Revogado
    } else {
        ValidityStatus::Vigente
    };
    TextVersion {
        texto_original: content.to_string(),
        hash_texto_normalizado: content_hash(&normalized),
        texto_normalizado: normalized,
        normalizacao: audit,
        vigencia_inicio: valid_from,
        vigencia_fim: None,
        status_vigencia: status,
    }
}

//! Closing clause ("fecho") isolation.
//!
//! Acts end with a place and date followed by signatures:
//! "Goiânia, 10 de março de 2023. JOÃO DA SILVA, Governador." After
//! splitting, that block sits at the end of the last device's text.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{ClosingClause, DeviceKind, DeviceNode};

/// ", 10 de março de 2023", ", aos 5 dias do mês de maio de 2021".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CLOSING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i),\s*(?:em\s+|aos\s+)?\d{1,2}º?\s+(?:dias\s+do\s+m[eê]s\s+)?de\s+",
        r"(?:janeiro|fevereiro|mar[çc]o|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)",
        r"\s+de\s+\d{4}",
    ))
    .expect("valid regex")
});

/// End of the sentence preceding the place name.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.;:!?]\s+").expect("valid regex"));

const MAX_PLACE_CHARS: usize = 120;

/// Detach the closing clause from the last substantive device.
///
/// Pseudo-nodes are skipped. Within the last device the search follows
/// the last child down to the deepest node, since the clause always ends
/// the text; amendment blocks are never searched.
pub fn isolate_closing(devices: &mut [DeviceNode]) -> Option<ClosingClause> {
    let last = devices
        .iter_mut()
        .rev()
        .find(|node| node.kind != DeviceKind::Auxiliary)?;
    let text = detach(last)?;
    tracing::debug!(chars = text.len(), "closing clause isolated");
    Some(ClosingClause { text })
}

fn detach(node: &mut DeviceNode) -> Option<String> {
    match node.children.last_mut() {
        Some(child) if child.kind != DeviceKind::Alteration => detach(child),
        _ => split_off(&mut node.text),
    }
}

fn split_off(text: &mut String) -> Option<String> {
    let start = find_closing(text)?;
    let clause = text[start..].trim().to_string();
    text.truncate(start);
    let kept_len = text.trim_end().len();
    text.truncate(kept_len);
    Some(clause)
}

/// Byte offset where a closing clause starts, if `text` ends with one.
///
/// The place is the capitalized, digit-free run between the previous
/// sentence end and the comma before the date.
///
/// # Examples
/// ```
/// use atlas_parser::closing::find_closing;
///
/// let text = "Esta Lei entra em vigor. Goiânia, 10 de março de 2023. JOÃO DA SILVA";
/// assert_eq!(find_closing(text), text.find("Goiânia"));
/// ```
pub fn find_closing(text: &str) -> Option<usize> {
    CLOSING_DATE.find_iter(text).find_map(|date| {
        let before = &text[..date.start()];
        let start = SENTENCE_END.find_iter(before).last().map_or(0, |m| m.end());
        let place = &before[start..];
        let plausible = place.chars().next().is_some_and(char::is_uppercase)
            && place.chars().count() <= MAX_PLACE_CHARS
            && !place.chars().any(|c| c.is_ascii_digit());
        plausible.then_some(start)
    })
}

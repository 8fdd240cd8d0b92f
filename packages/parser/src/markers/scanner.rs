//! Candidate marker scanning.

use std::cmp::Reverse;
use std::ops::Range;

use regex::Regex;

use super::patterns::{heading_kind, pattern_for, priority, HEADING};
use super::Marker;
use crate::types::DeviceKind;

/// Find candidate markers of the given kinds inside `range` of `text`.
///
/// Candidates starting inside a protected span (quoted amendment blocks) are
/// skipped. Structural context rules are applied here; citation checks are
/// not. The result is in source order.
pub fn find_candidates(
    text: &str,
    range: Range<usize>,
    kinds: &[DeviceKind],
    protected: &[Range<usize>],
) -> Vec<Marker> {
    let mut patterns: Vec<&'static Regex> = Vec::new();
    for kind in kinds {
        if let Some(regex) = pattern_for(*kind) {
            if !patterns.iter().any(|p| std::ptr::eq(*p, regex)) {
                patterns.push(regex);
            }
        }
    }

    let haystack = &text[..range.end];
    let mut markers = Vec::new();

    for regex in patterns {
        let mut pos = range.start;
        while let Some(caps) = regex.captures_at(haystack, pos) {
            let Some(m) = caps.get(0) else { break };
            pos = m.end().max(pos + 1);
            if protected.iter().any(|p| p.contains(&m.start())) {
                continue;
            }
            let candidate = if std::ptr::eq(regex, &*HEADING) {
                heading_candidate(&caps, kinds)
            } else {
                kinds
                    .iter()
                    .copied()
                    .find(|k| pattern_for(*k).is_some_and(|p| std::ptr::eq(p, regex)))
                    .and_then(|kind| structural_candidate(text, kind, m.start(), m.as_str(), range.start))
            };
            if let Some(marker) = candidate {
                markers.push(marker);
            }
        }
    }

    markers.sort_by_key(|m| (m.start, Reverse(priority(m.kind))));
    markers
}

fn heading_candidate(caps: &regex::Captures<'_>, kinds: &[DeviceKind]) -> Option<Marker> {
    let whole = caps.get(0)?;
    let keyword = caps.get(1)?.as_str();
    let ordinal = caps.get(2)?.as_str();
    let kind = heading_kind(keyword)?;
    if !kinds.contains(&kind) {
        return None;
    }
    if ordinal.chars().all(|c| "IVXLCDM".contains(c)) && roman_to_int(ordinal).is_none() {
        return None;
    }
    Some(Marker::new(
        kind,
        format!("{keyword} {ordinal}"),
        whole.start(),
        whole.end(),
    ))
}

/// Apply the context rules that the patterns cannot express.
///
/// Rules that tell a list marker from a numeral cited in prose belong to the
/// classifier, so that each rejection is reported.
fn structural_candidate(
    text: &str,
    kind: DeviceKind,
    start: usize,
    matched: &str,
    region_start: usize,
) -> Option<Marker> {
    let before = &text[..start];
    let end = start + matched.len();
    match kind {
        DeviceKind::Inciso => {
            let marker = matched.trim_end();
            let roman = marker.trim_end_matches(['-', '–', '—', '.', ':']).trim_end();
            roman_to_int(roman)?;
            // "I." and "I:" also end sentences and labels ("Anexo I."), so
            // they must open a list entry
            let dashed = marker.ends_with(['-', '–', '—']);
            if !dashed && !opens_list_entry(before, region_start) {
                return None;
            }
            Some(Marker::new(kind, roman, start, start + marker.len()))
        }
        DeviceKind::Alinea => {
            if before.ends_with('(') {
                return None;
            }
            Some(Marker::new(kind, matched, start, end))
        }
        DeviceKind::Item => {
            if before.chars().next_back().is_some_and(|c| !c.is_whitespace()) {
                return None;
            }
            let trimmed = before.trim_end();
            let opens_region = trimmed.len() <= region_start;
            if !opens_region && !trimmed.ends_with([':', ';', '.']) {
                return None;
            }
            let label = matched.trim_end();
            Some(Marker::new(kind, label, start, start + label.len()))
        }
        _ => Some(Marker::new(kind, matched.trim_end(), start, end)),
    }
}

/// Whether the text before a marker ends where a list entry can start:
/// the region start, ":" or ";", optionally followed by "e" or "ou".
fn opens_list_entry(before: &str, region_start: usize) -> bool {
    let trimmed = before.trim_end();
    if trimmed.len() <= region_start {
        return true;
    }
    let trimmed = trimmed
        .strip_suffix(" e")
        .or_else(|| trimmed.strip_suffix(" ou"))
        .map_or(trimmed, str::trim_end);
    trimmed.ends_with([':', ';'])
}

/// Drop candidates that overlap an earlier or higher-priority candidate.
///
/// When two candidates claim the same span, the higher priority kind wins.
pub fn resolve_overlaps(markers: Vec<Marker>) -> Vec<Marker> {
    let mut kept: Vec<Marker> = Vec::with_capacity(markers.len());
    for marker in markers {
        match kept.last() {
            Some(last) if marker.start < last.end => {
                if priority(marker.kind) > priority(last.kind) {
                    kept.pop();
                    kept.push(marker);
                }
            }
            _ => kept.push(marker),
        }
    }
    kept
}

/// Parse a canonical roman numeral.
///
/// Non-canonical spellings ("IIII", "IL", "CIVIL") are rejected.
///
/// # Examples
/// ```
/// use atlas_parser::markers::roman_to_int;
///
/// assert_eq!(roman_to_int("XIV"), Some(14));
/// assert_eq!(roman_to_int("CIVIL"), None);
/// ```
#[must_use]
pub fn roman_to_int(roman: &str) -> Option<u32> {
    if roman.is_empty() {
        return None;
    }
    let value_of = |c: char| match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };
    let values: Vec<u32> = roman.chars().map(value_of).collect::<Option<_>>()?;
    let mut total: i64 = 0;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total -= i64::from(*value),
            _ => total += i64::from(*value),
        }
    }
    let total = u32::try_from(total).ok().filter(|t| *t > 0)?;
    (int_to_roman(total) == roman).then_some(total)
}

fn int_to_roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (step, numeral) in TABLE {
        while value >= step {
            out.push_str(numeral);
            value -= step;
        }
    }
    out
}

/// Parse the ordinal of a marker label, normalized to lower-case ASCII.
///
/// `None` when the label carries no ordinal (sole paragraph, alterations,
/// pseudo-nodes).
///
/// # Examples
/// ```
/// use atlas_parser::markers::ordinal_of;
/// use atlas_parser::DeviceKind;
///
/// assert_eq!(ordinal_of(DeviceKind::Article, "Art. 5º-A").as_deref(), Some("5-a"));
/// assert_eq!(ordinal_of(DeviceKind::Inciso, "IV").as_deref(), Some("4"));
/// assert_eq!(ordinal_of(DeviceKind::Chapter, "CAPÍTULO ÚNICO").as_deref(), Some("unico"));
/// ```
#[must_use]
pub fn ordinal_of(kind: DeviceKind, label: &str) -> Option<String> {
    match kind {
        DeviceKind::Article | DeviceKind::Paragraph => {
            let digits: String = label
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(char::is_ascii_digit)
                .collect();
            if digits.is_empty() {
                return None;
            }
            let number = digits.trim_start_matches('0');
            let number = if number.is_empty() { "0" } else { number };
            match label.rsplit_once('-') {
                Some((_, suffix)) if suffix.len() == 1 && suffix.chars().all(|c| c.is_ascii_alphabetic()) => {
                    Some(format!("{number}-{}", suffix.to_ascii_lowercase()))
                }
                _ => Some(number.to_string()),
            }
        }
        DeviceKind::Inciso => roman_to_int(label.trim()).map(|n| n.to_string()),
        DeviceKind::Alinea => label
            .chars()
            .next()
            .filter(char::is_ascii_lowercase)
            .map(String::from),
        DeviceKind::Item => {
            let digits: String = label.chars().take_while(char::is_ascii_digit).collect();
            (!digits.is_empty()).then_some(digits)
        }
        DeviceKind::Title
        | DeviceKind::Book
        | DeviceKind::Part
        | DeviceKind::Chapter
        | DeviceKind::Section
        | DeviceKind::Subsection => {
            let token = label.split_whitespace().next_back()?;
            if let Some(n) = roman_to_int(token) {
                return Some(n.to_string());
            }
            let lower = token.to_lowercase().replace('ú', "u");
            Some(lower)
        }
        DeviceKind::SoleParagraph | DeviceKind::Alteration | DeviceKind::Auxiliary => None,
    }
}

//! Terminal summary of a device tree.

use textwrap::Options;

use crate::config::TEXT_WRAP_WIDTH;
use crate::types::{DeviceNode, ParseResult};

/// One entry per device, indented by depth and wrapped for the terminal.
///
/// `limit` caps the number of siblings shown at every level; `None` shows
/// the whole tree.
///
/// # Examples
/// ```
/// use atlas_parser::output::summarize_devices;
/// use atlas_parser::{parse_act, ParserConfig, RawAct};
///
/// let act = RawAct::new("br;go;goiania;lei;2023-03-10;1", "Art. 1º Texto. § 1º Outro.");
/// let result = parse_act(&act, &ParserConfig::default()).unwrap();
/// assert_eq!(summarize_devices(&result, None), vec!["Art. 1º: Texto.", "  * § 1º: Outro."]);
/// ```
#[must_use]
pub fn summarize_devices(result: &ParseResult, limit: Option<usize>) -> Vec<String> {
    let mut lines = Vec::new();
    summarize_level(&result.devices, 0, limit, &mut lines);
    lines
}

fn summarize_level(nodes: &[DeviceNode], depth: usize, limit: Option<usize>, lines: &mut Vec<String>) {
    let shown = limit.map_or(nodes.len(), |n| n.min(nodes.len()));
    for node in &nodes[..shown] {
        lines.push(summary_line(node, depth));
        summarize_level(&node.children, depth + 1, limit, lines);
    }
    if shown < nodes.len() {
        let indent = "  ".repeat(depth);
        lines.push(format!("{indent}... {} more", nodes.len() - shown));
    }
}

fn summary_line(node: &DeviceNode, depth: usize) -> String {
    let bullet = match depth {
        0 => String::new(),
        1 => "  * ".to_string(),
        _ => format!("{}- ", "  ".repeat(depth)),
    };
    let continuation = " ".repeat(bullet.chars().count() + 2);
    let options = Options::new(TEXT_WRAP_WIDTH)
        .initial_indent(&bullet)
        .subsequent_indent(&continuation);
    let line = if node.text.is_empty() {
        node.label.clone()
    } else {
        format!("{}: {}", node.label, node.text)
    };
    textwrap::fill(&line, options)
}

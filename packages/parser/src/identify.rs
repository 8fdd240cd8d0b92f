//! Structural paths and content hashes.
//!
//! Every node gets a path built from its ancestors' paths plus a kind
//! prefix and its ordinal (`art5/p1/inc2`), and a SHA-256 hash of its
//! own text after hash normalization. Headings are flat siblings in the
//! tree, so their path carries the chain of enclosing headings instead
//! (`tit2/cap1/sec3`).

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::markers::ordinal_of;
use crate::normalize::normalize_for_hash;
use crate::splitting::Findings;
use crate::types::{DeviceKind, DeviceNode, DiagnosticCode};

/// Hex-encoded SHA-256 of `text` after [`normalize_for_hash`].
///
/// # Examples
/// ```
/// use atlas_parser::identify::content_hash;
///
/// assert_eq!(content_hash("Texto  novo."), content_hash("Texto novo."));
/// assert_ne!(content_hash("Texto novo."), content_hash("Texto novo!"));
/// ```
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(normalize_for_hash(text).as_bytes()))
}

/// Assign structural paths and content hashes to a whole tree.
///
/// Paths are unique: a sibling that would repeat an earlier path gets a
/// numeric suffix (`art5_2`) and a collision is recorded.
pub fn assign_identifiers(devices: &mut [DeviceNode], findings: &mut Findings) {
    assign_level(devices, None, findings);
}

fn assign_level(nodes: &mut [DeviceNode], parent: Option<&str>, findings: &mut Findings) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headings: Vec<(u8, String)> = Vec::new();
    let mut alterations = 0;

    for (index, node) in nodes.iter_mut().enumerate() {
        let segment = match node.kind {
            DeviceKind::Auxiliary => node.label.clone(),
            DeviceKind::Alteration => {
                alterations += 1;
                format!("alt{alterations}")
            }
            DeviceKind::SoleParagraph => "pu".to_string(),
            kind if kind.is_heading() => {
                let depth = heading_depth(kind);
                headings.retain(|(d, _)| *d < depth);
                headings.push((depth, own_segment(node, index)));
                headings
                    .iter()
                    .map(|(_, s)| s.as_str())
                    .collect::<Vec<_>>()
                    .join("/")
            }
            _ => own_segment(node, index),
        };

        let base = match parent {
            Some(parent) => format!("{parent}/{segment}"),
            None => segment,
        };
        let path = if seen.contains(&base) {
            let unique = (2..)
                .map(|n| format!("{base}_{n}"))
                .find(|candidate| !seen.contains(candidate))
                .unwrap_or_else(|| base.clone());
            findings.collisions += 1;
            findings.warn(
                DiagnosticCode::StructuralPathCollision,
                format!("'{}' would repeat path '{base}'; renamed to '{unique}'", node.label),
            );
            unique
        } else {
            base
        };
        seen.insert(path.clone());

        node.content_hash = content_hash(&node.text);
        assign_level(&mut node.children, Some(&path), findings);
        node.structural_path = path;
    }
}

/// Kind prefix plus ordinal, or sibling index when no ordinal parses.
fn own_segment(node: &DeviceNode, index: usize) -> String {
    let ordinal = ordinal_of(node.kind, &node.label).unwrap_or_else(|| (index + 1).to_string());
    format!("{}{ordinal}", node.kind.path_prefix())
}

/// Nesting depth of a heading kind, outermost first.
fn heading_depth(kind: DeviceKind) -> u8 {
    match kind {
        DeviceKind::Part => 0,
        DeviceKind::Book => 1,
        DeviceKind::Title => 2,
        DeviceKind::Chapter => 3,
        DeviceKind::Section => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(kind: DeviceKind, label: &str) -> DeviceNode {
        DeviceNode::new(kind, label, format!("texto de {label}"))
    }

    fn paths(nodes: &[DeviceNode]) -> Vec<String> {
        nodes
            .iter()
            .flat_map(DeviceNode::iter)
            .map(|n| n.structural_path.clone())
            .collect()
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        let hash = content_hash("");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(content_hash("a\n b"), content_hash("a b"));
    }

    #[test]
    fn test_nested_paths() {
        let mut devices = vec![node(DeviceKind::Article, "Art. 5º").with_children(vec![
            node(DeviceKind::Paragraph, "§ 1º").with_children(vec![
                node(DeviceKind::Inciso, "I"),
                node(DeviceKind::Inciso, "II").with_children(vec![node(DeviceKind::Alinea, "a)")]),
            ]),
            node(DeviceKind::SoleParagraph, "Parágrafo único"),
        ])];
        let mut findings = Findings::new();
        assign_identifiers(&mut devices, &mut findings);

        assert_eq!(
            paths(&devices),
            vec![
                "art5",
                "art5/p1",
                "art5/p1/inc1",
                "art5/p1/inc2",
                "art5/p1/inc2/alia",
                "art5/pu",
            ]
        );
        assert!(findings.diagnostics.is_empty());
        assert_eq!(devices[0].content_hash, content_hash("texto de Art. 5º"));
    }

    #[test]
    fn test_heading_chain() {
        let mut devices = vec![
            node(DeviceKind::Title, "TÍTULO I"),
            node(DeviceKind::Chapter, "CAPÍTULO I"),
            node(DeviceKind::Article, "Art. 1º"),
            node(DeviceKind::Chapter, "CAPÍTULO II"),
            node(DeviceKind::Section, "Seção I"),
            node(DeviceKind::Title, "TÍTULO II"),
            node(DeviceKind::Chapter, "CAPÍTULO I"),
        ];
        assign_identifiers(&mut devices, &mut Findings::new());

        assert_eq!(
            paths(&devices),
            vec![
                "tit1",
                "tit1/cap1",
                "art1",
                "tit1/cap2",
                "tit1/cap2/sec1",
                "tit2",
                "tit2/cap1",
            ]
        );
    }

    #[test]
    fn test_collision_gets_suffix() {
        let mut devices = vec![
            node(DeviceKind::Article, "Art. 1º"),
            node(DeviceKind::Article, "Art. 1º"),
            node(DeviceKind::Article, "Art. 1º"),
        ];
        let mut findings = Findings::new();
        assign_identifiers(&mut devices, &mut findings);

        assert_eq!(paths(&devices), vec!["art1", "art1_2", "art1_3"]);
        assert_eq!(findings.collisions, 2);
        assert!(findings
            .diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::StructuralPathCollision));
    }

    #[test]
    fn test_pseudo_nodes_and_alterations() {
        let mut devices = vec![
            node(DeviceKind::Auxiliary, "preambulo"),
            node(DeviceKind::Article, "Art. 1º").with_children(vec![
                node(DeviceKind::Alteration, "Art. 5º")
                    .with_children(vec![node(DeviceKind::Article, "Art. 5º")]),
                node(DeviceKind::Alteration, "alteracao_2"),
            ]),
        ];
        assign_identifiers(&mut devices, &mut Findings::new());

        assert_eq!(
            paths(&devices),
            vec!["preambulo", "art1", "art1/alt1", "art1/alt1/art5", "art1/alt2"]
        );
    }

    #[test]
    fn test_sibling_index_fallback() {
        let mut devices = vec![
            node(DeviceKind::Inciso, "I"),
            node(DeviceKind::Inciso, "não romano"),
        ];
        assign_identifiers(&mut devices, &mut Findings::new());
        assert_eq!(paths(&devices), vec!["inc1", "inc2"]);
    }
}

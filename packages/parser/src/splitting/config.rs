//! Configuration for the Brazilian legal-act hierarchy.

use super::registry::HierarchyRegistry;
use super::types::LevelSpec;
use crate::types::DeviceKind;

/// Create the hierarchy registry for Brazilian legal acts.
///
/// ```text
/// título / livro / parte / capítulo / seção / subseção   (flat headings)
/// artigo
/// ├── parágrafo | parágrafo único
/// │   └── inciso ("I -")
/// │       └── alínea ("a)")
/// │           └── item ("1.")
/// └── inciso (paragraphs are optional)
/// ```
///
/// Levels may be skipped in practice: an alínea or item directly under an
/// article or paragraph, or an item directly under an inciso, is kept as an
/// orphan.
#[must_use]
pub fn create_brazilian_act_hierarchy() -> HierarchyRegistry {
    let mut registry = HierarchyRegistry::new();

    registry.register(
        LevelSpec::new(DeviceKind::Article)
            .with_children([
                DeviceKind::Paragraph,
                DeviceKind::SoleParagraph,
                DeviceKind::Inciso,
            ])
            .with_orphan_children([DeviceKind::Alinea, DeviceKind::Item])
            .with_split_point(true),
    );

    for kind in [DeviceKind::Paragraph, DeviceKind::SoleParagraph] {
        registry.register(
            LevelSpec::new(kind)
                .with_children([DeviceKind::Inciso])
                .with_orphan_children([DeviceKind::Alinea, DeviceKind::Item])
                .with_split_point(true),
        );
    }

    registry.register(
        LevelSpec::new(DeviceKind::Inciso)
            .with_children([DeviceKind::Alinea])
            .with_orphan_children([DeviceKind::Item])
            .with_split_point(true),
    );

    registry.register(
        LevelSpec::new(DeviceKind::Alinea)
            .with_children([DeviceKind::Item])
            .with_split_point(true),
    );

    registry.register(LevelSpec::new(DeviceKind::Item).with_split_point(true));

    // Headings carry only their name
    for kind in [
        DeviceKind::Title,
        DeviceKind::Book,
        DeviceKind::Part,
        DeviceKind::Chapter,
        DeviceKind::Section,
        DeviceKind::Subsection,
    ] {
        registry.register(LevelSpec::new(kind));
    }

    registry
}

/// Rank used to decide which candidates nest inside which.
///
/// A candidate following one of higher rank belongs to it.
#[must_use]
pub fn nesting_rank(kind: DeviceKind) -> u8 {
    match kind {
        DeviceKind::Paragraph | DeviceKind::SoleParagraph => 4,
        DeviceKind::Inciso => 3,
        DeviceKind::Alinea => 2,
        DeviceKind::Item => 1,
        _ => 5,
    }
}

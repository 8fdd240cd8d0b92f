//! Types for the device splitting system.

use chrono::NaiveDate;

use crate::types::{DeviceKind, Diagnostic, DiagnosticCode};

/// Legislative nesting never comes close to this; the guard only stops
/// runaway recursion on pathological amendment nesting.
pub const MAX_DEPTH: usize = 16;

/// Declarative specification of one level in the device hierarchy.
#[derive(Debug, Clone)]
pub struct LevelSpec {
    /// Device kind this level describes.
    pub kind: DeviceKind,

    /// Kinds that nest directly below this level.
    pub children: Vec<DeviceKind>,

    /// Kinds accepted below this level only when their proper parent level
    /// is missing. Attached here and flagged as orphans.
    pub orphan_children: Vec<DeviceKind>,

    /// Whether the content window of this level is searched for children.
    ///
    /// Headings are not: their window is the heading name.
    pub is_split_point: bool,
}

impl LevelSpec {
    /// Create a new level specification.
    #[must_use]
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            orphan_children: Vec::new(),
            is_split_point: false,
        }
    }

    /// Set the direct children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = DeviceKind>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Set the kinds accepted as orphans.
    #[must_use]
    pub fn with_orphan_children(mut self, children: impl IntoIterator<Item = DeviceKind>) -> Self {
        self.orphan_children = children.into_iter().collect();
        self
    }

    /// Set whether this is a split point.
    #[must_use]
    pub fn with_split_point(mut self, is_split: bool) -> Self {
        self.is_split_point = is_split;
        self
    }

    /// All kinds searched inside this level's window.
    #[must_use]
    pub fn searched_kinds(&self) -> Vec<DeviceKind> {
        self.children
            .iter()
            .chain(&self.orphan_children)
            .copied()
            .collect()
    }

    /// Whether `kind` would be attached here as an orphan.
    #[must_use]
    pub fn is_orphan(&self, kind: DeviceKind) -> bool {
        self.orphan_children.contains(&kind)
    }
}

/// Context for splitting operations.
///
/// Carries state down the recursive walk.
#[derive(Debug, Clone)]
pub struct SplitContext {
    /// Current depth (0 = top level of the body).
    pub depth: usize,

    /// Start of validity for wordings introduced by amendment blocks.
    pub valid_from: Option<NaiveDate>,

    /// Fold a leading article numbered above 1 into the preamble.
    pub fold_leading_article: bool,
}

impl SplitContext {
    /// Create a context for the body of an act.
    #[must_use]
    pub fn new(valid_from: Option<NaiveDate>) -> Self {
        Self {
            depth: 0,
            valid_from,
            fold_leading_article: false,
        }
    }

    /// Enable or disable leading-article folding.
    #[must_use]
    pub fn with_fold_leading_article(mut self, enabled: bool) -> Self {
        self.fold_leading_article = enabled;
        self
    }

    /// Context one level deeper.
    #[must_use]
    pub fn nested(&self) -> Self {
        let mut new = self.clone();
        new.depth += 1;
        new
    }

    /// Context for the content of an amendment block.
    #[must_use]
    pub fn for_alteration(&self) -> Self {
        Self {
            depth: self.depth + 1,
            valid_from: self.valid_from,
            fold_leading_article: false,
        }
    }

    /// Whether the depth guard has been reached.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.depth >= MAX_DEPTH
    }
}

/// Diagnostics and penalty counters accumulated during one parse.
///
/// Threaded through the recursion by mutable reference and read once at
/// assembly time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub diagnostics: Vec<Diagnostic>,
    pub orphans: usize,
    pub weak_markers: usize,
    pub collisions: usize,
    pub unresolved_alterations: usize,
}

impl Findings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational diagnostic.
    pub fn info(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(code = code.as_str(), "{message}");
        self.diagnostics.push(Diagnostic::info(code, message));
    }

    /// Record a warning diagnostic.
    pub fn warn(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(code = code.as_str(), "{message}");
        self.diagnostics.push(Diagnostic::warning(code, message));
    }
}

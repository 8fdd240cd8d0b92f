//! Device splitting for Brazilian legal acts.
//!
//! This module implements the recursive decomposition of a flattened body
//! into a device tree (artigo → parágrafo → inciso → alínea → item), with
//! amendment blocks parsed as nested trees.

mod config;
mod engine;
mod registry;
mod strategy;
mod types;

pub use config::{create_brazilian_act_hierarchy, nesting_rank};
pub use engine::{BodyTree, SplitEngine};
pub use registry::HierarchyRegistry;
pub use strategy::{CitationAwareStrategy, SplitStrategy};
pub use types::{Findings, LevelSpec, SplitContext, MAX_DEPTH};

//! Hierarchy registry for device splitting.

use std::collections::HashMap;

use super::types::LevelSpec;
use crate::types::DeviceKind;

/// Registry of level specifications for the hierarchy.
pub struct HierarchyRegistry {
    specs: HashMap<DeviceKind, LevelSpec>,
}

impl HierarchyRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Register a level specification.
    pub fn register(&mut self, spec: LevelSpec) {
        self.specs.insert(spec.kind, spec);
    }

    /// Get the specification for a kind.
    #[must_use]
    pub fn get_spec(&self, kind: DeviceKind) -> Option<&LevelSpec> {
        self.specs.get(&kind)
    }
}

impl Default for HierarchyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = HierarchyRegistry::new();
        registry.register(LevelSpec::new(DeviceKind::Article).with_split_point(true));

        let retrieved = registry.get_spec(DeviceKind::Article);
        assert!(retrieved.is_some());
        assert!(retrieved.unwrap().is_split_point);
    }

    #[test]
    fn test_registry_register_replaces() {
        let mut registry = HierarchyRegistry::new();
        registry.register(LevelSpec::new(DeviceKind::Inciso));
        registry.register(LevelSpec::new(DeviceKind::Inciso).with_split_point(true));

        assert!(registry.get_spec(DeviceKind::Inciso).unwrap().is_split_point);
        assert!(registry.get_spec(DeviceKind::Alinea).is_none());
    }
}

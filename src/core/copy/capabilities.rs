//! Registry backend capabilities
//!
//! Classic and catalog-style registries differ in a few rules. Rather than
//! modelling them as separate client types, the copy engine asks a
//! capability set derived from the destination model name.

use crate::domain::ModelName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryCapabilities {
    catalog: bool,
}

impl RegistryCapabilities {
    /// Capabilities of the registry that owns `name`
    pub fn for_model(name: &ModelName) -> Self {
        Self {
            catalog: name.is_catalog_qualified(),
        }
    }

    /// Whether the registry is catalog-style
    pub fn is_catalog(&self) -> bool {
        self.catalog
    }

    /// Stage transitions exist only in classic registries
    pub fn supports_stage_transition(&self) -> bool {
        !self.catalog
    }

    /// Aliases are always attempted; some classic servers reject them, which
    /// the copy engine treats as non-fatal
    pub fn supports_aliases(&self) -> bool {
        true
    }

    /// Catalog-style registries reject `.` in model version tag keys
    pub fn tag_key_sanitization_required(&self) -> bool {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_capabilities() {
        let caps = RegistryCapabilities::for_model(&ModelName::new("sklearn_wine").unwrap());
        assert!(!caps.is_catalog());
        assert!(caps.supports_stage_transition());
        assert!(caps.supports_aliases());
        assert!(!caps.tag_key_sanitization_required());
    }

    #[test]
    fn test_catalog_capabilities() {
        let caps = RegistryCapabilities::for_model(&ModelName::new("main.ml.wine").unwrap());
        assert!(caps.is_catalog());
        assert!(!caps.supports_stage_transition());
        assert!(caps.tag_key_sanitization_required());
    }
}

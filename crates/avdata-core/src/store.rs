//! Asset data resource registry.
//!
//! The registry maps canonical paths to resources. It owns creation and
//! lookup; access-direction rules live in [`crate::access`].

use std::collections::HashMap;

use crate::error::{AvDataError, Result};
use crate::model::{AccessKind, Resource};
use crate::path::ResourcePath;

/// What `create` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Created {
    /// A new resource was inserted.
    New,
    /// The path already existed with the same access kind.
    Existing,
}

/// Trait for resource registry implementations.
pub trait ResourceStore: Send + Sync {
    /// Register a resource. Re-creating with the same access kind is a no-op.
    fn create(&mut self, path: ResourcePath, access: AccessKind) -> Result<Created>;

    /// Look up a resource by canonical path.
    fn get(&self, path: &ResourcePath) -> Option<&Resource>;

    /// Look up a resource for mutation.
    fn get_mut(&mut self, path: &ResourcePath) -> Option<&mut Resource>;

    /// All resources at or below the `prefix` segments, sorted by path.
    /// An empty prefix selects the whole tree.
    fn children(&self, prefix: &[String]) -> Vec<&Resource>;

    /// Number of registered resources.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory registry keyed by canonical path string.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    resources: HashMap<String, Resource>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceStore for MemoryRegistry {
    fn create(&mut self, path: ResourcePath, access: AccessKind) -> Result<Created> {
        let key = path.canonical();

        if let Some(existing) = self.resources.get(&key) {
            if existing.access != access {
                return Err(AvDataError::Duplicate {
                    path: key,
                    existing: existing.access,
                });
            }
            return Ok(Created::Existing);
        }

        // A path is either a leaf or a branch, never both.
        let segments = path.segments();
        for depth in 1..segments.len() {
            let ancestor = format!("/{}", segments[..depth].join("/"));
            if self.resources.contains_key(&ancestor) {
                return Err(AvDataError::PathConflict {
                    path: key,
                    existing: ancestor,
                });
            }
        }
        if let Some(descendant) = self.resources.values().find(|r| r.path.starts_with(segments)) {
            return Err(AvDataError::PathConflict {
                path: key,
                existing: descendant.path.canonical(),
            });
        }

        self.resources.insert(key, Resource::new(path, access));
        Ok(Created::New)
    }

    fn get(&self, path: &ResourcePath) -> Option<&Resource> {
        self.resources.get(&path.canonical())
    }

    fn get_mut(&mut self, path: &ResourcePath) -> Option<&mut Resource> {
        self.resources.get_mut(&path.canonical())
    }

    fn children(&self, prefix: &[String]) -> Vec<&Resource> {
        let mut found: Vec<&Resource> = self
            .resources
            .values()
            .filter(|r| r.path.starts_with(prefix))
            .collect();
        found.sort_by(|a, b| a.path.segments().cmp(b.path.segments()));
        found
    }

    fn len(&self) -> usize {
        self.resources.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceValue;
    use pretty_assertions::assert_eq;

    fn path(s: &str) -> ResourcePath {
        ResourcePath::parse(s).unwrap()
    }

    #[test]
    fn test_new_registry() {
        let registry = MemoryRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(&path("test1.unAvailable")).is_none());
    }

    #[test]
    fn test_create_and_lookup() {
        let mut registry = MemoryRegistry::new();
        let created = registry
            .create(path("test1.resourceInt"), AccessKind::Variable)
            .unwrap();
        assert_eq!(created, Created::New);

        let resource = registry.get(&path("/test1/resourceInt")).unwrap();
        assert_eq!(resource.access, AccessKind::Variable);
        assert_eq!(resource.value, ResourceValue::Unset);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_with_other_access() {
        let mut registry = MemoryRegistry::new();
        registry
            .create(path("/test2/resourceBool"), AccessKind::Variable)
            .unwrap();

        let err = registry
            .create(path("/test2/resourceBool"), AccessKind::Setting)
            .unwrap_err();
        assert_eq!(
            err,
            AvDataError::Duplicate {
                path: "/test2/resourceBool".to_string(),
                existing: AccessKind::Variable,
            }
        );
        assert_eq!(
            registry.get(&path("/test2/resourceBool")).unwrap().access,
            AccessKind::Variable
        );
    }

    #[test]
    fn test_recreate_same_access_keeps_value() {
        let mut registry = MemoryRegistry::new();
        registry
            .create(path("/a/b"), AccessKind::Variable)
            .unwrap();
        registry.get_mut(&path("/a/b")).unwrap().value = ResourceValue::Int(7);

        let created = registry.create(path("a.b"), AccessKind::Variable).unwrap();
        assert_eq!(created, Created::Existing);
        assert_eq!(registry.get(&path("/a/b")).unwrap().value, ResourceValue::Int(7));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_leaf_cannot_become_branch() {
        let mut registry = MemoryRegistry::new();
        registry.create(path("/x"), AccessKind::Variable).unwrap();

        let err = registry
            .create(path("/x/value"), AccessKind::Variable)
            .unwrap_err();
        assert_eq!(
            err,
            AvDataError::PathConflict {
                path: "/x/value".to_string(),
                existing: "/x".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_branch_cannot_become_leaf() {
        let mut registry = MemoryRegistry::new();
        registry
            .create(path("/home1/room1/numDogs"), AccessKind::Variable)
            .unwrap();

        let err = registry
            .create(path("home1.room1"), AccessKind::Setting)
            .unwrap_err();
        assert_eq!(
            err,
            AvDataError::PathConflict {
                path: "/home1/room1".to_string(),
                existing: "/home1/room1/numDogs".to_string(),
            }
        );

        // Siblings sharing a prefix are fine
        registry
            .create(path("/home1/room1/numCats"), AccessKind::Variable)
            .unwrap();
        registry
            .create(path("/home1/room10"), AccessKind::Variable)
            .unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_children_sorted() {
        let mut registry = MemoryRegistry::new();
        for p in ["/home1/room2/temp", "/home1/room1/numDogs", "/home2/room1/temp"] {
            registry.create(path(p), AccessKind::Variable).unwrap();
        }

        let children: Vec<String> = registry
            .children(path("/home1").segments())
            .iter()
            .map(|r| r.path.canonical())
            .collect();
        assert_eq!(children, vec!["/home1/room1/numDogs", "/home1/room2/temp"]);
        assert_eq!(registry.children(&[]).len(), 3);
    }
}

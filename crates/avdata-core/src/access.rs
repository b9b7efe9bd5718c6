//! Access control policy for asset data resources.
//!
//! Each resource moves through `Uncreated -> Unset -> Present`. Which side may
//! drive the `Unset -> Present` transition depends on the access kind:
//!
//! | access   | local write    | management write |
//! |----------|----------------|------------------|
//! | Variable | allowed        | `NotPermitted`   |
//! | Setting  | `NotPermitted` | allowed          |
//!
//! Reads are allowed from both sides; an unset cell reads as `Unavailable`.
//! A refused write never mutates the resource.

use crate::config::ServiceConfig;
use crate::error::{AvDataError, Result};
use crate::model::{AccessKind, Resource, ResourceValue};
use crate::path::ResourcePath;
use crate::store::ResourceStore;

/// Who is performing a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOrigin {
    /// Application code through the local API.
    Local,
    /// The device-management channel.
    Management,
}

impl WriteOrigin {
    /// The access kind this origin is allowed to write.
    pub fn writable_kind(self) -> AccessKind {
        match self {
            WriteOrigin::Local => AccessKind::Variable,
            WriteOrigin::Management => AccessKind::Setting,
        }
    }
}

/// Enforces write direction, availability and value bounds.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    max_string_bytes: usize,
}

impl AccessPolicy {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            max_string_bytes: config.max_string_bytes,
        }
    }

    /// Look up a resource whose value may be read.
    ///
    /// The resource is returned whole so callers get its access kind from
    /// the same lookup.
    pub fn read<'a, S: ResourceStore>(
        &self,
        store: &'a S,
        path: &ResourcePath,
    ) -> Result<&'a Resource> {
        let resource = store
            .get(path)
            .ok_or_else(|| AvDataError::NotFound(path.canonical()))?;

        if !resource.value.is_set() {
            return Err(AvDataError::Unavailable(path.canonical()));
        }
        Ok(resource)
    }

    /// Store a value, returning the resource's access kind.
    ///
    /// `ResourceValue::Unset` clears a Variable when written locally; the
    /// management channel can never store it.
    pub fn write<S: ResourceStore>(
        &self,
        store: &mut S,
        path: &ResourcePath,
        value: ResourceValue,
        origin: WriteOrigin,
    ) -> Result<AccessKind> {
        let resource = store
            .get_mut(path)
            .ok_or_else(|| AvDataError::NotFound(path.canonical()))?;

        if resource.access != origin.writable_kind() {
            return Err(AvDataError::NotPermitted {
                path: path.canonical(),
                access: resource.access,
            });
        }

        match &value {
            ResourceValue::Unset if origin == WriteOrigin::Management => {
                return Err(AvDataError::EmptyValue(path.canonical()));
            }
            ResourceValue::Str(s) if s.len() > self.max_string_bytes => {
                return Err(AvDataError::Overflow {
                    len: s.len(),
                    capacity: self.max_string_bytes,
                });
            }
            _ => {}
        }

        resource.value = value;
        Ok(resource.access)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}

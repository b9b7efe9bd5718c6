//! # avdata-core
//!
//! Core asset data model and resource registry.
//!
//! This crate provides:
//! - Data model types (AccessKind, ResourceValue, Resource, Namespace)
//! - Path parsing and validation for dot and slash conventions
//! - In-memory resource registry
//! - Access control policy (Variable vs. Setting write direction)
//! - Time-series records for batched pushes
//!
//! This crate is intentionally runtime-agnostic and contains no locking,
//! logging or async code. The service crate wraps the registry in a lock.

pub mod access;
pub mod config;
pub mod error;
pub mod model;
pub mod path;
pub mod record;
pub mod store;

pub use access::{AccessPolicy, WriteOrigin};
pub use config::{ConfigError, ServiceConfig};
pub use error::{AvDataError, Result, ResultCode};
pub use model::*;
pub use path::{parse_segment, Delimiter, PathError, ResourcePath};
pub use record::{RecordBatch, Sample, TimeSeriesRecord};
pub use store::{Created, MemoryRegistry, ResourceStore};

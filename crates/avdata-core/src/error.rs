//! Asset data error taxonomy.
//!
//! Every failure is returned to the immediate caller as a typed result.
//! Callers that speak the legacy result-code vocabulary (IPC clients, the
//! management wire protocol) project errors through [`AvDataError::code`].

use crate::model::{AccessKind, ValueType};
use crate::path::PathError;

/// Errors returned by the asset data registry and access policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AvDataError {
    /// The path string is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// No resource has been created at this path.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The path is already registered under another access kind.
    #[error("resource {path} already exists as a {existing}")]
    Duplicate { path: String, existing: AccessKind },

    /// The path would nest a resource inside another resource, or place a
    /// resource where other resources already branch off.
    #[error("resource {path} conflicts with existing resource {existing}")]
    PathConflict { path: String, existing: String },

    /// The caller is not the permitted writer for this resource.
    #[error("write not permitted on {access} resource {path}")]
    NotPermitted { path: String, access: AccessKind },

    /// The resource exists but its permitted writer never stored a value.
    #[error("resource has no value yet: {0}")]
    Unavailable(String),

    /// A string does not fit the destination or the configured bound.
    #[error("string of {len} bytes exceeds capacity of {capacity} bytes")]
    Overflow { len: usize, capacity: usize },

    /// A typed read hit a cell holding a different type.
    #[error("resource {path} holds {found}, not {expected}")]
    TypeMismatch {
        path: String,
        expected: ValueType,
        found: ValueType,
    },

    /// The management channel tried to store an unset value.
    #[error("resource {0} cannot be written with an empty value")]
    EmptyValue(String),
}

/// Coarse result codes as seen by IPC clients.
///
/// Malformed input of any kind collapses into [`ResultCode::Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Fault,
    NotFound,
    Duplicate,
    NotPermitted,
    Unavailable,
    Overflow,
}

impl AvDataError {
    /// Project this error onto the client-visible result code.
    pub fn code(&self) -> ResultCode {
        match self {
            AvDataError::InvalidPath(_)
            | AvDataError::TypeMismatch { .. }
            | AvDataError::EmptyValue(_) => ResultCode::Fault,
            AvDataError::NotFound(_) => ResultCode::NotFound,
            AvDataError::Duplicate { .. } | AvDataError::PathConflict { .. } => {
                ResultCode::Duplicate
            }
            AvDataError::NotPermitted { .. } => ResultCode::NotPermitted,
            AvDataError::Unavailable(_) => ResultCode::Unavailable,
            AvDataError::Overflow { .. } => ResultCode::Overflow,
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResultCode::Fault => "FAULT",
            ResultCode::NotFound => "NOT_FOUND",
            ResultCode::Duplicate => "DUPLICATE",
            ResultCode::NotPermitted => "NOT_PERMITTED",
            ResultCode::Unavailable => "UNAVAILABLE",
            ResultCode::Overflow => "OVERFLOW",
        };
        f.write_str(name)
    }
}

/// Result alias used throughout the asset data crates.
pub type Result<T> = std::result::Result<T, AvDataError>;

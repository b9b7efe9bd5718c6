//! Management channel message types.
//!
//! This module defines the messages exchanged between the device-management
//! side and the asset data service:
//! - Management → Service: Read, Write, List, Pull requests
//! - Service → Management: Response, carrying pushed data for Pull
//!
//! Messages are serialized as JSON, one message per line on the transport.

use avdata_core::{AvDataError, ResourceValue, ResultCode};
use serde::{Deserialize, Serialize};

/// A request from the management side.
///
/// # Example
/// ```json
/// {"requestId": "17", "write": {"path": "/myApp/limits/max", "value": 42}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(flatten)]
    pub operation: Operation,
}

/// The operation carried by a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Read a single resource value.
    Read(PathTarget),
    /// Write a Setting value.
    Write(WriteTarget),
    /// Read every resource under a path as a JSON tree.
    List(PathTarget),
    /// Collect data the applications pushed since the last pull.
    Pull(PullTarget),
}

/// Target of a read or list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTarget {
    pub path: String,
}

/// Pull requests carry no arguments: `{"pull": {}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PullTarget {}

/// Target and payload of a write request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteTarget {
    pub path: String,
    pub value: ResourceValue,
}

impl ManagementRequest {
    pub fn read(request_id: &str, path: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: Operation::Read(PathTarget {
                path: path.to_string(),
            }),
        }
    }

    pub fn write(request_id: &str, path: &str, value: impl Into<ResourceValue>) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: Operation::Write(WriteTarget {
                path: path.to_string(),
                value: value.into(),
            }),
        }
    }

    pub fn list(request_id: &str, path: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: Operation::List(PathTarget {
                path: path.to_string(),
            }),
        }
    }

    pub fn pull(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: Operation::Pull(PullTarget {}),
        }
    }
}

/// Data an application pushed to the management side.
///
/// Resource pushes carry the tree under `path`; record pushes carry a
/// time-series batch keyed relative to the namespace root in `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub path: String,
    pub kind: PushKind,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushKind {
    Resource,
    Record,
}

/// Response sent back for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub state: RequestState,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestState {
    Completed,
    Failed,
}

impl ManagementResponse {
    /// A successful response, optionally carrying a value.
    pub fn completed(request_id: &str, value: Option<serde_json::Value>) -> Self {
        Self {
            request_id: request_id.to_string(),
            state: RequestState::Completed,
            status_code: 200,
            value,
            message: None,
        }
    }

    /// A failed response with an explicit status code.
    pub fn failed(request_id: &str, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            request_id: request_id.to_string(),
            state: RequestState::Failed,
            status_code,
            value: None,
            message: Some(message.into()),
        }
    }

    /// A failed response derived from a service error.
    pub fn from_error(request_id: &str, err: &AvDataError) -> Self {
        Self::failed(request_id, status_code(err.code()), err.to_string())
    }

    pub fn is_completed(&self) -> bool {
        self.state == RequestState::Completed
    }
}

/// Wire status code for a result code.
pub fn status_code(code: ResultCode) -> u16 {
    match code {
        ResultCode::Fault => 400,
        ResultCode::NotFound => 404,
        ResultCode::NotPermitted => 405,
        ResultCode::Duplicate => 409,
        ResultCode::Overflow => 413,
        ResultCode::Unavailable => 503,
    }
}

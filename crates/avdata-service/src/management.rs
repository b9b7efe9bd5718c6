//! Device-management side of the asset data service.
//!
//! The management channel sees the registry without namespace mapping:
//! application resources appear under their app name, e.g.
//! `/nsAssetDataTest/test/resourceA`. It is the only writer of Settings and
//! may read every resource. Each successful read or write runs the
//! resource's event handlers once the registry lock is released. Data the
//! applications push waits here until the management side pulls it.

use serde_json::Value;
use tracing::debug;

use avdata_core::{AvDataError, EventKind, ResourceValue, Result, WriteOrigin};
use avdata_protocol::{ManagementRequest, ManagementResponse, Operation, PushMessage};

use crate::service::AssetDataService;

/// Handle used by the device-management session.
#[derive(Clone)]
pub struct ManagementChannel {
    service: AssetDataService,
}

impl ManagementChannel {
    pub(crate) fn new(service: AssetDataService) -> Self {
        Self { service }
    }

    /// Read a resource value.
    pub fn read(&self, path: &str) -> Result<ResourceValue> {
        let resolved = self.service.parse(path)?;
        let (value, access) = self.service.read(&resolved)?;
        self.service.notify(&resolved, access, EventKind::Read);
        Ok(value)
    }

    /// Write a Setting value.
    pub fn write(&self, path: &str, value: ResourceValue) -> Result<()> {
        let resolved = self.service.parse(path)?;
        let access = self
            .service
            .write(&resolved, value, WriteOrigin::Management)?;
        self.service.notify(&resolved, access, EventKind::Write);
        Ok(())
    }

    /// Read every resource at or below `path` as a JSON tree.
    ///
    /// An empty path or `/` selects the whole registry.
    pub fn read_tree(&self, path: &str) -> Result<Value> {
        let trimmed = path.trim();
        let prefix = if trimmed.is_empty() || trimmed == "/" {
            Vec::new()
        } else {
            self.service.parse(trimmed)?.segments().to_vec()
        };

        self.service
            .tree(&prefix)
            .ok_or_else(|| AvDataError::NotFound(format!("/{}", prefix.join("/"))))
    }

    /// Collect every pending push, oldest first, acknowledging each one.
    pub fn take_pushes(&self) -> Vec<PushMessage> {
        self.service.take_pushes()
    }

    /// True while any application holds a session request.
    pub fn session_requested(&self) -> bool {
        self.service.session_requested()
    }

    /// Execute a decoded management request.
    pub fn handle(&self, request: &ManagementRequest) -> ManagementResponse {
        let id = &request.request_id;
        let result = match &request.operation {
            Operation::Read(target) => self.read(&target.path).map(|v| Some(v.to_json())),
            Operation::Write(target) => self.write(&target.path, target.value.clone()).map(|_| None),
            Operation::List(target) => self.read_tree(&target.path).map(Some),
            Operation::Pull(_) => Ok(Some(pushes_json(self.take_pushes()))),
        };

        match result {
            Ok(value) => ManagementResponse::completed(id, value),
            Err(err) => {
                debug!("Management request {} failed: {}", id, err);
                ManagementResponse::from_error(id, &err)
            }
        }
    }
}

fn pushes_json(pushes: Vec<PushMessage>) -> Value {
    Value::Array(
        pushes
            .into_iter()
            .map(|push| {
                serde_json::json!({
                    "path": push.path,
                    "kind": push.kind,
                    "value": push.value,
                })
            })
            .collect(),
    )
}

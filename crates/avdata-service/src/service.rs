//! The asset data service handle.
//!
//! One `AssetDataService` is constructed at service start and dropped at
//! service stop. It owns the resource registry behind a single `RwLock`, so a
//! concurrent create and lookup of the same path never see a half-built
//! resource, and a concurrent set and get never see a torn value. Clones share
//! the same registry.
//!
//! Application code talks to the service through [`ClientSession`]s; the
//! device-management side uses the [`ManagementChannel`].
//!
//! Lock order: the registry, handler, push and session locks are never held
//! together.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use avdata_core::{
    parse_segment, AccessKind, AccessPolicy, AvDataError, Created, EventKind, MemoryRegistry,
    RecordBatch, Resource, ResourceEvent, ResourcePath, ResourceStore, ResourceValue, Result,
    ServiceConfig, WriteOrigin,
};
use avdata_protocol::{PushKind, PushMessage};

use crate::handlers::{HandlerRef, HandlerTable, ResourceEventHandler};
use crate::management::ManagementChannel;
use crate::push::{PushAck, PushQueue, PushStatus, SessionRequestRef, SessionRequests};
use crate::session::ClientSession;

struct Shared {
    config: ServiceConfig,
    policy: AccessPolicy,
    registry: RwLock<MemoryRegistry>,
    handlers: Mutex<HandlerTable>,
    pushes: Mutex<PushQueue>,
    sessions: Mutex<SessionRequests>,
}

/// Shared handle to the asset data registry.
#[derive(Clone)]
pub struct AssetDataService {
    shared: Arc<Shared>,
}

impl AssetDataService {
    /// Create a service with an empty registry.
    pub fn new(config: ServiceConfig) -> Self {
        let policy = AccessPolicy::new(&config);
        let pushes = PushQueue::new(config.max_pending_pushes);
        Self {
            shared: Arc::new(Shared {
                config,
                policy,
                registry: RwLock::new(MemoryRegistry::new()),
                handlers: Mutex::new(HandlerTable::default()),
                pushes: Mutex::new(pushes),
                sessions: Mutex::new(SessionRequests::default()),
            }),
        }
    }

    /// Get the active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.shared.config
    }

    /// Open a session for the named application.
    ///
    /// The name becomes the first path segment of every resource the session
    /// creates in its application namespace, so it must be a valid segment.
    pub fn open_session(&self, app_name: &str) -> Result<ClientSession> {
        let app_name = parse_segment(app_name)?;
        debug!("Opened asset data session for {}", app_name);
        Ok(ClientSession::new(self.clone(), app_name))
    }

    /// Get a handle for the device-management side.
    pub fn management(&self) -> ManagementChannel {
        ManagementChannel::new(self.clone())
    }

    /// Number of registered resources.
    pub fn resource_count(&self) -> usize {
        self.registry().len()
    }

    /// Number of registered event handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers().len()
    }

    /// Number of pushes waiting for the management side.
    pub fn pending_push_count(&self) -> usize {
        self.pushes().len()
    }

    /// True while any session request is held.
    pub fn session_requested(&self) -> bool {
        self.sessions().is_requested()
    }

    // ========================================================================
    // Registry access (crate-internal)
    // ========================================================================

    pub(crate) fn parse(&self, raw: &str) -> Result<ResourcePath> {
        Ok(ResourcePath::parse_bounded(raw, self.shared.config.max_path_bytes)?)
    }

    pub(crate) fn create(&self, path: &ResourcePath, access: AccessKind) -> Result<()> {
        let created = self.registry_mut().create(path.clone(), access);
        match created {
            Ok(Created::New) => {
                debug!("Created {} resource {}", access, path);
                Ok(())
            }
            Ok(Created::Existing) => Ok(()),
            Err(err) => {
                warn!("Refused to create {}: {}", path, err);
                Err(err)
            }
        }
    }

    /// Read a value and the resource's access kind.
    pub(crate) fn read(&self, path: &ResourcePath) -> Result<(ResourceValue, AccessKind)> {
        let registry = self.registry();
        let resource = self.shared.policy.read(&*registry, path)?;
        Ok((resource.value.clone(), resource.access))
    }

    pub(crate) fn write(
        &self,
        path: &ResourcePath,
        value: ResourceValue,
        origin: WriteOrigin,
    ) -> Result<AccessKind> {
        let result = {
            let mut registry = self.registry_mut();
            self.shared
                .policy
                .write(&mut *registry, path, value, origin)
        };
        match &result {
            Ok(_) => debug!("{:?} write to {}", origin, path),
            Err(err @ AvDataError::NotPermitted { .. }) => {
                warn!("{:?} write refused: {}", origin, err)
            }
            Err(_) => {}
        }
        result
    }

    pub(crate) fn exists(&self, path: &ResourcePath) -> bool {
        self.registry().get(path).is_some()
    }

    /// Snapshot every resource under `prefix` as a nested JSON object.
    ///
    /// Leaves carry `value` and `access`; unset values are `null`.
    pub(crate) fn tree(&self, prefix: &[String]) -> Option<Value> {
        let registry = self.registry();
        let resources = registry.children(prefix);
        if resources.is_empty() {
            return None;
        }

        let mut root = serde_json::json!({});
        for resource in resources {
            let relative = &resource.path.segments()[prefix.len()..];
            insert_leaf(&mut root, relative, leaf_json(resource));
        }
        Some(root)
    }

    // ========================================================================
    // Event handlers (crate-internal)
    // ========================================================================

    pub(crate) fn add_handler(
        &self,
        path: &ResourcePath,
        handler: ResourceEventHandler,
    ) -> Result<HandlerRef> {
        if !self.exists(path) {
            return Err(AvDataError::NotFound(path.canonical()));
        }
        Ok(self.handlers().add(path.canonical(), handler))
    }

    pub(crate) fn remove_handler(&self, handler_ref: HandlerRef) -> bool {
        self.handlers().remove(handler_ref)
    }

    /// Run handlers for a management-side access.
    ///
    /// Called with no lock held; handlers may call back into the service.
    pub(crate) fn notify(&self, path: &ResourcePath, access: AccessKind, kind: EventKind) {
        let event = ResourceEvent {
            path: path.canonical(),
            access,
            kind,
        };
        let handlers = self.handlers().matching(&event.path);
        for handler in handlers {
            handler(&event);
        }
    }

    // ========================================================================
    // Pushes and session requests (crate-internal)
    // ========================================================================

    /// Queue a snapshot of the resource or branch at `path`.
    pub(crate) fn push_resource(&self, path: &ResourcePath, ack: PushAck) -> Result<()> {
        let canonical = path.canonical();
        let value = self
            .tree(path.segments())
            .ok_or_else(|| AvDataError::NotFound(canonical.clone()))?;
        self.enqueue_push(
            PushMessage {
                path: canonical,
                kind: PushKind::Resource,
                value,
            },
            ack,
        )
    }

    /// Queue a time-series batch whose keys are relative to `root`.
    pub(crate) fn push_record(&self, root: String, batch: RecordBatch, ack: PushAck) -> Result<()> {
        if batch.is_empty() {
            return Err(AvDataError::EmptyValue(root));
        }
        self.enqueue_push(
            PushMessage {
                path: root,
                kind: PushKind::Record,
                value: batch.to_json(),
            },
            ack,
        )
    }

    fn enqueue_push(&self, message: PushMessage, ack: PushAck) -> Result<()> {
        let path = message.path.clone();
        let result = self.pushes().enqueue(message, ack);
        match &result {
            Ok(()) => debug!("Queued push for {}", path),
            Err(err) => warn!("Push for {} refused: {}", path, err),
        }
        result
    }

    /// Hand every queued push to the management side and acknowledge it.
    ///
    /// Acknowledgements run with no lock held.
    pub(crate) fn take_pushes(&self) -> Vec<PushMessage> {
        let drained = self.pushes().drain();
        drained
            .into_iter()
            .map(|push| {
                (push.ack)(PushStatus::Success);
                push.message
            })
            .collect()
    }

    pub(crate) fn request_session(&self) -> SessionRequestRef {
        let mut sessions = self.sessions();
        let request = sessions.request();
        if sessions.len() == 1 {
            info!("Management session requested");
        }
        request
    }

    pub(crate) fn release_session(&self, request: SessionRequestRef) -> bool {
        let mut sessions = self.sessions();
        let released = sessions.release(request);
        if released && !sessions.is_requested() {
            info!("Management session no longer requested");
        }
        released
    }

    fn pushes(&self) -> MutexGuard<'_, PushQueue> {
        self.shared
            .pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn sessions(&self) -> MutexGuard<'_, SessionRequests> {
        self.shared
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn registry(&self) -> RwLockReadGuard<'_, MemoryRegistry> {
        self.shared
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, MemoryRegistry> {
        self.shared
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers(&self) -> MutexGuard<'_, HandlerTable> {
        self.shared
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AssetDataService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

fn leaf_json(resource: &Resource) -> Value {
    serde_json::json!({
        "value": resource.value.to_json(),
        "access": resource.access,
    })
}

/// Place a leaf at `segments` below `node`, creating intermediate objects.
fn insert_leaf(node: &mut Value, segments: &[String], leaf: Value) {
    let Value::Object(map) = node else {
        return;
    };
    match segments.split_first() {
        None => {
            if let Value::Object(fields) = leaf {
                map.extend(fields);
            }
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.clone())
                .or_insert_with(|| serde_json::json!({}));
            insert_leaf(child, rest, leaf);
        }
    }
}

//! Client sessions: the local asset data API.
//!
//! A session belongs to one application. By default its paths resolve in the
//! application namespace, i.e. `/test/resourceA` opened by app
//! `nsAssetDataTest` is stored as `/nsAssetDataTest/test/resourceA`. Switching
//! to [`Namespace::Global`] makes paths resolve as written.
//!
//! Local writes are only accepted on Variables; Settings are written by the
//! management side and read here. Sessions also push data to the management
//! side, either resource snapshots or time-series records, and may ask for
//! the management session to be kept up.

use std::sync::Arc;

use avdata_core::{
    AccessKind, AvDataError, Namespace, ResourceEvent, ResourcePath, ResourceValue, Result,
    TimeSeriesRecord, ValueType, WriteOrigin,
};

use crate::handlers::HandlerRef;
use crate::push::{PushStatus, SessionRequestRef};
use crate::service::AssetDataService;

/// Per-application view of the asset data tree.
pub struct ClientSession {
    service: AssetDataService,
    app_name: String,
    namespace: Namespace,
}

impl ClientSession {
    pub(crate) fn new(service: AssetDataService, app_name: String) -> Self {
        Self {
            service,
            app_name,
            namespace: Namespace::default(),
        }
    }

    /// Name of the application that owns this session.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Namespace paths currently resolve in.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Switch the namespace used by subsequent calls.
    pub fn set_namespace(&mut self, namespace: Namespace) {
        self.namespace = namespace;
    }

    /// Create a resource. Re-creating under the same access kind succeeds and
    /// keeps the stored value; another access kind is `Duplicate`.
    pub fn create_resource(&self, path: &str, access: AccessKind) -> Result<()> {
        let resolved = self.resolve(path)?;
        self.service.create(&resolved, access)
    }

    pub fn set_int(&self, path: &str, value: i64) -> Result<()> {
        self.set(path, ResourceValue::Int(value))
    }

    pub fn get_int(&self, path: &str) -> Result<i64> {
        self.get_typed(path, ValueType::Int, ResourceValue::as_int)
    }

    pub fn set_float(&self, path: &str, value: f64) -> Result<()> {
        self.set(path, ResourceValue::Float(value))
    }

    pub fn get_float(&self, path: &str) -> Result<f64> {
        self.get_typed(path, ValueType::Float, ResourceValue::as_float)
    }

    pub fn set_bool(&self, path: &str, value: bool) -> Result<()> {
        self.set(path, ResourceValue::Bool(value))
    }

    pub fn get_bool(&self, path: &str) -> Result<bool> {
        self.get_typed(path, ValueType::Bool, ResourceValue::as_bool)
    }

    /// Store a string. Strings longer than the configured bound are
    /// rejected with `Overflow`.
    pub fn set_string(&self, path: &str, value: &str) -> Result<()> {
        self.set(path, ResourceValue::Str(value.to_string()))
    }

    /// Read a string into a destination of `capacity` bytes.
    ///
    /// A stored string longer than `capacity` fails with `Overflow`; it is
    /// never truncated.
    pub fn get_string(&self, path: &str, capacity: usize) -> Result<String> {
        let value = self.get_typed(path, ValueType::String, |v| v.as_str().map(String::from))?;
        if value.len() > capacity {
            return Err(AvDataError::Overflow {
                len: value.len(),
                capacity,
            });
        }
        Ok(value)
    }

    /// Clear a Variable back to the unset state.
    pub fn set_null(&self, path: &str) -> Result<()> {
        self.set(path, ResourceValue::Unset)
    }

    /// Register a handler for management-side reads and writes of a resource.
    pub fn add_resource_event_handler<F>(&self, path: &str, handler: F) -> Result<HandlerRef>
    where
        F: Fn(&ResourceEvent) + Send + Sync + 'static,
    {
        let resolved = self.resolve(path)?;
        self.service.add_handler(&resolved, Arc::new(handler))
    }

    /// Remove a handler. Returns false if it was already removed.
    pub fn remove_resource_event_handler(&self, handler_ref: HandlerRef) -> bool {
        self.service.remove_handler(handler_ref)
    }

    /// Push the resource or branch at `path` to the management side.
    ///
    /// `ack` runs once the management side has pulled the data.
    pub fn push<F>(&self, path: &str, ack: F) -> Result<()>
    where
        F: FnOnce(PushStatus) + Send + 'static,
    {
        let resolved = self.resolve(path)?;
        self.service.push_resource(&resolved, Box::new(ack))
    }

    /// Create an empty time-series record bounded by the service limits.
    pub fn create_record(&self) -> TimeSeriesRecord {
        TimeSeriesRecord::new(self.service.config())
    }

    /// Push every sample in `record` and empty it.
    ///
    /// Record keys resolve against the current namespace root. An empty
    /// record is refused with `EmptyValue`.
    pub fn push_record<F>(&self, record: &mut TimeSeriesRecord, ack: F) -> Result<()>
    where
        F: FnOnce(PushStatus) + Send + 'static,
    {
        let root = match self.namespace {
            Namespace::Application => format!("/{}", self.app_name),
            Namespace::Global => "/".to_string(),
        };
        if record.is_empty() {
            return Err(AvDataError::EmptyValue(root));
        }
        self.service.push_record(root, record.take(), Box::new(ack))
    }

    /// Ask for the management session to be kept up.
    pub fn request_session(&self) -> SessionRequestRef {
        self.service.request_session()
    }

    /// Drop a session request. Returns false if it was already released.
    pub fn release_session(&self, request: SessionRequestRef) -> bool {
        self.service.release_session(request)
    }

    /// Resolve a client path to its registry path in the current namespace.
    fn resolve(&self, path: &str) -> Result<ResourcePath> {
        let parsed = self.service.parse(path)?;
        Ok(match self.namespace {
            Namespace::Application => parsed.prefixed(&self.app_name),
            Namespace::Global => parsed,
        })
    }

    fn set(&self, path: &str, value: ResourceValue) -> Result<()> {
        let resolved = self.resolve(path)?;
        self.service.write(&resolved, value, WriteOrigin::Local)?;
        Ok(())
    }

    fn get_typed<T>(
        &self,
        path: &str,
        expected: ValueType,
        extract: impl FnOnce(&ResourceValue) -> Option<T>,
    ) -> Result<T> {
        let resolved = self.resolve(path)?;
        let (value, _) = self.service.read(&resolved)?;
        if let Some(v) = extract(&value) {
            return Ok(v);
        }
        match value.value_type() {
            Some(found) => Err(AvDataError::TypeMismatch {
                path: resolved.canonical(),
                expected,
                found,
            }),
            None => Err(AvDataError::Unavailable(resolved.canonical())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avdata_core::{ResultCode, ServiceConfig};

    fn session() -> ClientSession {
        AssetDataService::default()
            .open_session("assetDataTest")
            .unwrap()
    }

    #[test]
    fn test_default_namespace_is_application() {
        let session = session();
        assert_eq!(session.namespace(), Namespace::Application);
        assert_eq!(session.app_name(), "assetDataTest");
    }

    #[test]
    fn test_application_namespace_prefix() {
        let session = session();
        let resolved = session.resolve("/test/resourceA").unwrap();
        assert_eq!(resolved.canonical(), "/assetDataTest/test/resourceA");
    }

    #[test]
    fn test_global_namespace_as_written() {
        let mut session = session();
        session.set_namespace(Namespace::Global);
        let resolved = session.resolve("test.resourceA").unwrap();
        assert_eq!(resolved.canonical(), "/test/resourceA");
    }

    #[test]
    fn test_type_is_decided_by_last_write() {
        let session = session();
        session
            .create_resource("a.value", AccessKind::Variable)
            .unwrap();

        session.set_int("a.value", 5).unwrap();
        assert_eq!(session.get_int("a.value").unwrap(), 5);

        session.set_bool("a.value", false).unwrap();
        assert!(!session.get_bool("a.value").unwrap());

        let err = session.get_int("a.value").unwrap_err();
        assert_eq!(err.code(), ResultCode::Fault);
        assert!(matches!(
            err,
            AvDataError::TypeMismatch {
                expected: ValueType::Int,
                found: ValueType::Bool,
                ..
            }
        ));
    }

    #[test]
    fn test_get_string_capacity() {
        let session = session();
        session
            .create_resource("a.name", AccessKind::Variable)
            .unwrap();
        session.set_string("a.name", "test_string").unwrap();

        assert_eq!(session.get_string("a.name", 11).unwrap(), "test_string");
        assert_eq!(
            session.get_string("a.name", 10).unwrap_err(),
            AvDataError::Overflow {
                len: 11,
                capacity: 10,
            }
        );
    }

    #[test]
    fn test_set_string_bound() {
        let service = AssetDataService::new(ServiceConfig {
            max_string_bytes: 3,
            ..Default::default()
        });
        let session = service.open_session("app").unwrap();
        session
            .create_resource("a.name", AccessKind::Variable)
            .unwrap();

        let err = session.set_string("a.name", "four").unwrap_err();
        assert_eq!(err.code(), ResultCode::Overflow);
        assert_eq!(
            session.get_string("a.name", 64).unwrap_err().code(),
            ResultCode::Unavailable
        );
    }

    #[test]
    fn test_set_null() {
        let session = session();
        session
            .create_resource("a.flag", AccessKind::Variable)
            .unwrap();
        session.set_bool("a.flag", true).unwrap();
        session.set_null("a.flag").unwrap();
        assert_eq!(
            session.get_bool("a.flag").unwrap_err().code(),
            ResultCode::Unavailable
        );
    }

    #[test]
    fn test_set_null_on_setting_refused() {
        let session = session();
        session
            .create_resource("a.limit", AccessKind::Setting)
            .unwrap();
        assert_eq!(
            session.set_null("a.limit").unwrap_err().code(),
            ResultCode::NotPermitted
        );
    }

    #[test]
    fn test_set_uncreated_is_not_found() {
        let session = session();
        assert_eq!(
            session.set_int("never.created", 1).unwrap_err().code(),
            ResultCode::NotFound
        );
    }

    #[test]
    fn test_push_resolves_namespace() {
        let service = AssetDataService::default();
        let session = service.open_session("avDataUnitTest").unwrap();
        session
            .create_resource("/home1/room1/SmartCam/numDogs", AccessKind::Variable)
            .unwrap();
        session.set_int("/home1/room1/SmartCam/numDogs", 44).unwrap();

        session.push("/home1/room1", |_| {}).unwrap();
        let pushes = service.management().take_pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].path, "/avDataUnitTest/home1/room1");
        assert_eq!(pushes[0].value["SmartCam"]["numDogs"]["value"], 44);
    }

    #[test]
    fn test_push_record_roots() {
        let service = AssetDataService::default();
        let mut session = service.open_session("app").unwrap();
        let mut record = session.create_record();

        assert_eq!(
            session.push_record(&mut record, |_| {}).unwrap_err(),
            AvDataError::EmptyValue("/app".to_string())
        );

        record.record_int("intValue", 12, 1).unwrap();
        session.push_record(&mut record, |_| {}).unwrap();
        assert!(record.is_empty());

        session.set_namespace(Namespace::Global);
        record.record_float("floatValue", 12.35, 2).unwrap();
        session.push_record(&mut record, |_| {}).unwrap();

        let pushes = service.management().take_pushes();
        let roots: Vec<&str> = pushes.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(roots, vec!["/app", "/"]);
        assert_eq!(pushes[0].value["/intValue"][0]["value"], 12);
    }

    #[test]
    fn test_record_uses_service_limits() {
        let service = AssetDataService::new(ServiceConfig {
            max_record_samples: 1,
            ..Default::default()
        });
        let session = service.open_session("app").unwrap();
        let mut record = session.create_record();
        record.record_bool("flag", true, 0).unwrap();
        assert_eq!(
            record.record_bool("flag", false, 1).unwrap_err().code(),
            ResultCode::Overflow
        );
    }

    #[test]
    fn test_handler_on_uncreated_is_not_found() {
        let session = session();
        let err = session
            .add_resource_event_handler("never.created", |_| {})
            .unwrap_err();
        assert_eq!(err.code(), ResultCode::NotFound);
    }
}

//! # avdata-service
//!
//! Asset data service: the process-wide resource registry with its two
//! access directions.
//!
//! - [`AssetDataService`] owns the registry (construct at start, drop at stop)
//! - [`ClientSession`] is the local API used by application code
//! - [`ManagementChannel`] is used by the device-management side
//! - pushes and time-series records flow from sessions to the management
//!   side through a bounded queue
//!
//! All calls are synchronous and bounded; the only blocking is the registry
//! lock.

pub mod handlers;
pub mod management;
pub mod push;
pub mod service;
pub mod session;

pub use avdata_core::{
    AccessKind, AvDataError, Namespace, ResourceValue, ResultCode, ServiceConfig, TimeSeriesRecord,
};
pub use handlers::{HandlerRef, ResourceEventHandler};
pub use management::ManagementChannel;
pub use push::{PushStatus, SessionRequestRef};
pub use service::AssetDataService;
pub use session::ClientSession;

//! # avdata-protocol
//!
//! Asset data management channel message types and codec.
//!
//! This crate defines the request/response formats used by the
//! device-management side to read resources and write Settings.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;

//! # peerpool-proto
//!
//! Identifier, address and message types for the object manager RPC
//! spoken between peer nodes.
//!
//! This crate defines the node and object identifiers, the peer address
//! used to reach a remote object manager, the error type, and the
//! request/response messages carried by the wire frames.

pub mod address;
pub mod constants;
pub mod defaults;
pub mod error;
pub mod id;
pub mod request;

// Re-export commonly used types at the crate root
pub use address::Address;
pub use error::{RpcError, RpcResult};
pub use id::{NodeId, ObjectId};
pub use request::{ObjectManagerRequest, ObjectManagerResponse, RequestHeader};

//! # peerpool-core
//!
//! Client side of the object manager RPC. Provides the shared client pool
//! that hands out one lazily-connected client per peer node, the default
//! object manager client, and the frame codec both ends speak.

pub mod call_manager;
pub mod client;
pub mod client_pool;
pub mod config;
pub mod frame;
pub mod net;

pub use call_manager::{CallStats, ClientCallManager};
pub use client::ObjectManagerClient;
pub use client_pool::{ClientFactory, ClientPool, ObjectManagerClientPool};
pub use config::ClientConfig;

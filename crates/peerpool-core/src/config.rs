//! Object manager client configuration.

use serde::Deserialize;

use peerpool_proto::defaults::{
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_PUSH_CHUNK_SIZE, DEFAULT_TCP_NODELAY,
};

/// Settings shared by every client built from one [`ClientCallManager`].
///
/// Deserializable so a daemon can embed it in its own config file; missing
/// fields fall back to the [`peerpool_proto::defaults`] values.
///
/// [`ClientCallManager`]: crate::call_manager::ClientCallManager
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Largest frame accepted from a peer, in bytes.
    pub max_frame_size: usize,
    /// Chunk size used when pushing an object, in bytes.
    pub push_chunk_size: usize,
    /// Set TCP_NODELAY on client sockets.
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            push_chunk_size: DEFAULT_PUSH_CHUNK_SIZE,
            tcp_nodelay: DEFAULT_TCP_NODELAY,
        }
    }
}

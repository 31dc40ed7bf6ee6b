/// Peer address types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::NodeId;

/// How to reach a peer's object manager.
///
/// The `node_id` component identifies the peer; host and port say where it
/// currently listens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Identity of the node listening at this address
    pub node_id: NodeId,
    /// Host name or IP address
    pub ip_address: String,
    /// Object manager port
    pub port: u16,
}

impl Address {
    pub fn new(node_id: NodeId, ip_address: impl Into<String>, port: u16) -> Self {
        Self {
            node_id,
            ip_address: ip_address.into(),
            port,
        }
    }

    /// `host:port` form, suitable for `TcpStream::connect`.
    pub fn endpoint(&self) -> String {
        if self.ip_address.contains(':') && !self.ip_address.starts_with('[') {
            // bare IPv6 literal
            format!("[{}]:{}", self.ip_address, self.port)
        } else {
            format!("{}:{}", self.ip_address, self.port)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node_id, self.endpoint())
    }
}

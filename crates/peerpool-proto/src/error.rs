/// Object manager RPC error types.
///
/// Errors raised locally by the client and errors returned by a remote
/// object manager share one enum, so a remote status round-trips through
/// its numeric wire code.

use serde::{Deserialize, Serialize};

/// Unified error type for object manager RPCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum RpcError {
    #[error("unknown error")]
    Unknown,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("protocol version mismatch")]
    VersionMismatch,
    #[error("object not found")]
    ObjectNotFound,
    #[error("object already exists")]
    ObjectExists,
    #[error("object manager is shutting down")]
    Shutdown,
    #[error("out of memory for object transfer")]
    OutOfMemory,

    // Client-side transport errors
    #[error("network error between nodes")]
    NetworkError,
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("invalid wire frame")]
    InvalidFrame,
    #[error("failed to encode or decode message")]
    Serialization,
    #[error("response does not match request")]
    ProtocolMismatch,
}

impl RpcError {
    /// Convert from a raw wire status code to RpcError.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x00 => None, // Success
            0x01 => Some(Self::Unknown),
            0x02 => Some(Self::InvalidArgument),
            0x03 => Some(Self::VersionMismatch),
            0x04 => Some(Self::ObjectNotFound),
            0x05 => Some(Self::ObjectExists),
            0x06 => Some(Self::Shutdown),
            0x07 => Some(Self::OutOfMemory),
            0x81 => Some(Self::NetworkError),
            0x82 => Some(Self::ConnectionClosed),
            0x83 => Some(Self::InvalidFrame),
            0x84 => Some(Self::Serialization),
            0x85 => Some(Self::ProtocolMismatch),
            _ => Some(Self::Unknown),
        }
    }

    /// Convert to raw wire status code.
    pub fn to_code(self) -> u32 {
        match self {
            Self::Unknown => 0x01,
            Self::InvalidArgument => 0x02,
            Self::VersionMismatch => 0x03,
            Self::ObjectNotFound => 0x04,
            Self::ObjectExists => 0x05,
            Self::Shutdown => 0x06,
            Self::OutOfMemory => 0x07,
            Self::NetworkError => 0x81,
            Self::ConnectionClosed => 0x82,
            Self::InvalidFrame => 0x83,
            Self::Serialization => 0x84,
            Self::ProtocolMismatch => 0x85,
        }
    }

    /// Whether the error was produced by the local transport rather than
    /// reported by the remote object manager.
    pub fn is_transport(self) -> bool {
        self.to_code() & 0x80 != 0
    }
}

/// Result type alias for object manager RPCs.
pub type RpcResult<T> = Result<T, RpcError>;

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe => RpcError::ConnectionClosed,
            _ => RpcError::NetworkError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_code_is_none() {
        assert_eq!(RpcError::from_code(0), None);
    }

    #[test]
    fn test_remote_codes_round_trip() {
        for err in [
            RpcError::InvalidArgument,
            RpcError::ObjectNotFound,
            RpcError::Shutdown,
            RpcError::ProtocolMismatch,
        ] {
            assert_eq!(RpcError::from_code(err.to_code()), Some(err));
        }
    }

    #[test]
    fn test_unassigned_code_maps_to_unknown() {
        assert_eq!(RpcError::from_code(0x7F), Some(RpcError::Unknown));
    }

    #[test]
    fn test_transport_classification() {
        assert!(RpcError::NetworkError.is_transport());
        assert!(RpcError::InvalidFrame.is_transport());
        assert!(!RpcError::ObjectNotFound.is_transport());
    }

    #[test]
    fn test_io_error_conversion() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(RpcError::from(eof), RpcError::ConnectionClosed);

        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(RpcError::from(refused), RpcError::NetworkError);
    }
}

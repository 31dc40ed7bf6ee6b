//! Node and object identifiers.
//!
//! Both are fixed-size opaque byte strings. They are compared, hashed and
//! ordered bytewise, and printed as lowercase hex.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{UNIQUE_ID_HEX_LEN, UNIQUE_ID_SIZE};
use crate::error::{RpcError, RpcResult};

macro_rules! unique_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name([u8; UNIQUE_ID_SIZE]);

        impl $name {
            /// The all-zero identifier.
            pub const fn nil() -> Self {
                Self([0u8; UNIQUE_ID_SIZE])
            }

            pub const fn from_bytes(bytes: [u8; UNIQUE_ID_SIZE]) -> Self {
                Self(bytes)
            }

            /// Generate a random identifier.
            pub fn from_random() -> Self {
                let mut bytes = [0u8; UNIQUE_ID_SIZE];
                rand::thread_rng().fill(&mut bytes[..]);
                Self(bytes)
            }

            /// Parse an identifier from its hex form.
            pub fn from_hex(s: &str) -> RpcResult<Self> {
                if s.len() != UNIQUE_ID_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(RpcError::InvalidArgument);
                }
                let mut bytes = [0u8; UNIQUE_ID_SIZE];
                for (i, byte) in bytes.iter_mut().enumerate() {
                    *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                        .map_err(|_| RpcError::InvalidArgument)?;
                }
                Ok(Self(bytes))
            }

            #[inline]
            pub const fn as_bytes(&self) -> &[u8; UNIQUE_ID_SIZE] {
                &self.0
            }

            #[inline]
            pub fn is_nil(&self) -> bool {
                self.0.iter().all(|&b| b == 0)
            }

            /// Lowercase hex form.
            pub fn hex(&self) -> String {
                self.0.iter().map(|b| format!("{:02x}", b)).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = RpcError;

            fn from_str(s: &str) -> RpcResult<Self> {
                Self::from_hex(s)
            }
        }
    };
}

unique_id!(
    /// Identity of a peer node. The connection pool keys clients by this.
    NodeId
);

unique_id!(
    /// Identity of an object held by an object manager.
    ObjectId
);

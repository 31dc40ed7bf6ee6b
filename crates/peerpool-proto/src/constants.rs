/// Protocol constants for the object manager RPC.

/// Object manager protocol version carried in every request header.
pub const OM_PROTO_VER: u8 = 0x01;

/// Size in bytes of node and object identifiers.
pub const UNIQUE_ID_SIZE: usize = 28;

/// Length of the hex form of an identifier.
pub const UNIQUE_ID_HEX_LEN: usize = UNIQUE_ID_SIZE * 2;

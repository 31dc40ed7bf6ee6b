//! Tunable operational defaults for the object manager client.
//!
//! Protocol-level constants (version, identifier sizes) remain in
//! [`crate::constants`]. This module centralizes the defaults that an
//! owning daemon can override through its client configuration.

// ─── Transport ──────────────────────────────────────────────────────────────

/// Maximum size of a single wire frame (bytes). 64 MB.
/// Protects against corrupt length prefixes on the wire.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Whether client sockets disable Nagle's algorithm.
pub const DEFAULT_TCP_NODELAY: bool = true;

// ─── Object transfer ────────────────────────────────────────────────────────

/// Size of one pushed object chunk (bytes). 5 MB.
pub const DEFAULT_PUSH_CHUNK_SIZE: usize = 5 * 1024 * 1024;

// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for channel creation, attach, and validation failures.
//!
//! Fast-path outcomes (`empty`, `full`, `timeout`) are *not* represented
//! here — they are communicated via plain return values (`Option`, `bool`),
//! matching the Propagation rule: creation/attach errors are surfaced,
//! steady-state queue states are not.

use std::fmt;
use std::io;

/// Errors that can occur while creating, attaching to, or validating a
/// ZIPC channel.
#[derive(Debug)]
pub enum Error {
    /// Channel name exceeds the 39-character limit.
    NameTooLong { len: usize },

    /// Channel name fails the POSIX shared-memory naming rules (must start
    /// with `/`, contain no other `/`).
    NameInvalid(String),

    /// The shared-memory namespace denied the requested operation.
    PermissionDenied(io::Error),

    /// Segment creation, open, truncate, or mapping failed.
    Io(io::Error),

    /// `queue_size` is not a power of two, or is less than 2.
    InvalidQueueSize(u32),

    /// A Receiver attached to a region whose observed size contradicts the
    /// size computed from its own `(queue_size, message_size)`.
    ParamMismatch {
        expected_size: usize,
        observed_size: usize,
    },

    /// `send` was called with a payload longer than `message_size`.
    MessageTooLarge { len: usize, capacity: usize },

    /// The control block's magic/version did not validate on attach.
    Corruption,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooLong { len } => {
                write!(f, "channel name too long: {len} bytes (max 39)")
            }
            Self::NameInvalid(name) => write!(f, "invalid channel name: {name}"),
            Self::PermissionDenied(e) => write!(f, "permission denied: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidQueueSize(n) => {
                write!(f, "invalid queue_size {n}: must be a power of two and >= 2")
            }
            Self::ParamMismatch {
                expected_size,
                observed_size,
            } => write!(
                f,
                "region size mismatch: expected {expected_size} bytes from params, found {observed_size}"
            ),
            Self::MessageTooLarge { len, capacity } => {
                write!(f, "message too large: {len} bytes exceeds slot capacity {capacity}")
            }
            Self::Corruption => write!(f, "shared region failed control-block validation"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied(e) | Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(e)
        } else {
            Self::Io(e)
        }
    }
}

/// Result type for ZIPC operations.
pub type Result<T> = std::result::Result<T, Error>;

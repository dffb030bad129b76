// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable channel configuration.

use crate::error::{Error, Result};

/// Fixed channel configuration, agreed on by both peers at attach time.
///
/// Argument order is `queue_size` first, `message_size` second throughout
/// this crate's public API, resolving the argument-order ambiguity noted
/// across revisions of the original header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipcParams {
    /// Maximum bytes stored per slot.
    pub message_size: u32,
    /// Number of slots in the ring. Must be a power of two, >= 2.
    pub queue_size: u32,
}

impl ZipcParams {
    /// Construct params, validating `queue_size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQueueSize`] if `queue_size` is not a power of
    /// two or is less than 2.
    pub fn new(queue_size: u32, message_size: u32) -> Result<Self> {
        if queue_size < 2 || !queue_size.is_power_of_two() {
            return Err(Error::InvalidQueueSize(queue_size));
        }
        Ok(Self {
            message_size,
            queue_size,
        })
    }

    /// Index mask for `counter & mask` slot addressing.
    #[must_use]
    pub const fn mask(&self) -> u32 {
        self.queue_size - 1
    }

    /// Byte size of a single slot: 4-byte length prefix + payload.
    #[must_use]
    pub const fn slot_size(&self) -> usize {
        4 + self.message_size as usize
    }
}

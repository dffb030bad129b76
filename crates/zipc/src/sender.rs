// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The producer side of a channel.

use crate::context::{Endpoint, Role};
use crate::error::{Error, Result};
use crate::name::ChannelName;
use crate::params::ZipcParams;
use std::time::Duration;

/// A handle for writing messages into a channel.
///
/// Only one `Sender` may exist per channel at a time; the crate does not
/// enforce this at the type level (a second process opening the same name
/// with the sender role would silently share the producer counter), so
/// callers are responsible for the single-producer discipline `spec.md`
/// assumes.
pub struct Sender {
    endpoint: Endpoint,
}

impl Sender {
    pub(crate) fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// The channel name this sender was opened with.
    #[must_use]
    pub fn name(&self) -> &ChannelName {
        &self.endpoint.name
    }

    /// An opaque per-process identifier for this endpoint, useful for log
    /// correlation. Carries no protocol meaning.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.endpoint.id
    }

    /// The channel's fixed parameters.
    #[must_use]
    pub fn params(&self) -> ZipcParams {
        self.endpoint.params
    }

    /// Block until the receiver (or another process) has finished
    /// initializing the region, or `timeout` elapses.
    ///
    /// Only meaningful when this `Sender` did not itself create the
    /// segment; a creating `Sender` is always already initialized.
    #[must_use]
    pub fn wait_for_initialization(&self, timeout: Option<Duration>) -> bool {
        self.endpoint.wait_for_initialization(timeout)
    }

    /// Enqueue `payload`.
    ///
    /// Never blocks. If the ring is full, the message is silently dropped
    /// and `false` is returned — `spec.md`'s drop-newest overflow policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if `payload` exceeds the
    /// channel's configured `message_size`.
    pub fn send(&self, payload: &[u8]) -> Result<bool> {
        debug_assert_eq!(self.endpoint.role, Role::Sender);

        let capacity = self.endpoint.params.message_size as usize;
        if payload.len() > capacity {
            return Err(Error::MessageTooLarge {
                len: payload.len(),
                capacity,
            });
        }

        // SAFETY: self.endpoint's region was created with self.endpoint's
        // params, and `Sender` upholds the single-producer requirement by
        // construction (only this method calls try_send on this region).
        let sent = unsafe { crate::ring::try_send(self.endpoint.region_ptr(), &self.endpoint.params, payload) };

        if sent {
            // SAFETY: region_ptr points at a live header for self.endpoint.
            let header = unsafe { crate::layout::RegionHeader::from_ptr(self.endpoint.region_ptr()) };
            crate::futex::futex_wake_one(&header.tail);
        }

        Ok(sent)
    }
}

/// Create or attach to a channel as its producer.
///
/// # Errors
///
/// Returns [`Error::ParamMismatch`] if a channel of this name already
/// exists with a different `queue_size`/`message_size`, or an I/O error if
/// the underlying shared-memory operations fail.
pub fn create_sender(name: &str, queue_size: u32, message_size: u32) -> Result<Sender> {
    let name = ChannelName::new(name)?;
    let params = ZipcParams::new(queue_size, message_size)?;
    let endpoint = Endpoint::open(name, params, Role::Sender)?;
    Ok(Sender::new(endpoint))
}

// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The consumer side of a channel.

use crate::context::{Endpoint, Role};
use crate::error::{Error, Result};
use crate::name::ChannelName;
use crate::params::ZipcParams;
use crate::ring::Received;
use std::time::Duration;

/// A handle for reading messages out of a channel.
///
/// Only one `Receiver` may exist per channel at a time, for the same
/// reason documented on [`crate::sender::Sender`].
pub struct Receiver {
    endpoint: Endpoint,
}

impl Receiver {
    pub(crate) fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// The channel name this receiver was opened with.
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

    /// Block until the sender (or another process) has finished
    /// initializing the region, or `timeout` elapses.
    #[must_use]
    pub fn wait_for_initialization(&self, timeout: Option<Duration>) -> bool {
        self.endpoint.wait_for_initialization(timeout)
    }

    /// Dequeue the oldest unread message without blocking.
    ///
    /// Returns `Ok(None)` if the ring is currently empty — steady-state
    /// emptiness is never an error.
    pub fn receive(&self) -> Result<Option<Received<'_>>> {
        debug_assert_eq!(self.endpoint.role, Role::Receiver);

        // SAFETY: self.endpoint's region was created with self.endpoint's
        // params, and `Receiver` upholds the single-consumer requirement by
        // construction.
        let received = unsafe { crate::ring::try_receive(self.endpoint.region_ptr(), &self.endpoint.params) };
        Ok(received)
    }

    /// Dequeue the oldest unread message, blocking until one is available
    /// or `timeout` elapses.
    ///
    /// Returns `Ok(None)` on timeout.
    pub fn receive_blocking(&self, timeout: Option<Duration>) -> Result<Option<Received<'_>>> {
        // SAFETY: same contract as `receive`.
        let received = unsafe {
            crate::wait::receive_blocking(self.endpoint.region_ptr(), &self.endpoint.params, timeout)
        };
        Ok(received)
    }
}

/// Create or attach to a channel as its consumer.
///
/// # Errors
///
/// Returns [`Error::ParamMismatch`] if a channel of this name already
/// exists with a different `queue_size`/`message_size`, or an I/O error if
/// the underlying shared-memory operations fail.
pub fn create_receiver(name: &str, queue_size: u32, message_size: u32) -> Result<Receiver> {
    let name = ChannelName::new(name)?;
    let params = ZipcParams::new(queue_size, message_size)?;
    let endpoint = Endpoint::open(name, params, Role::Receiver)?;
    Ok(Receiver::new(endpoint))
}

/// Remove the named channel from the shared-memory namespace.
///
/// Idempotent. Does not require an open [`Sender`](crate::sender::Sender)
/// or `Receiver` for `name` — any process that knows the name may call
/// this.
///
/// # Errors
///
/// Returns an I/O error if the underlying `shm_unlink` fails for a reason
/// other than the name not existing.
pub fn unlink(name: &str) -> Result<()> {
    let name = ChannelName::new(name)?;
    crate::segment::unlink(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::create_sender;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_name() -> String {
        let ts = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        format!("/zipc_rcv_{}", ts % 1_000_000_000)
    }

    #[test]
    fn receive_on_fresh_channel_is_empty() {
        let name = unique_name();
        let receiver = create_receiver(&name, 4, 8).unwrap();
        assert!(receiver.receive().unwrap().is_none());
        unlink(&name).unwrap();
    }

    #[test]
    fn receive_blocking_times_out_when_nothing_sent() {
        let name = unique_name();
        let receiver = create_receiver(&name, 4, 8).unwrap();
        let result = receiver.receive_blocking(Some(Duration::from_millis(30))).unwrap();
        assert!(result.is_none());
        unlink(&name).unwrap();
    }

    #[test]
    fn sender_then_receiver_round_trip_through_public_api() {
        let name = unique_name();
        let sender = create_sender(&name, 4, 8).unwrap();
        let receiver = create_receiver(&name, 4, 8).unwrap();

        assert!(sender.send(b"hi").unwrap());
        let received = receiver.receive().unwrap().unwrap();
        assert_eq!(received.as_bytes(), b"hi");

        unlink(&name).unwrap();
    }

    #[test]
    fn mismatched_params_are_rejected() {
        let name = unique_name();
        let _sender = create_sender(&name, 4, 8).unwrap();
        let result = create_receiver(&name, 4, 16);
        assert!(matches!(result, Err(Error::ParamMismatch { .. })));
        unlink(&name).unwrap();
    }
}

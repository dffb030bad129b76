// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The private endpoint shared by [`crate::sender::Sender`] and
//! [`crate::receiver::Receiver`].
//!
//! Mirrors the teacher's pattern of a private `*Endpoint` struct wrapped by
//! thin, role-specific public types (see `transport::shm::ShmEndpoint` used
//! by both `ShmWriter` and `ShmReader`).

use crate::error::Result;
use crate::layout::RegionHeader;
use crate::name::ChannelName;
use crate::params::ZipcParams;
use crate::segment::{self, MappedRegion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Which side of the channel an [`Endpoint`] was opened as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Sender,
    Receiver,
}

static NEXT_ENDPOINT_SEQ: AtomicU64 = AtomicU64::new(0);

/// An opaque, per-process endpoint identifier, for log correlation only —
/// it carries no protocol meaning and is never written to the shared
/// region. Built from the owning process id and a per-process counter, the
/// same PID-plus-uniquifier shape the original header's `id` field used.
fn next_endpoint_id() -> u64 {
    let pid = u64::from(std::process::id());
    let seq = NEXT_ENDPOINT_SEQ.fetch_add(1, Ordering::Relaxed);
    (pid << 32) | seq
}

pub(crate) struct Endpoint {
    pub(crate) id: u64,
    pub(crate) name: ChannelName,
    pub(crate) params: ZipcParams,
    pub(crate) role: Role,
    region: MappedRegion,
}

impl Endpoint {
    /// Create-or-open the named channel for `role`.
    ///
    /// Publishing authority belongs to the Sender side only, never to
    /// whichever side happened to win the filesystem create race: a
    /// Receiver may legitimately be the one that brings the segment into
    /// existence (the sender hasn't started yet), and in that case it must
    /// leave `init_flag` at [`crate::layout::INIT_PENDING`] and block in
    /// [`wait_for_initialization`] until a Sender attaches. A Sender checks
    /// the header's current `init_flag` rather than `created`: zero and
    /// publish when it observes `INIT_PENDING` (fresh segment, or one a
    /// Receiver created first), skip when it observes `INIT_DONE` (a second
    /// Sender re-attaching).
    pub(crate) fn open(name: ChannelName, params: ZipcParams, role: Role) -> Result<Self> {
        let id = next_endpoint_id();
        let size = crate::layout::region_size(&params);
        let (region, created) = segment::create_or_open(&name, size)?;

        if role == Role::Sender {
            // SAFETY: region is sized for at least HEADER_SIZE bytes.
            let header = unsafe { RegionHeader::from_ptr(region.as_ptr()) };
            if header.init_flag.load(Ordering::Acquire) == crate::layout::INIT_PENDING {
                // SAFETY: region is sized for at least HEADER_SIZE bytes;
                // nothing has been published yet so no peer can be reading
                // the control block concurrently.
                unsafe { RegionHeader::init_zeroed(region.as_ptr()) };
                header.init_flag.store(crate::layout::INIT_DONE, Ordering::Release);
            }
        }

        log::debug!("[zipc] endpoint {:#x} opened {} as {:?} (created={})", id, name, role, created);

        Ok(Self {
            id,
            name,
            params,
            role,
            region,
        })
    }

    pub(crate) fn region_ptr(&self) -> *mut u8 {
        self.region.as_ptr()
    }

    /// Block until the channel's layout has been published, or `timeout`
    /// elapses.
    #[must_use]
    pub(crate) fn wait_for_initialization(&self, timeout: Option<Duration>) -> bool {
        // SAFETY: self.region is mapped for at least HEADER_SIZE bytes for
        // the lifetime of self.
        unsafe { crate::wait::wait_for_initialization(self.region_ptr(), timeout) }
    }
}

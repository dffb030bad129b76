// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The single-producer/single-consumer ring algorithm over the mapped
//! region's header and slot array.
//!
//! This is a fresh algorithm distinct from the teacher's
//! `transport::shm::ring::ShmRing` (a multi-reader, overrun-tolerant
//! broadcast ring keyed off a single monotonic sequence number): ZIPC needs
//! strict SPSC full/empty tracking with two independent counters, one
//! owned by each peer. What carries over from the teacher is the
//! memory-ordering discipline and the comment style used to justify each
//! atomic access — see `transport::shm::slot::ShmSlot::try_claim` for the
//! model this follows.
//!
//! Ordering discipline, matched at every call site below:
//! - A counter's owner reads it with `Relaxed` (nobody else writes it).
//! - A counter's owner reads the *other* counter with `Acquire`, pairing
//!   with the `Release` store the other peer performs after finishing its
//!   own slot access. This is what makes "slot data fully written" happen-
//!   before "consumer observes the updated counter and reads the slot".

use crate::layout::RegionHeader;
use crate::params::ZipcParams;
use std::sync::atomic::Ordering;

/// Borrowed view of one received message. Reading its bytes is safe for the
/// lifetime of this value; the slot becomes eligible for producer reuse
/// only after it is dropped.
pub struct Received<'a> {
    bytes: &'a [u8],
}

impl<'a> Received<'a> {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> std::ops::Deref for Received<'a> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

/// Attempt to enqueue `payload` into the ring.
///
/// Returns `true` if the message was written, `false` if the ring was full
/// and the message was dropped (the spec's drop-newest overflow policy —
/// never blocks, never reports an error to the caller).
///
/// # Safety
///
/// `region_ptr` must point at a region created with `params`, mapped for at
/// least as long as this call, and this function must never be called
/// concurrently with another `try_send` on the same region (single
/// producer).
pub unsafe fn try_send(region_ptr: *mut u8, params: &ZipcParams, payload: &[u8]) -> bool {
    debug_assert!(payload.len() <= params.message_size as usize);

    let header = RegionHeader::from_ptr(region_ptr);
    let tail = header.tail.load(Ordering::Relaxed);
    let head = header.head.load(Ordering::Acquire);

    if tail.wrapping_sub(head) >= params.queue_size {
        return false; // full: drop newest, no error surfaced
    }

    let index = tail & params.mask();
    let slot = crate::layout::slot_ptr(region_ptr, params, index);

    let len = payload.len() as u32;
    std::ptr::copy_nonoverlapping(payload.as_ptr(), slot.add(4), payload.len());
    std::ptr::write(slot.cast::<u32>(), len);

    header.tail.store(tail.wrapping_add(1), Ordering::Release);
    true
}

/// Attempt to dequeue the oldest unread message.
///
/// Returns `None` if the ring is empty. The returned [`Received`] borrows
/// directly from the shared slot: no copy is made.
///
/// # Safety
///
/// Same contract as [`try_send`], but for the single consumer: this must
/// never be called concurrently with another `try_receive` on the same
/// region.
pub unsafe fn try_receive<'a>(region_ptr: *mut u8, params: &ZipcParams) -> Option<Received<'a>> {
    let header = RegionHeader::from_ptr(region_ptr);
    let head = header.head.load(Ordering::Relaxed);
    let tail = header.tail.load(Ordering::Acquire);

    if head == tail {
        return None; // empty
    }

    let index = head & params.mask();
    let slot = crate::layout::slot_ptr(region_ptr, params, index);

    let len = std::ptr::read(slot.cast::<u32>()) as usize;
    let bytes = std::slice::from_raw_parts(slot.add(4), len);

    header.head.store(head.wrapping_add(1), Ordering::Release);
    Some(Received { bytes })
}

/// `true` if `head == tail`, i.e. nothing is pending. Racy by construction
/// when called concurrently with the peer; intended only as a pre-check
/// before a blocking wait.
///
/// # Safety
///
/// `region_ptr` must point at a mapped region created with `params`.
#[must_use]
pub unsafe fn is_empty(region_ptr: *mut u8, params: &ZipcParams) -> bool {
    let _ = params;
    let header = RegionHeader::from_ptr(region_ptr);
    header.head.load(Ordering::Relaxed) == header.tail.load(Ordering::Acquire)
}

// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blocking waits built on top of [`crate::ring`] and [`crate::futex`]:
//! waiting for a just-created region to finish initializing, and waiting
//! for a message to become available.
//!
//! Grounded on the teacher's `transport::shm::notify::NotifyBucket::wait`
//! (bounded spin before parking) and
//! `transport::shm::ring::ShmRingReader::take_blocking` (the
//! check-then-park loop). The wake address reused here is `tail` itself
//! rather than a dedicated `wake_seq` word: `tail` already changes exactly
//! when new data becomes available, so a Sender that bumps `tail` and then
//! futex-wakes on it gives the Receiver both the data and the
//! notification through one field, matching `spec.md` §4.4.

use crate::layout::RegionHeader;
use crate::params::ZipcParams;
use crossbeam_utils::Backoff;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

/// Spin-then-park until `init_flag` reads [`crate::layout::INIT_DONE`], or
/// `timeout` elapses.
///
/// # Safety
///
/// `region_ptr` must point at a mapped region of at least
/// [`crate::layout::HEADER_SIZE`] bytes.
pub unsafe fn wait_for_initialization(region_ptr: *mut u8, timeout: Option<Duration>) -> bool {
    let header = RegionHeader::from_ptr(region_ptr);
    let deadline = timeout.map(|d| Instant::now() + d);
    let backoff = Backoff::new();

    loop {
        if header.init_flag.load(Ordering::Acquire) == crate::layout::INIT_DONE {
            return true;
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return header.init_flag.load(Ordering::Acquire) == crate::layout::INIT_DONE;
            }
        }
        if backoff.is_completed() {
            std::thread::sleep(Duration::from_micros(200));
        } else {
            backoff.snooze();
        }
    }
}

/// Block until a message is available or `timeout` elapses, then attempt
/// one `try_receive`.
///
/// Uses a short spin phase (cheap under low latency, matching
/// `take_spinning` in the teacher) before falling back to futex-wait on
/// `tail`, re-checking emptiness after every wake since futex wakes may be
/// spurious or coalesced.
///
/// # Safety
///
/// Same contract as [`crate::ring::try_receive`].
pub unsafe fn receive_blocking<'a>(
    region_ptr: *mut u8,
    params: &ZipcParams,
    timeout: Option<Duration>,
) -> Option<crate::ring::Received<'a>> {
    let header = RegionHeader::from_ptr(region_ptr);
    let deadline = timeout.map(|d| Instant::now() + d);
    let backoff = Backoff::new();

    loop {
        if let Some(received) = crate::ring::try_receive(region_ptr, params) {
            return Some(received);
        }

        let remaining = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return None;
                }
                Some(deadline - now)
            }
            None => None,
        };

        if !backoff.is_completed() {
            backoff.snooze();
            continue;
        }

        let observed_tail = header.tail.load(Ordering::Relaxed);
        let wait_slice = remaining
            .map(|r| r.min(Duration::from_millis(50)))
            .or(Some(Duration::from_millis(50)));
        crate::futex::futex_wait(&header.tail, observed_tail, wait_slice);
    }
}

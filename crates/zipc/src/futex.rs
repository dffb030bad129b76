// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linux futex wrapper used to park an idle Receiver and wake it from the
//! Sender without a spin loop.
//!
//! # CRITICAL: SHARED vs PRIVATE
//!
//! This module uses `FUTEX_WAIT` / `FUTEX_WAKE` (NOT the `_PRIVATE`
//! variants). The `_PRIVATE` variants assume the futex word is only ever
//! touched by one process's address space and will silently fail to wake a
//! waiter living in another process — which is exactly the case here,
//! since the futex word lives in the shared region.

use std::ptr;
use std::sync::atomic::AtomicU32;
use std::time::Duration;

const FUTEX_WAIT: i32 = 0; // NOT 128 (FUTEX_WAIT_PRIVATE)
const FUTEX_WAKE: i32 = 1; // NOT 129 (FUTEX_WAKE_PRIVATE)

/// Wait on `addr` while its value equals `expected`, up to `timeout`.
///
/// Returns once the value changes, a spurious wake occurs, or the timeout
/// elapses; the caller is expected to re-check its own condition afterward
/// rather than trust the return value.
///
/// # Safety
///
/// `addr` must remain valid for the duration of the call. For inter-process
/// use it must point into the shared region.
#[cfg(target_os = "linux")]
pub fn futex_wait(addr: &AtomicU32, expected: u32, timeout: Option<Duration>) {
    let ts = timeout.map(|d| libc::timespec {
        tv_sec: d.as_secs() as libc::time_t,
        tv_nsec: d.subsec_nanos() as libc::c_long,
    });
    let ts_ptr = ts
        .as_ref()
        .map_or(ptr::null(), |t| t as *const libc::timespec);

    // SAFETY: addr is a valid reference for the call's duration per the
    // function's safety contract; FUTEX_WAIT (not _PRIVATE) is required
    // because waiters and wakers live in different processes.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            addr as *const AtomicU32 as *const u32,
            FUTEX_WAIT,
            expected,
            ts_ptr,
            ptr::null::<u32>(),
            0i32,
        );
    }
}

/// Wake up to `count` waiters parked on `addr`.
///
/// Safe to call with no waiters present — the syscall is a documented
/// no-op in that case.
///
/// # Safety
///
/// `addr` must be the same address waiters are blocked on.
#[cfg(target_os = "linux")]
pub fn futex_wake(addr: &AtomicU32, count: i32) {
    // SAFETY: addr is a valid reference for the call's duration; FUTEX_WAKE
    // (not _PRIVATE) matches the cross-process waiter in futex_wait.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            addr as *const AtomicU32 as *const u32,
            FUTEX_WAKE,
            count,
            ptr::null::<libc::timespec>(),
            ptr::null::<u32>(),
            0i32,
        );
    }
}

/// Wake a single waiter — there is at most one Receiver per channel.
#[cfg(target_os = "linux")]
#[inline]
pub fn futex_wake_one(addr: &AtomicU32) {
    futex_wake(addr, 1);
}

// Non-Linux fallback: bounded sleep. No cross-process wake primitive is
// assumed to exist, so the Receiver degrades to polling (see zipc::wait).
#[cfg(not(target_os = "linux"))]
pub fn futex_wait(_addr: &AtomicU32, _expected: u32, timeout: Option<Duration>) {
    std::thread::sleep(timeout.unwrap_or(Duration::from_millis(1)).min(Duration::from_millis(10)));
}

#[cfg(not(target_os = "linux"))]
pub fn futex_wake(_addr: &AtomicU32, _count: i32) {}

#[cfg(not(target_os = "linux"))]
#[inline]
pub fn futex_wake_one(_addr: &AtomicU32) {}

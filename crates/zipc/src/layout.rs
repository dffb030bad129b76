// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The on-wire shared-region byte layout two independently compiled
//! processes must agree on bit-for-bit.
//!
//! ```text
//! Offset  Field                          Size
//! 0       init_flag (atomic u32)         4
//! 8       head (atomic u32, consumer)    4
//! 72      tail (atomic u32, producer)    4   (64 bytes past head)
//! 128     slots[0..queue_size]           queue_size * (4 + message_size)
//! ```
//!
//! `head` and `tail` are placed on separate cache-line-sized regions to
//! avoid false sharing between the two peer processes, following the same
//! rationale as the 64-byte-aligned `ShmControl`/`ShmSlot` types in the
//! teacher's `transport::shm::slot` module — here the exact byte offsets
//! are a wire-format requirement rather than a `#[repr(align(64))]`
//! convenience, so the gaps are explicit reserved padding fields instead.

use crate::params::ZipcParams;
use std::sync::atomic::AtomicU32;

/// Byte offset of `init_flag`.
pub const OFFSET_INIT_FLAG: usize = 0;
/// Byte offset of `head`.
pub const OFFSET_HEAD: usize = 8;
/// Byte offset of `tail`.
pub const OFFSET_TAIL: usize = 72;
/// Byte offset where the slot array begins.
pub const HEADER_SIZE: usize = 128;

/// Sentinel written to `init_flag` before the creator has published a
/// valid layout.
pub const INIT_PENDING: u32 = 0;
/// Sentinel written to `init_flag` once the layout is safe to use.
pub const INIT_DONE: u32 = 1;

/// The fixed-size control area at the start of every ZIPC region.
///
/// Field order and padding are load-bearing: they reproduce the exact byte
/// offsets in `spec.md` §6, not just the field's relative order.
#[repr(C)]
pub struct RegionHeader {
    pub(crate) init_flag: AtomicU32,
    _reserved0: [u8; 4],
    pub(crate) head: AtomicU32,
    _reserved1: [u8; 60],
    pub(crate) tail: AtomicU32,
    _reserved2: [u8; 52],
}

impl RegionHeader {
    /// Zero-initialize a header in place at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes of `size_of::<RegionHeader>()` bytes
    /// and suitably aligned for `RegionHeader` (alignment 4).
    pub unsafe fn init_zeroed(ptr: *mut u8) {
        std::ptr::write_bytes(ptr, 0, HEADER_SIZE);
    }

    /// View the header at `ptr` without modifying it.
    ///
    /// # Safety
    ///
    /// `ptr` must point at a mapped region of at least `HEADER_SIZE` bytes
    /// that outlives the returned reference.
    #[must_use]
    pub unsafe fn from_ptr<'a>(ptr: *mut u8) -> &'a RegionHeader {
        &*(ptr as *const RegionHeader)
    }
}

/// Total region size for the given params, rounded up to the system page
/// size (the Shared Region is created with this size and mapped whole).
#[must_use]
pub fn region_size(params: &ZipcParams) -> usize {
    let raw = HEADER_SIZE + params.queue_size as usize * params.slot_size();
    round_up_to_page(raw)
}

fn round_up_to_page(size: usize) -> usize {
    let page_size = page_size();
    size.div_ceil(page_size) * page_size
}

fn page_size() -> usize {
    // SAFETY: sysconf with a valid name constant never reads or writes
    // memory beyond an integer return value.
    let n = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if n > 0 {
        n as usize
    } else {
        4096
    }
}

/// Pointer to the `index`-th slot's length prefix (first byte of the slot).
///
/// # Safety
///
/// `region_ptr` must point at a mapped region created with `params`, and
/// `index` must be `< params.queue_size`.
#[must_use]
pub unsafe fn slot_ptr(region_ptr: *mut u8, params: &ZipcParams, index: u32) -> *mut u8 {
    debug_assert!(index < params.queue_size);
    region_ptr
        .add(HEADER_SIZE)
        .add(index as usize * params.slot_size())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_matches_wire_layout() {
        assert_eq!(std::mem::size_of::<RegionHeader>(), HEADER_SIZE);
    }

    #[test]
    fn field_offsets_match_spec() {
        assert_eq!(memoffset::offset_of!(RegionHeader, init_flag), OFFSET_INIT_FLAG);
        assert_eq!(memoffset::offset_of!(RegionHeader, head), OFFSET_HEAD);
        assert_eq!(memoffset::offset_of!(RegionHeader, tail), OFFSET_TAIL);
    }

    #[test]
    fn region_size_rounds_up_to_page() {
        let params = ZipcParams::new(2, 8).unwrap();
        let size = region_size(&params);
        assert_eq!(size % page_size(), 0);
        assert!(size >= HEADER_SIZE + 2 * (4 + 8));
    }

    #[test]
    fn slot_ptr_is_spaced_by_slot_size() {
        let params = ZipcParams::new(4, 16).unwrap();
        let base = HEADER_SIZE as isize;
        // SAFETY: only pointer arithmetic is performed, never dereferenced.
        unsafe {
            let p0 = slot_ptr(std::ptr::null_mut(), &params, 0) as isize;
            let p1 = slot_ptr(std::ptr::null_mut(), &params, 1) as isize;
            assert_eq!(p0, base);
            assert_eq!(p1 - p0, params.slot_size() as isize);
        }
    }
}

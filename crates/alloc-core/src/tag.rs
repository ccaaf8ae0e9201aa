//! # Boundary-tag encoder
//!
//! The only module in this crate that casts raw arena bytes to tag words or
//! free-list link words. Every other component speaks in terms of
//! [`BlockRef`] — a typed handle to a block's payload address — rather than
//! raw pointers or byte offsets.
//!
//! # Safety
//!
//! `BlockRef` wraps a raw pointer into the arena rather than a Rust
//! reference because the arena is a single, provider-owned allocation that
//! outlives every `BlockRef` derived from it and because free blocks and
//! allocated blocks alias the same bytes under different interpretations (a
//! live `&mut` could never be kept around across an `alloc`/`free` pair
//! without violating aliasing rules). Every accessor here re-derives a raw
//! pointer and performs a single unaligned-looking read or write; none of
//! them retain a reference past the call.

use crate::config::DWORD;
use core::ptr::NonNull;

const ALLOC_BIT: usize = 0x1;

#[inline]
const fn pack(size: usize, allocated: bool) -> usize {
    debug_assert!(size % DWORD == 0, "block size must be a DWORD multiple");
    size | (allocated as usize)
}

#[inline]
const fn unpack_size(tag: usize) -> usize {
    tag & !(DWORD - 1)
}

#[inline]
const fn unpack_alloc(tag: usize) -> bool {
    tag & ALLOC_BIT != 0
}

/// A handle to a block, identified by its payload address (`bp` in the
/// design notes — the address that is handed back to callers of `alloc`).
///
/// Two `BlockRef`s are equal iff they name the same payload address; this is
/// a thin, `Copy` wrapper, not an owner of the bytes it points at.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct BlockRef {
    bp: NonNull<u8>,
}

impl BlockRef {
    /// Construct a `BlockRef` from a payload address.
    ///
    /// # Safety
    /// `bp` must point at the payload of a live block within the arena
    /// (i.e. `bp - WORD` must hold a valid tag word).
    #[inline]
    pub(crate) const unsafe fn from_payload(bp: NonNull<u8>) -> Self {
        Self { bp }
    }

    /// The payload address, as returned to (or supplied by) the caller.
    #[inline]
    pub(crate) const fn payload(self) -> NonNull<u8> {
        self.bp
    }

    #[inline]
    fn header_ptr(self) -> *mut usize {
        // SAFETY: every live BlockRef's payload is preceded by a header word.
        unsafe { self.bp.as_ptr().cast::<usize>().sub(1) }
    }

    #[inline]
    fn footer_ptr(self) -> *mut usize {
        let size = self.size();
        // SAFETY: `size` was read from this block's own header and always
        // spans a valid, writable region ending in a footer word.
        unsafe {
            self.bp
                .as_ptr()
                .add(size - DWORD)
                .cast::<usize>()
        }
    }

    /// Total block size (header + payload + footer), read from the header.
    #[inline]
    pub(crate) fn size(self) -> usize {
        // SAFETY: header_ptr always names a valid tag word for a live block.
        unpack_size(unsafe { self.header_ptr().read() })
    }

    /// Whether the block is currently marked allocated.
    #[inline]
    pub(crate) fn is_allocated(self) -> bool {
        unpack_alloc(unsafe { self.header_ptr().read() })
    }

    /// Write matching header and footer tags for this block.
    #[inline]
    pub(crate) fn set_tags(self, size: usize, allocated: bool) {
        let tag = pack(size, allocated);
        // SAFETY: header/footer point within the block this handle names;
        // `size` is the caller-supplied new extent for this block.
        unsafe {
            self.header_ptr().write(tag);
            self.bp
                .as_ptr()
                .add(size - DWORD)
                .cast::<usize>()
                .write(tag);
        }
    }

    /// Write a header-only sentinel tag (no footer), used for the
    /// zero-size epilogue marker at the tail of the arena.
    #[inline]
    pub(crate) fn write_sentinel(self, allocated: bool) {
        let tag = pack(0, allocated);
        // SAFETY: header_ptr names a valid, writable tag word for this
        // handle regardless of whether it names a real block or the
        // zero-size epilogue placeholder.
        unsafe { self.header_ptr().write(tag) };
    }

    /// The block immediately after this one in address order.
    #[inline]
    pub(crate) fn next(self) -> BlockRef {
        let size = self.size();
        // SAFETY: `size` is a DWORD multiple and the epilogue guarantees
        // there is always a valid header just past the last real block.
        let bp = unsafe { NonNull::new_unchecked(self.bp.as_ptr().add(size)) };
        BlockRef { bp }
    }

    /// The block immediately before this one in address order, read via its
    /// footer at `bp - DWORD`.
    ///
    /// # Safety
    /// Relies on invariant 1 (header == footer) and on the prologue always
    /// being present, so this is total for every real block in the arena.
    #[inline]
    pub(crate) fn prev(self) -> BlockRef {
        // SAFETY: the prologue guarantees a valid footer word at `bp - DWORD`
        // for every real block, including the first.
        let prev_footer = unsafe { self.bp.as_ptr().cast::<usize>().sub(2).read() };
        let prev_size = unpack_size(prev_footer);
        let bp = unsafe { NonNull::new_unchecked(self.bp.as_ptr().sub(prev_size)) };
        BlockRef { bp }
    }

    /// Read this free block's predecessor link (first payload word).
    ///
    /// # Safety
    /// Only meaningful while the block is free; the slot is logically
    /// uninitialized once the block is handed to the caller.
    #[inline]
    pub(crate) fn free_pred(self) -> Option<BlockRef> {
        let raw = unsafe { self.bp.as_ptr().cast::<*mut u8>().read() };
        NonNull::new(raw).map(|bp| BlockRef { bp })
    }

    /// Read this free block's successor link (second payload word).
    #[inline]
    pub(crate) fn free_succ(self) -> Option<BlockRef> {
        let raw = unsafe { self.bp.as_ptr().cast::<*mut u8>().add(1).read() };
        NonNull::new(raw).map(|bp| BlockRef { bp })
    }

    #[inline]
    pub(crate) fn set_free_pred(self, pred: Option<BlockRef>) {
        let raw = pred.map_or(core::ptr::null_mut(), |b| b.bp.as_ptr());
        unsafe { self.bp.as_ptr().cast::<*mut u8>().write(raw) };
    }

    #[inline]
    pub(crate) fn set_free_succ(self, succ: Option<BlockRef>) {
        let raw = succ.map_or(core::ptr::null_mut(), |b| b.bp.as_ptr());
        unsafe { self.bp.as_ptr().cast::<*mut u8>().add(1).write(raw) };
    }
}

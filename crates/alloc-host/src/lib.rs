//! # Host-backed arena provider
//!
//! A `Vec<u8>`-backed [`alloc_core::ArenaProvider`], capped at a fixed
//! maximum capacity reserved up front so that growth never reallocates (and
//! therefore never moves) the backing storage — mirroring how the
//! reference kernel's own frame allocator hands out pages from a
//! statically sized, never-moved region rather than a resizable one.
//!
//! Exists purely to exercise [`alloc_core::Allocator`] from host test code
//! and examples; no_std embedders should implement `ArenaProvider` directly
//! over their own statically reserved memory (see the `alloc-global` crate
//! for one such embedding).

use alloc_core::ArenaProvider;
use core::ptr::NonNull;

/// A single, fixed-capacity byte arena backed by a host `Vec`.
pub struct HostArena {
    buf: Vec<u8>,
    len: usize,
}

impl HostArena {
    /// Reserve `capacity` bytes up front. The arena never grows past this
    /// size; [`ArenaProvider::extend`] returns `None` once exhausted.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        log::debug!("alloc-host: reserving a {capacity}-byte arena");
        Self {
            buf: vec![0u8; capacity],
            len: 0,
        }
    }

    /// Total reserved capacity, including bytes not yet handed out via
    /// `extend`.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

// SAFETY: `buf` is reserved once at construction and never resized or
// moved afterward (only `len`, the logical prefix length, changes), so
// `base()` stays valid and stable for the arena's whole lifetime, and it
// is heap-allocated with an alignment at least that of `usize`.
unsafe impl ArenaProvider for HostArena {
    fn base(&self) -> NonNull<u8> {
        // SAFETY: `buf` is never empty past construction (capacity > 0 in
        // every realistic use) and Vec's pointer is always non-null.
        unsafe { NonNull::new_unchecked(self.buf.as_ptr().cast_mut()) }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn extend(&mut self, additional: usize) -> Option<usize> {
        let old_len = self.len;
        let new_len = old_len.checked_add(additional)?;
        if new_len > self.buf.len() {
            log::warn!(
                "alloc-host: extend({additional}) would exceed the {}-byte cap (have {old_len})",
                self.buf.len()
            );
            return None;
        }
        self.len = new_len;
        Some(old_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let arena = HostArena::with_capacity(1024);
        assert_eq!(arena.len(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn extend_tracks_length_and_returns_old_length() {
        let mut arena = HostArena::with_capacity(1024);
        assert_eq!(arena.extend(100), Some(0));
        assert_eq!(arena.len(), 100);
        assert_eq!(arena.extend(50), Some(100));
        assert_eq!(arena.len(), 150);
    }

    #[test]
    fn extend_past_capacity_fails_and_leaves_length_untouched() {
        let mut arena = HostArena::with_capacity(64);
        assert_eq!(arena.extend(32), Some(0));
        assert_eq!(arena.extend(64), None);
        assert_eq!(arena.len(), 32);
    }

    #[test]
    fn base_pointer_is_stable_across_extends() {
        let mut arena = HostArena::with_capacity(4096);
        let base_before = arena.base();
        arena.extend(2048).unwrap();
        assert_eq!(arena.base(), base_before);
    }
}

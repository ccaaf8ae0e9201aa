//! # Arena provider
//!
//! The core allocator never sources memory on its own; it asks an
//! `ArenaProvider` for a contiguous, growable byte range and otherwise only
//! ever subdivides that range. This mirrors the reference kernel's
//! `FrameAlloc` trait: a fallible, `Option`-returning primitive rather than
//! a `Result`-returning one, since "out of memory" is the only failure mode
//! and callers are expected to check for `None` rather than match on an
//! error enum.

use core::ptr::NonNull;

/// Supplies and grows the backing arena for an [`crate::Allocator`].
///
/// # Safety
///
/// Implementations must uphold:
/// - The pointer returned by [`Self::base`] is valid for reads and writes
///   for [`Self::capacity`] bytes for as long as the provider lives, and is
///   aligned to at least `2 * size_of::<usize>()` bytes.
/// - [`Self::extend`] either grows the arena in place (the existing prefix
///   keeps its address and contents) and returns the *old* `Self::len()`,
///   or returns `None` without changing anything observable.
/// - After a successful `extend(n)`, `self.len() >= old_len + n`.
pub unsafe trait ArenaProvider {
    /// Base address of the arena. Must return the same address for the
    /// lifetime of the provider (growth only ever extends the tail).
    fn base(&self) -> NonNull<u8>;

    /// Number of initialized bytes currently available starting at
    /// [`Self::base`].
    fn len(&self) -> usize;

    /// Returns `true` if the arena currently has no usable bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow the arena by at least `additional` bytes.
    ///
    /// Returns the offset (from [`Self::base`]) at which the newly
    /// available bytes begin, or `None` if the request cannot be
    /// satisfied.
    fn extend(&mut self, additional: usize) -> Option<usize>;
}

#[cfg(test)]
mod tests {
    use super::ArenaProvider;
    use core::ptr::NonNull;

    struct FixedBuf {
        buf: Vec<u8>,
        len: usize,
    }

    // SAFETY: `buf` is heap-allocated and never moved or shrunk once
    // handed out; `base()` returns a stable pointer into it for the test.
    unsafe impl ArenaProvider for FixedBuf {
        fn base(&self) -> NonNull<u8> {
            NonNull::new(self.buf.as_ptr().cast_mut()).unwrap()
        }

        fn len(&self) -> usize {
            self.len
        }

        fn extend(&mut self, additional: usize) -> Option<usize> {
            let old_len = self.len;
            if old_len + additional > self.buf.len() {
                return None;
            }
            self.len += additional;
            Some(old_len)
        }
    }

    #[test]
    fn extend_within_capacity_succeeds() {
        let mut p = FixedBuf {
            buf: vec![0u8; 1024],
            len: 0,
        };
        assert_eq!(p.extend(512), Some(0));
        assert_eq!(p.len(), 512);
        assert_eq!(p.extend(512), Some(512));
        assert_eq!(p.len(), 1024);
    }

    #[test]
    fn extend_past_capacity_fails_without_mutation() {
        let mut p = FixedBuf {
            buf: vec![0u8; 64],
            len: 32,
        };
        assert_eq!(p.extend(64), None);
        assert_eq!(p.len(), 32);
    }

    #[test]
    fn is_empty_reflects_zero_length() {
        let p = FixedBuf {
            buf: vec![0u8; 16],
            len: 0,
        };
        assert!(p.is_empty());
    }
}

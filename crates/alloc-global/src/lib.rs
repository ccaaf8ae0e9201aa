//! # `GlobalAlloc` embedding
//!
//! Wires [`alloc_core::Allocator`] to a statically reserved backing array
//! and a spinlock, the same way the reference kernel wires its free-list
//! allocator to a `.bss`-resident heap behind a single global `SpinLock`.
//! Unlike the reference kernel, the arena here is a plain `'static mut`
//! byte array rather than a range of physical memory, since this crate has
//! no page allocator underneath it to ask for pages.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

use alloc_core::{Allocator, ArenaProvider};
use alloc_sync::SpinLock;
use core::alloc::{GlobalAlloc, Layout};
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

/// An [`ArenaProvider`] over a single, statically sized backing array.
///
/// Never actually "grows" past `N` — every [`ArenaProvider::extend`] call
/// hands out more of the array's own reserved bytes, up to its fixed size.
struct StaticArena<const N: usize> {
    bytes: UnsafeCell<MaybeUninit<[u8; N]>>,
    len: usize,
}

// SAFETY: all access to `bytes` goes through `SpinLock`-guarded calls into
// the wrapping `Allocator`, which never hands out overlapping mutable
// access to the same bytes.
unsafe impl<const N: usize> Sync for StaticArena<N> {}

impl<const N: usize> StaticArena<N> {
    const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new(MaybeUninit::uninit()),
            len: 0,
        }
    }
}

// SAFETY: `bytes` is a fixed-size array embedded directly in `self` (never
// reallocated or moved once the static is placed), sized `N` and therefore
// aligned to at least `align_of::<[u8; N]>() >= align_of::<usize>()`.
unsafe impl<const N: usize> ArenaProvider for StaticArena<N> {
    fn base(&self) -> NonNull<u8> {
        // SAFETY: `bytes` is never null; it is an inline array.
        unsafe { NonNull::new_unchecked(self.bytes.get().cast::<u8>()) }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn extend(&mut self, additional: usize) -> Option<usize> {
        let old_len = self.len;
        let new_len = old_len.checked_add(additional)?;
        if new_len > N {
            log::warn!("alloc-global: static heap exhausted (cap {N} bytes, have {old_len})");
            return None;
        }
        self.len = new_len;
        Some(old_len)
    }
}

/// A [`GlobalAlloc`] backed by [`alloc_core::Allocator`] over a statically
/// reserved `N`-byte heap, guarded by a [`SpinLock`].
///
/// Initialization is lazy and idempotent: the first allocation request
/// triggers [`alloc_core::Allocator::init`]; subsequent requests are no-ops
/// on that front. This mirrors the reference kernel's own
/// `ensure_init`-before-first-use pattern for its global heap.
pub struct StaticGlobalAlloc<const N: usize> {
    inner: SpinLock<Option<Allocator<StaticArena<N>>>>,
}

impl<const N: usize> StaticGlobalAlloc<N> {
    /// Construct an uninitialized global allocator. Call sites never call
    /// this directly for init; it happens lazily on first use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: SpinLock::new(None),
        }
    }

    fn ensure_init(allocator: &mut Option<Allocator<StaticArena<N>>>) {
        if allocator.is_none() {
            // `init` records absolute pointers into the arena's inline
            // byte array (free-list links, the BlockRef it hands back).
            // Those must be taken at the array's final address, so the
            // allocator is placed into `allocator` *before* `init` runs —
            // never built on the stack and moved in afterward.
            *allocator = Some(Allocator::new(StaticArena::new()));
            if let Err(err) = allocator.as_mut().unwrap().init() {
                log::warn!("alloc-global: failed to initialize static heap: {err}");
                *allocator = None;
            }
        }
    }
}

impl<const N: usize> Default for StaticGlobalAlloc<N> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: every method serializes access through the inner `SpinLock`, and
// forwards to `alloc_core::Allocator`, which upholds `GlobalAlloc`'s
// contract (returned pointers are suitably aligned for any request this
// crate's `DWORD` alignment can satisfy; `dealloc`/`realloc` require the
// same `ptr`/`layout` the matching `alloc` call used, which callers of
// `GlobalAlloc` already guarantee).
unsafe impl<const N: usize> GlobalAlloc for StaticGlobalAlloc<N> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.inner.with_lock(|slot| {
            Self::ensure_init(slot);
            slot.as_mut()
                .map_or(core::ptr::null_mut(), |a| a.alloc(layout.size()))
        })
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.inner.with_lock(|slot| {
            if let Some(a) = slot.as_mut() {
                a.free(ptr);
            }
        });
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        self.inner.with_lock(|slot| {
            slot.as_mut()
                .map_or(core::ptr::null_mut(), |a| a.realloc(ptr, new_size))
        })
    }
}

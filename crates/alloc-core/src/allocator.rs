//! # The allocator
//!
//! Ties the size-class registry, coalescer, and placement/growth helpers
//! together behind the small public surface callers actually use:
//! [`Allocator::init`], [`Allocator::alloc`], [`Allocator::free`], and
//! [`Allocator::realloc`].

use core::ptr::NonNull;

use crate::config::{DEFAULT_GROWTH_FACTOR, DWORD, INITIAL_PAD, PREAMBLE_BYTES, WORD};
use crate::coalesce::coalesce;
use crate::error::InitError;
use crate::free_list::FreeLists;
use crate::placement::{asize_for, grow, place, shrink_in_place, try_grow_into_next};
use crate::provider::ArenaProvider;
use crate::tag::BlockRef;

/// A segregated-fit, boundary-tag heap allocator over an externally
/// supplied, growable byte arena.
///
/// Not thread-safe on its own; an embedder that needs to share one
/// instance across threads is expected to wrap it in its own
/// synchronization (see the `alloc-sync`/`alloc-global` crates for one
/// such embedding).
pub struct Allocator<P: ArenaProvider> {
    provider: P,
    lists: FreeLists,
    epilogue_offset: usize,
    initialized: bool,
    quantize: bool,
    growth_factor: usize,
}

impl<P: ArenaProvider> Allocator<P> {
    /// Construct an allocator over `provider`. The arena is not usable
    /// until [`Self::init`] succeeds.
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            lists: FreeLists::new(),
            epilogue_offset: 0,
            initialized: false,
            quantize: false,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }

    /// Enable or disable fixed-size quantization (see
    /// [`crate::config::QUANTIZATION_TABLE`]). Disabled by default.
    #[must_use]
    pub const fn with_quantization(mut self, enabled: bool) -> Self {
        self.quantize = enabled;
        self
    }

    /// Set the `realloc` fallback over-allocation factor `k`, so that a
    /// growing reallocation that must move requests `max(new_size, k *
    /// old_size)` instead of exactly `new_size`. `k = 1` (the default)
    /// disables over-allocation.
    #[must_use]
    pub const fn with_growth_factor(mut self, factor: usize) -> Self {
        debug_assert!(factor >= 1, "growth factor must be at least 1");
        self.growth_factor = factor;
        self
    }

    /// Lay down the prologue/epilogue sentinels and request the first
    /// chunk of usable arena. Must be called exactly once before
    /// [`Self::alloc`]/[`Self::free`]/[`Self::realloc`] do anything useful.
    pub fn init(&mut self) -> Result<(), InitError> {
        if self.initialized {
            return Err(InitError::AlreadyInitialized);
        }

        let old_len = self
            .provider
            .extend(PREAMBLE_BYTES)
            .ok_or(InitError::ProviderExhausted)?;
        debug_assert_eq!(old_len, 0, "init must run on a freshly constructed provider");

        let base = self.provider.base();
        // SAFETY: the provider just guaranteed `PREAMBLE_BYTES` writable
        // bytes starting at `base`, and `PREAMBLE_BYTES` is laid out as
        // `pad (INITIAL_PAD) | prologue (DWORD) | epilogue header (WORD)`.
        let prologue_bp = unsafe { NonNull::new_unchecked(base.as_ptr().add(INITIAL_PAD + WORD)) };
        let prologue = unsafe { BlockRef::from_payload(prologue_bp) };
        prologue.set_tags(DWORD, true);

        let epilogue_offset = INITIAL_PAD + DWORD;
        let epilogue_bp =
            unsafe { NonNull::new_unchecked(base.as_ptr().add(epilogue_offset + WORD)) };
        let epilogue = unsafe { BlockRef::from_payload(epilogue_bp) };
        epilogue.write_sentinel(true);

        self.epilogue_offset = epilogue_offset;
        self.initialized = true;

        match grow(&mut self.provider, &mut self.lists, self.epilogue_offset, 0) {
            Some((_, new_epilogue_offset)) => {
                self.epilogue_offset = new_epilogue_offset;
                Ok(())
            }
            None => {
                self.initialized = false;
                Err(InitError::ProviderExhausted)
            }
        }
    }

    /// Allocate a block able to hold `size` bytes, or a null pointer on
    /// failure (uninitialized allocator, zero-size request, or arena
    /// exhaustion).
    pub fn alloc(&mut self, size: usize) -> *mut u8 {
        if !self.initialized || size == 0 {
            return core::ptr::null_mut();
        }

        let asize = asize_for(size, self.quantize);
        let Some(block) = self.find_or_grow(asize) else {
            log::warn!("alloc-core: arena provider exhausted for a {size}-byte request");
            return core::ptr::null_mut();
        };

        let placed = place(&mut self.lists, block, asize);
        self.debug_check();
        placed.payload().as_ptr()
    }

    /// Release a block previously returned by [`Self::alloc`] or
    /// [`Self::realloc`]. A null `ptr` is a no-op.
    pub fn free(&mut self, ptr: *mut u8) {
        let Some(bp) = NonNull::new(ptr) else {
            return;
        };
        if !self.initialized {
            return;
        }

        // SAFETY: caller contract — `ptr` names a block this allocator
        // previously handed out and that has not already been freed.
        let block = unsafe { BlockRef::from_payload(bp) };
        let size = block.size();
        block.set_tags(size, false);
        coalesce(&mut self.lists, block);
        self.debug_check();
    }

    /// Resize a previously allocated block, preserving its contents up to
    /// `min(old_size, new_size)` bytes.
    ///
    /// `ptr == null` behaves like [`Self::alloc`]; `new_size == 0` behaves
    /// like [`Self::free`] and returns a null pointer. Returns null (and
    /// leaves `ptr` untouched) if a growing reallocation cannot be
    /// satisfied.
    pub fn realloc(&mut self, ptr: *mut u8, new_size: usize) -> *mut u8 {
        let Some(bp) = NonNull::new(ptr) else {
            return self.alloc(new_size);
        };
        if new_size == 0 {
            self.free(ptr);
            return core::ptr::null_mut();
        }
        if !self.initialized {
            return core::ptr::null_mut();
        }

        // SAFETY: caller contract, as in `free`.
        let block = unsafe { BlockRef::from_payload(bp) };
        let old_size = block.size();
        let new_asize = asize_for(new_size, self.quantize);

        if new_asize <= old_size {
            let shrunk = shrink_in_place(&mut self.lists, block, new_asize);
            self.debug_check();
            return shrunk.payload().as_ptr();
        }

        // Growing past the current block. Absorbing a free successor needs
        // no data copy, so it is tried first; the optional symmetric path
        // absorbing a free predecessor is not implemented (see DESIGN.md).
        if try_grow_into_next(&mut self.lists, block, new_asize) {
            self.debug_check();
            return block.payload().as_ptr();
        }

        let target_asize = core::cmp::max(new_asize, self.growth_factor * old_size);
        let Some(new_block) = self.find_or_grow(target_asize) else {
            log::warn!("alloc-core: arena provider exhausted growing a realloc to {new_size} bytes");
            return core::ptr::null_mut();
        };
        let placed = place(&mut self.lists, new_block, target_asize);

        let old_payload_len = old_size - DWORD;
        let copy_len = old_payload_len.min(new_size);
        // SAFETY: `block`'s payload is valid for `old_payload_len` bytes
        // and `placed`'s payload is valid for at least `target_asize -
        // DWORD >= copy_len` bytes; the two ranges cannot overlap since
        // `placed` was just carved out of a distinct free region.
        unsafe {
            core::ptr::copy_nonoverlapping(
                block.payload().as_ptr(),
                placed.payload().as_ptr(),
                copy_len,
            );
        }

        block.set_tags(old_size, false);
        coalesce(&mut self.lists, block);
        self.debug_check();
        placed.payload().as_ptr()
    }

    /// Find a free block of at least `asize` bytes, unlinking it from its
    /// free list, growing the arena if none is large enough.
    fn find_or_grow(&mut self, asize: usize) -> Option<BlockRef> {
        if let Some(block) = self.lists.find_fit(asize) {
            self.lists.remove(block);
            return Some(block);
        }

        let (block, new_epilogue_offset) =
            grow(&mut self.provider, &mut self.lists, self.epilogue_offset, asize)?;
        self.epilogue_offset = new_epilogue_offset;
        self.lists.remove(block);
        Some(block)
    }

    #[cfg(debug_assertions)]
    fn debug_check(&self) {
        let base = self.provider.base();
        // SAFETY: the prologue always sits at this fixed offset once
        // initialized, and `check_heap` only ever compares addresses and
        // reads tag words within the already-initialized arena.
        let prologue_bp = unsafe { NonNull::new_unchecked(base.as_ptr().add(INITIAL_PAD + WORD)) };
        let prologue = unsafe { BlockRef::from_payload(prologue_bp) };
        let first = prologue.next();
        let epilogue_header = unsafe { base.as_ptr().add(self.epilogue_offset).cast::<usize>() };
        crate::debug_check::check_heap(first, epilogue_header);
    }

    #[cfg(not(debug_assertions))]
    fn debug_check(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc_host::HostArena;

    fn new_allocator(capacity: usize) -> Allocator<HostArena> {
        let mut alloc = Allocator::new(HostArena::with_capacity(capacity));
        alloc.init().unwrap();
        alloc
    }

    #[test]
    fn init_twice_errs() {
        let mut alloc = new_allocator(1 << 16);
        assert_eq!(alloc.init(), Err(InitError::AlreadyInitialized));
    }

    #[test]
    fn alloc_zero_returns_null() {
        let mut alloc = new_allocator(1 << 16);
        assert!(alloc.alloc(0).is_null());
    }

    #[test]
    fn alloc_then_free_then_realloc_same_size_reuses_block() {
        let mut alloc = new_allocator(1 << 16);
        let p = alloc.alloc(64);
        assert!(!p.is_null());
        alloc.free(p);
        let q = alloc.alloc(64);
        assert_eq!(p, q);
    }

    #[test]
    fn write_then_read_back_through_pointer() {
        let mut alloc = new_allocator(1 << 16);
        let p = alloc.alloc(32);
        assert!(!p.is_null());
        unsafe {
            for i in 0..32u8 {
                p.add(i as usize).write(i);
            }
            for i in 0..32u8 {
                assert_eq!(p.add(i as usize).read(), i);
            }
        }
        alloc.free(p);
    }

    #[test]
    fn realloc_grow_preserves_contents() {
        let mut alloc = new_allocator(1 << 16);
        let p = alloc.alloc(16);
        unsafe {
            for i in 0..16u8 {
                p.add(i as usize).write(i + 1);
            }
        }
        let q = alloc.realloc(p, 256);
        assert!(!q.is_null());
        unsafe {
            for i in 0..16u8 {
                assert_eq!(q.add(i as usize).read(), i + 1);
            }
        }
    }

    #[test]
    fn realloc_shrink_keeps_pointer_when_no_split_needed() {
        let mut alloc = new_allocator(1 << 16);
        let p = alloc.alloc(64);
        let q = alloc.realloc(p, 60);
        assert_eq!(p, q);
    }

    #[test]
    fn realloc_null_behaves_like_alloc() {
        let mut alloc = new_allocator(1 << 16);
        let p = alloc.realloc(core::ptr::null_mut(), 64);
        assert!(!p.is_null());
    }

    #[test]
    fn realloc_zero_behaves_like_free() {
        let mut alloc = new_allocator(1 << 16);
        let p = alloc.alloc(64);
        let q = alloc.realloc(p, 0);
        assert!(q.is_null());
    }

    #[test]
    fn fragmentation_is_recovered_by_coalescing() {
        let mut alloc = new_allocator(1 << 16);
        let a = alloc.alloc(64);
        let b = alloc.alloc(64);
        let c = alloc.alloc(64);
        alloc.free(a);
        alloc.free(c);
        alloc.free(b);
        let big = alloc.alloc(64 * 3 - 64);
        assert!(!big.is_null());
    }

    #[test]
    fn arena_grows_past_initial_chunk() {
        let mut alloc = new_allocator(1 << 20);
        let mut ptrs = Vec::new();
        for _ in 0..2000 {
            let p = alloc.alloc(64);
            assert!(!p.is_null());
            ptrs.push(p);
        }
        for p in ptrs {
            alloc.free(p);
        }
    }

    #[test]
    fn quantization_knob_changes_block_size_for_matching_request() {
        let mut a = Allocator::new(HostArena::with_capacity(1 << 16)).with_quantization(true);
        a.init().unwrap();
        let p = a.alloc(112);
        assert!(!p.is_null());
        // SAFETY: `p` is a live allocation we just made.
        let block = unsafe { BlockRef::from_payload(NonNull::new_unchecked(p)) };
        assert_eq!(block.size(), asize_for(128, false));
    }
}

//! # Request sizing, splitting, and arena growth
//!
//! Pure, state-light helpers used by [`crate::Allocator`]: converting a
//! caller-requested payload size into an aligned block size, splitting a
//! found free block down to that size, and growing the arena when no free
//! block is large enough.

use crate::coalesce::coalesce;
use crate::config::{round_up, CHUNK_SIZE, DWORD, MIN_BLOCK, QUANTIZATION_TABLE, WORD};
use crate::free_list::FreeLists;
use crate::provider::ArenaProvider;
use crate::tag::BlockRef;
use core::ptr::NonNull;

/// Round `payload_size` up through the quantization table, if enabled, then
/// convert it into a full block size (header + footer overhead, `DWORD`
/// aligned, never below [`MIN_BLOCK`]).
#[must_use]
pub(crate) fn asize_for(payload_size: usize, quantize: bool) -> usize {
    let payload_size = if quantize {
        quantize_size(payload_size)
    } else {
        payload_size
    };
    let needed = payload_size + 2 * WORD;
    core::cmp::max(MIN_BLOCK, round_up(needed, DWORD))
}

/// First table entry whose threshold is `>= size` decides the bucket; a
/// size past every threshold is left untouched.
fn quantize_size(size: usize) -> usize {
    for &(threshold, bucket) in QUANTIZATION_TABLE {
        if size <= threshold {
            return bucket;
        }
    }
    size
}

/// Place an allocation of `asize` bytes into `block` (already unlinked from
/// its free list), splitting off and re-inserting a free remainder when the
/// remainder is itself a valid block.
pub(crate) fn place(lists: &mut FreeLists, block: BlockRef, asize: usize) -> BlockRef {
    let block_size = block.size();
    let remainder = block_size - asize;
    if remainder >= MIN_BLOCK {
        block.set_tags(asize, true);
        let split = block.next();
        split.set_tags(remainder, false);
        coalesce(lists, split);
    } else {
        block.set_tags(block_size, true);
    }
    block
}

/// Shrink an already-allocated `block` down to `new_asize` in place,
/// splitting off and freeing the remainder (coalesced with a following
/// free neighbor, if any). A no-op when the remainder would be smaller
/// than [`MIN_BLOCK`]; the caller still gets a block `>= new_asize`.
pub(crate) fn shrink_in_place(lists: &mut FreeLists, block: BlockRef, new_asize: usize) -> BlockRef {
    let old_size = block.size();
    debug_assert!(new_asize <= old_size);
    let remainder = old_size - new_asize;
    if remainder >= MIN_BLOCK {
        block.set_tags(new_asize, true);
        let split = block.next();
        split.set_tags(remainder, false);
        coalesce(lists, split);
    }
    block
}

/// Attempt to grow an already-allocated `block` up to `new_asize` by
/// absorbing its immediately-following block, when that neighbor is free
/// and large enough. No data copy is ever needed since the payload address
/// does not move. Returns `true` on success (the block is already
/// re-tagged at its new size); `false` leaves `block` completely
/// untouched, for the caller to fall back to allocate-copy-free.
///
/// This is the required grow-in-place path from the placement design; the
/// symmetric variant that absorbs a free *predecessor* is intentionally
/// not implemented (it requires shifting the live payload backward via
/// `memmove`, for no correctness benefit over the always-available
/// allocate-copy-free fallback — see the design notes).
pub(crate) fn try_grow_into_next(lists: &mut FreeLists, block: BlockRef, new_asize: usize) -> bool {
    let old_size = block.size();
    debug_assert!(new_asize > old_size);
    let next = block.next();
    if next.is_allocated() {
        return false;
    }
    let next_size = next.size();
    if old_size + next_size < new_asize {
        return false;
    }

    lists.remove(next);
    let combined = old_size + next_size;
    let remainder = combined - new_asize;
    if remainder >= MIN_BLOCK {
        block.set_tags(new_asize, true);
        let split = block.next();
        split.set_tags(remainder, false);
        coalesce(lists, split);
    } else {
        block.set_tags(combined, true);
    }
    true
}

/// Request more arena from `provider`, splicing the new region in as one
/// large free block ending in a fresh epilogue sentinel, then immediately
/// coalescing it with a free predecessor if the arena's last real block
/// happened to be free.
///
/// Returns the (possibly coalesced) new free block and the updated
/// epilogue offset, or `None` if the provider is exhausted.
pub(crate) fn grow<P: ArenaProvider>(
    provider: &mut P,
    lists: &mut FreeLists,
    epilogue_offset: usize,
    min_payload_need: usize,
) -> Option<(BlockRef, usize)> {
    let new_block_size = core::cmp::max(min_payload_need, CHUNK_SIZE);
    // The new block's header reuses the word the old epilogue header
    // already occupied (counted in `old_len`), so the provider only needs
    // to grant `new_block_size` further bytes: the new block's payload and
    // footer plus the fresh epilogue header that follows it.
    let old_len = provider.extend(new_block_size)?;
    debug_assert_eq!(old_len, epilogue_offset + WORD);

    let base = provider.base();
    // SAFETY: `epilogue_offset + WORD` was, until this call, the arena's
    // exact length, so the old epilogue header lives there and the
    // provider guarantees at least `requested` further writable bytes
    // starting at that address.
    let new_block_bp = unsafe { NonNull::new_unchecked(base.as_ptr().add(epilogue_offset + WORD)) };
    let new_block = unsafe { BlockRef::from_payload(new_block_bp) };
    new_block.set_tags(new_block_size, false);

    let new_epilogue_offset = epilogue_offset + new_block_size;
    // SAFETY: within the just-extended region, immediately after the new
    // block's footer.
    let new_epilogue_bp =
        unsafe { NonNull::new_unchecked(base.as_ptr().add(new_epilogue_offset + WORD)) };
    let new_epilogue = unsafe { BlockRef::from_payload(new_epilogue_bp) };
    new_epilogue.write_sentinel(true);

    let merged = coalesce(lists, new_block);
    Some((merged, new_epilogue_offset))
}

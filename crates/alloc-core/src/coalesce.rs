//! # Immediate coalescing
//!
//! Eager, four-case boundary-tag coalescing, run every time a block is
//! freed or absorbed back into the free-block population. The four cases
//! are the classic ones: neither neighbor free, only the next block free,
//! only the previous block free, and both free.

use crate::free_list::FreeLists;
use crate::tag::BlockRef;

/// Coalesce `block` (already marked free, not yet linked into any free
/// list) with any free neighbors, then insert the resulting block into
/// `lists`. Returns the (possibly merged) block.
///
/// `block` must not be the arena's prologue or epilogue sentinel; both are
/// permanently marked allocated so they never participate in merges, which
/// is what keeps `prev`/`next` total without special-casing the ends here.
pub(crate) fn coalesce(lists: &mut FreeLists, block: BlockRef) -> BlockRef {
    let prev = block.prev();
    let next = block.next();
    let prev_free = !prev.is_allocated();
    let next_free = !next.is_allocated();

    match (prev_free, next_free) {
        (false, false) => {
            lists.insert(block);
            block
        }
        (false, true) => {
            lists.remove(next);
            let merged_size = block.size() + next.size();
            block.set_tags(merged_size, false);
            lists.insert(block);
            block
        }
        (true, false) => {
            lists.remove(prev);
            let merged_size = prev.size() + block.size();
            prev.set_tags(merged_size, false);
            lists.insert(prev);
            prev
        }
        (true, true) => {
            lists.remove(prev);
            lists.remove(next);
            let merged_size = prev.size() + block.size() + next.size();
            prev.set_tags(merged_size, false);
            lists.insert(prev);
            prev
        }
    }
}

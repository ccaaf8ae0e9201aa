//! # Segregated free-list registry
//!
//! Holds one doubly-linked, LIFO free list per size class. Links are stored
//! in-band in the first two payload words of each free block (see
//! [`crate::tag::BlockRef::free_pred`]/`free_succ`), so the registry itself
//! only ever stores the per-class head pointers.

use crate::config::NUM_SIZE_CLASSES;
use crate::size_class::class_of;
use crate::tag::BlockRef;

/// `NUM_SIZE_CLASSES` independent doubly-linked lists of free blocks.
pub(crate) struct FreeLists {
    heads: [Option<BlockRef>; NUM_SIZE_CLASSES],
}

impl FreeLists {
    pub(crate) const fn new() -> Self {
        Self {
            heads: [None; NUM_SIZE_CLASSES],
        }
    }

    /// Insert `block` at the head of its size class's list (LIFO).
    pub(crate) fn insert(&mut self, block: BlockRef) {
        let class = class_of(block.size());
        let old_head = self.heads[class];

        block.set_free_pred(None);
        block.set_free_succ(old_head);
        if let Some(head) = old_head {
            head.set_free_pred(Some(block));
        }
        self.heads[class] = Some(block);
    }

    /// Remove `block` from whatever free list currently holds it.
    ///
    /// The caller must know `block` is actually free and currently linked
    /// (typically because it was just returned by [`Self::find_fit`] or is
    /// a coalescing neighbor known to be free via its tag).
    pub(crate) fn remove(&mut self, block: BlockRef) {
        let class = class_of(block.size());
        let pred = block.free_pred();
        let succ = block.free_succ();

        match pred {
            Some(pred) => pred.set_free_succ(succ),
            None => self.heads[class] = succ,
        }
        if let Some(succ) = succ {
            succ.set_free_pred(pred);
        }
    }

    /// Global best-fit search: scan from `class_of(size)` upward through
    /// every larger class (smaller classes cannot contain a block large
    /// enough), keeping the smallest block seen that is `>= size`.
    ///
    /// Exhaustive within the classes scanned, so the result is the best fit
    /// across the whole registry, not merely within one class.
    pub(crate) fn find_fit(&self, size: usize) -> Option<BlockRef> {
        let start = class_of(size);
        let mut best: Option<BlockRef> = None;

        for class in start..NUM_SIZE_CLASSES {
            let mut cur = self.heads[class];
            while let Some(block) = cur {
                let block_size = block.size();
                if block_size >= size {
                    best = Some(match best {
                        Some(b) if b.size() <= block_size => b,
                        _ => block,
                    });
                }
                cur = block.free_succ();
            }
        }

        best
    }
}

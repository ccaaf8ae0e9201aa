//! # Size-class index
//!
//! Maps a block's total size to one of [`NUM_SIZE_CLASSES`] segregated
//! free-list buckets, following a fixed geometric-doubling schedule so that
//! the mapping (and therefore every free-list insert/remove) stays O(1).

use crate::config::{MIN_BLOCK, NUM_SIZE_CLASSES};

/// Class `i` holds free blocks with size in `(MIN_BLOCK * 2^(i-1), MIN_BLOCK
/// * 2^i]`, except class `0` which holds `(0, MIN_BLOCK]` and class
/// `NUM_SIZE_CLASSES - 1`, which absorbs everything above the schedule.
#[inline]
#[must_use]
pub(crate) const fn class_of(size: usize) -> usize {
    debug_assert!(size >= MIN_BLOCK, "block size below MIN_BLOCK");
    let mut threshold = MIN_BLOCK;
    let mut class = 0;
    while class < NUM_SIZE_CLASSES - 1 {
        if size <= threshold {
            return class;
        }
        threshold *= 2;
        class += 1;
    }
    NUM_SIZE_CLASSES - 1
}

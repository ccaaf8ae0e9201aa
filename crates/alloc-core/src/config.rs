//! Tunable constants for the allocator core.
//!
//! Every knob named by the block-layout and placement design lives here, the
//! same way the reference kernel this crate's structure is drawn from
//! centralizes its memory-layout constants in one authoritative module
//! rather than scattering magic numbers across the subsystems that use them.

/// Machine word size (`W`). The allocator only supports targets where
/// pointers and `usize` share this width.
pub const WORD: usize = core::mem::size_of::<usize>();

/// Double-word block alignment unit (`D = 2W`). Every block starts and ends
/// on a `DWORD`-aligned boundary.
pub const DWORD: usize = 2 * WORD;

/// Smallest possible block size: two tag words (header + footer) plus two
/// pointer-sized free-list link slots (`pred`, `succ`).
pub const MIN_BLOCK: usize = 2 * DWORD;

/// Number of segregated size classes in the free-list registry. Class
/// `NUM_SIZE_CLASSES - 1` absorbs every size above the geometric schedule.
pub const NUM_SIZE_CLASSES: usize = 12;

/// Default arena growth increment when no existing free block satisfies a
/// request (4 KiB, matching a typical page size even though the core never
/// talks to a real page allocator).
pub const CHUNK_SIZE: usize = 4096;

/// Bytes reserved at the front of the arena before the prologue: one word,
/// so that the prologue (and, transitively, the first real block's payload)
/// lands on a `DWORD` boundary. See [`crate::provider::ArenaProvider`] for
/// the alignment precondition this relies on.
pub const INITIAL_PAD: usize = WORD;

/// `pad + prologue (D) + epilogue header (W)`, requested from the provider
/// exactly once, before the first real free block is carved out.
pub const PREAMBLE_BYTES: usize = INITIAL_PAD + DWORD + WORD;

/// Fixed-size quantization table: requests for exactly these payload sizes
/// are rounded up to the paired bucket size *before* `asize` is computed,
/// when [`Allocator::with_quantization`](crate::Allocator::with_quantization)
/// is enabled. A pure pre-transform: it only ever rounds up, so it cannot
/// violate correctness, only trade a little more internal fragmentation for
/// fewer distinct size classes on workloads dominated by these sizes.
pub const QUANTIZATION_TABLE: &[(usize, usize)] = &[(112, 128), (448, 512)];

/// Default `realloc` fallback growth factor `k` in `max(new_asize, k *
/// old_size)`. `1` disables over-allocation; embedders that expect repeated
/// `realloc` growth can opt into a larger factor via
/// [`Allocator::with_growth_factor`](crate::Allocator::with_growth_factor).
pub const DEFAULT_GROWTH_FACTOR: usize = 1;

/// Round `size` up to the nearest multiple of `align` (`align` a power of two).
#[inline]
#[must_use]
pub const fn round_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

//! Structured errors for the ambient (non-hot-path) parts of the API.
//!
//! `alloc`/`free`/`realloc` keep the classical C-style contract (a null
//! pointer signals failure) since they sit on the hot path and mirror
//! `GlobalAlloc`'s own calling convention; initialization, by contrast, is
//! a one-shot, cold-path call, so it gets a real error enum in the style
//! the reference kernel uses for its own fallible setup paths.

/// Failure modes for [`crate::Allocator::init`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    /// `init` was called on an allocator that has already been initialized.
    #[error("allocator already initialized")]
    AlreadyInitialized,
    /// The arena provider could not supply the initial preamble chunk.
    #[error("arena provider exhausted during initialization")]
    ProviderExhausted,
}

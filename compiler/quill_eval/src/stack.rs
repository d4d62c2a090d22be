//! Native stack headroom for the evaluator.
//!
//! Every nested expression and every script function call adds Rust
//! frames. Before descending, the evaluator asks `stacker` for headroom
//! and gets a fresh segment when it runs low. WASM targets skip the check.

/// Frames left after this point trigger a new segment.
#[cfg(not(target_arch = "wasm32"))]
const HEADROOM: usize = 128 * 1024;

/// Size of each freshly allocated segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `eval` with enough native stack for one more level of nesting.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_headroom<R>(eval: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(HEADROOM, SEGMENT, eval)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_headroom<R>(eval: impl FnOnce() -> R) -> R {
    eval()
}

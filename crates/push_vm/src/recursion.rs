//! Native stack growth for walks over nested code.
//!
//! Code values nest without limit, and several operations recurse over them:
//! detaching a value into a `ValueTree`, allocating a tree back into a heap,
//! copying a value into another interpreter, and parsing or rendering a state
//! document. Each recursive step goes through `ensure_sufficient_stack`.

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Headroom below which a new segment is allocated.
    const MIN_REMAINING: usize = 128 * 1024;

    /// Size of each new segment.
    const SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(MIN_REMAINING, SEGMENT, f)
}

/// `stacker` has no wasm support; nesting depth is bounded by the host there.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

//! Stack growth for the recursive evaluator.
//!
//! Each user-level call nests a dozen or so Rust frames, so without this the
//! host stack runs out well before `max_call_depth` is reached.

/// Headroom that must remain before `f` runs.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT: usize = 2 * 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

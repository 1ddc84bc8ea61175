//! Composition depth guard.
//!
//! Sub-workflow calls can reference each other transitively; without a
//! bound, a cyclic or deeply nested composition would recurse the scheduler
//! indefinitely. The depth is carried forward on every invocation request,
//! so descendants see an accurate count without re-walking ancestry.

/// Maximum sub-workflow nesting depth.
pub const MAX_COMPOSITION_DEPTH: u32 = 10;

/// The composition would exceed the nesting bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sub-workflow depth {depth} exceeds maximum {max}")]
pub struct DepthExceeded {
    pub depth: u32,
    pub max: u32,
}

/// Compute the depth of the child invocation from the parent's depth.
///
/// A root run has no depth set, so its first child runs at depth 0.
/// Side-effect-free.
pub fn check_depth(parent_depth: Option<u32>) -> Result<u32, DepthExceeded> {
    // Saturating: a corrupt near-u32::MAX parent depth must still trip the
    // bound check, not wrap past it.
    let depth = parent_depth.map_or(0, |d| d.saturating_add(1));
    if depth >= MAX_COMPOSITION_DEPTH {
        Err(DepthExceeded {
            depth,
            max: MAX_COMPOSITION_DEPTH,
        })
    } else {
        Ok(depth)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Shared strategy surface: the result union and poll backoff.

use serde_json::Value;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Cap on the exponential poll backoff, in seconds (5 minutes).
pub const POLL_DELAY_CAP_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// StrategyResult
// ---------------------------------------------------------------------------

/// Outcome of one strategy invocation.
///
/// The sole channel between a strategy and the orchestrator. `Waiting` is
/// only produced by the awaited strategy while polling; it is never returned
/// on first contact when starting the child failed.
#[derive(Debug, Clone)]
pub enum StrategyResult {
    /// The parent step's job is done; record `output` and advance.
    Completed { output: Option<Value> },
    /// The parent step failed; record `error` and advance.
    Failed { error: Value },
    /// The child is still running; the step will be re-ticked later.
    Waiting,
    /// Cancellation was observed before the first delay was scheduled.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Poll backoff
// ---------------------------------------------------------------------------

/// Delay to request before the next poll, as a scheduler duration string.
///
/// Exponential: `min(2^poll_count, cap)` seconds, seeded `1s, 2s, 4s, 8s,
/// 16s, ...`. A child that never terminates keeps polling at the cap.
pub fn poll_delay(poll_count: u32) -> String {
    let secs = 1u64
        .checked_shl(poll_count)
        .unwrap_or(u64::MAX)
        .min(POLL_DELAY_CAP_SECS);
    format!("{secs}s")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

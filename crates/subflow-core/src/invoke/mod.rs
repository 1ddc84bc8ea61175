//! Sub-workflow invocation: strategies, output resolution, and orchestration.
//!
//! This module contains the distributed state machine behind the
//! "invoke another workflow" step:
//! - `depth` -- pure composition-depth guard
//! - `output` -- child output resolution with container-step fallback
//! - `strategy` -- the strategy result union and poll backoff
//! - `awaited` -- wait-for-completion strategy (poll/backoff/resume)
//! - `detached` -- fire-and-forget strategy
//! - `orchestrator` -- per-tick entry point tying it all together

pub mod awaited;
pub mod depth;
pub mod detached;
pub mod orchestrator;
pub mod output;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testkit;

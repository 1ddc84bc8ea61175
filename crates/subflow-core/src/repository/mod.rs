//! Repository trait definitions (read-side ports).

pub mod workflow;

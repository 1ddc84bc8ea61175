//! Shared domain types for the subflow invocation engine.
//!
//! This crate holds the data model that crosses the boundary between the
//! execution engine and the sub-workflow orchestrator: workflow definition
//! snapshots, execution records, the persisted wait state, and the
//! invocation request. It depends only on serde and friends -- never on
//! any database or IO crate.

pub mod error;
pub mod execution;
pub mod workflow;

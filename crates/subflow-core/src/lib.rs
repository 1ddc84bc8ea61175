//! Sub-workflow invocation orchestration.
//!
//! This crate defines the "ports" (collaborator traits) the surrounding
//! execution engine implements, and the orchestrator that lets one workflow
//! step trigger a second, independently-scheduled workflow: start it, wait
//! (or not) for its completion, and feed its result back into the parent
//! run. It depends only on `subflow-types` -- never on any database or IO
//! crate.

pub mod engine;
pub mod invoke;
pub mod repository;
pub mod runtime;

//! Workflow definition snapshot and sub-workflow step configuration.
//!
//! `WorkflowDefinition` is the read-only view of a target workflow fetched
//! once per invocation decision. The orchestrator never executes the body
//! itself; it only checks the `enabled`/`valid` flags and hands the
//! definition to the execution engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Workflow Definition
// ---------------------------------------------------------------------------

/// Immutable snapshot of a workflow definition.
///
/// Fetched from the workflow store at the start of an invocation decision
/// and treated as frozen for the rest of that tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// UUIDv7 assigned on first save.
    pub id: Uuid,
    /// Human-readable workflow name.
    pub name: String,
    /// Whether the workflow may be started at all.
    pub enabled: bool,
    /// Whether the stored body passed validation.
    pub valid: bool,
    /// Opaque executable body (graph/YAML). Consumed by the execution
    /// engine, never inspected here.
    #[serde(default)]
    pub body: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Sub-Workflow Step Configuration
// ---------------------------------------------------------------------------

/// How the parent step relates to the child execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// Wait for the child to reach a terminal status, polling across ticks.
    Awaited,
    /// Fire-and-forget: start the child and finish the step immediately.
    Detached,
}

impl Default for InvocationMode {
    fn default() -> Self {
        Self::Awaited
    }
}

/// The rendered configuration of a sub-workflow step.
///
/// Produced fresh each tick by the runtime's input renderer; never
/// persisted in this form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubWorkflowStepConfig {
    /// ID of the workflow to invoke.
    pub workflow_id: Uuid,
    /// Inputs handed to the child execution.
    #[serde(default)]
    pub inputs: HashMap<String, serde_json::Value>,
    /// Declared invocation mode of the step.
    #[serde(default)]
    pub mode: InvocationMode,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Execution tracking types for sub-workflow invocation.
//!
//! Everything here except `WaitState` is recomputed every tick from the
//! authoritative stores. `WaitState` is the single entity with cross-tick
//! lifetime: it is written durably before a tick ends, so losing in-memory
//! state between ticks (or across a process restart) costs nothing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Execution Status
// ---------------------------------------------------------------------------

/// Status of a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

impl ExecutionStatus {
    /// Whether no further transitions are possible.
    ///
    /// Any status outside the terminal four is treated as "still running",
    /// including statuses this snapshot does not know about yet.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::TimedOut
        )
    }
}

// ---------------------------------------------------------------------------
// Execution Record
// ---------------------------------------------------------------------------

/// Read-only snapshot of a child execution, fetched from the execution store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// UUIDv7 execution ID.
    pub id: Uuid,
    /// ID of the workflow definition being executed.
    pub workflow_id: Uuid,
    /// Current execution status.
    pub status: ExecutionStatus,
    /// Explicit top-level output declared by the workflow, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Error payload if the execution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    /// IDs of the step records produced so far, in execution order.
    #[serde(default)]
    pub step_ids: Vec<String>,
    /// When the execution started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

/// One frame of a nested step's ancestry chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFrame {
    /// Step ID of the enclosing container step.
    pub step_id: String,
}

/// Execution record of a single step inside a child execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// UUIDv7 step record ID.
    pub id: Uuid,
    /// Step ID matching the workflow definition.
    pub step_id: String,
    /// Ancestry chain of container step IDs. Empty for top-level steps.
    #[serde(default)]
    pub scope_stack: Vec<ScopeFrame>,
    /// Output produced by this step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Parent Context
// ---------------------------------------------------------------------------

/// Identity of the currently-running workflow instance that owns the step.
///
/// Owned by the surrounding execution engine; the orchestrator only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentContext {
    /// ID of the owning execution.
    pub execution_id: Uuid,
    /// ID of the owning workflow definition.
    pub workflow_id: Uuid,
    /// ID of the sub-workflow step within the owning workflow.
    pub step_id: String,
    /// Space the run belongs to (tenancy scope).
    pub space_id: Uuid,
    /// Identity that triggered the run.
    pub caller_id: String,
    /// Whether this is a test run.
    pub is_test_run: bool,
    /// Count of nested sub-workflow calls from the root run to this one.
    /// Unset on root runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition_depth: Option<u32>,
}

// ---------------------------------------------------------------------------
// Wait State
// ---------------------------------------------------------------------------

/// Persisted wait state for an awaited sub-workflow invocation.
///
/// Created the first time the child is started; `poll_count` increments on
/// every non-terminal poll; logically deleted when the step finishes. This
/// is the only state that must survive across ticks and process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitState {
    /// ID of the invoked workflow definition.
    pub workflow_id: Uuid,
    /// ID of the in-flight child execution.
    pub execution_id: Uuid,
    /// When the child was started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Number of completed non-terminal polls.
    pub poll_count: u32,
}

// ---------------------------------------------------------------------------
// Invocation Request
// ---------------------------------------------------------------------------

/// Request handed to the execution engine to start a child execution.
///
/// Built fresh each tick from rendered step configuration; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// ID of the workflow to start.
    pub child_workflow_id: Uuid,
    /// Inputs for the child execution.
    pub inputs: HashMap<String, serde_json::Value>,
    /// Space the child runs in (same as the parent's).
    pub space_id: Uuid,
    /// Identity on whose behalf the child runs.
    pub caller_id: String,
    /// Workflow ID of the invoking run.
    pub parent_workflow_id: Uuid,
    /// Execution ID of the invoking run.
    pub parent_execution_id: Uuid,
    /// Step ID of the invoking step.
    pub parent_step_id: String,
    /// Composition depth the child inherits. Descendants see an accurate
    /// count without re-walking ancestry.
    pub parent_depth: u32,
    /// Propagated test-run flag.
    pub is_test_run: bool,
}

impl InvocationRequest {
    /// Build a request for a child of the given parent run.
    pub fn for_child(
        child_workflow_id: Uuid,
        inputs: HashMap<String, serde_json::Value>,
        parent: &ParentContext,
        parent_depth: u32,
    ) -> Self {
        Self {
            child_workflow_id,
            inputs,
            space_id: parent.space_id,
            caller_id: parent.caller_id.clone(),
            parent_workflow_id: parent.workflow_id,
            parent_execution_id: parent.execution_id,
            parent_step_id: parent.step_id.clone(),
            parent_depth,
            is_test_run: parent.is_test_run,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Child execution output resolution.
//!
//! Computes the value a completed child execution hands back to the parent
//! step. The fast path is an explicit top-level output on the execution
//! itself; otherwise the resolver walks the child's step records, modelling
//! "a container step with no output of its own surfaces its last sub-step's
//! output".

use serde_json::Value;
use subflow_types::error::StoreError;
use subflow_types::execution::ExecutionRecord;

use crate::repository::workflow::WorkflowStore;

/// Resolve the output of a completed child execution.
///
/// Resolution order:
/// 1. The execution's explicit non-null output, verbatim.
/// 2. The last top-level step record's own output.
/// 3. Descending through container steps: the last record scoped directly
///    under the current step, wrapped as a one-element array once found.
/// 4. `None` when nothing above applies.
///
/// The leaf/container asymmetry (bare value vs. one-element array) is part
/// of the contract: callers can tell whether the child's last step was a
/// leaf or a composite.
pub async fn resolve_output<S: WorkflowStore>(
    store: &S,
    execution: &ExecutionRecord,
) -> Result<Option<Value>, StoreError> {
    if let Some(output) = &execution.output {
        if !output.is_null() {
            return Ok(Some(output.clone()));
        }
    }

    if execution.step_ids.is_empty() {
        return Ok(None);
    }

    let records = store
        .list_step_records(&execution.id, &execution.step_ids)
        .await?;

    // Last top-level record: the step whose result represents the execution.
    let Some(last_top) = records.iter().rfind(|r| r.scope_stack.is_empty()) else {
        return Ok(None);
    };
    if let Some(output) = &last_top.output {
        return Ok(Some(output.clone()));
    }

    // Container step without an output of its own: descend to its last
    // child in execution order, repeating through nested containers.
    let mut parent_step_id = last_top.step_id.as_str();
    loop {
        let child = records
            .iter()
            .rfind(|r| r.scope_stack.last().is_some_and(|f| f.step_id == parent_step_id));
        match child {
            None => return Ok(None),
            Some(record) => match &record.output {
                Some(output) => return Ok(Some(Value::Array(vec![output.clone()]))),
                None => parent_step_id = record.step_id.as_str(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! In-memory collaborator doubles for invocation tests.
//!
//! Each mock records the calls it receives so tests can assert interaction
//! properties (at-most-one start, zero setup calls on resume, delay
//! sequences) rather than just final state.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use dashmap::DashMap;
use serde_json::Value;
use subflow_types::error::StoreError;
use subflow_types::execution::{
    ExecutionRecord, InvocationRequest, ParentContext, StepRecord, WaitState,
};
use subflow_types::workflow::{SubWorkflowStepConfig, WorkflowDefinition};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::engine::{EngineError, ExecutionEngine, StartedExecution};
use crate::repository::workflow::WorkflowStore;
use crate::runtime::{RunRuntime, RuntimeError, StepRuntime};

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

pub(crate) struct MockStore {
    workflows: DashMap<Uuid, WorkflowDefinition>,
    executions: DashMap<Uuid, ExecutionRecord>,
    step_records: DashMap<Uuid, Vec<StepRecord>>,
    step_record_calls: AtomicU32,
    fail_executions: AtomicBool,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        Self {
            workflows: DashMap::new(),
            executions: DashMap::new(),
            step_records: DashMap::new(),
            step_record_calls: AtomicU32::new(0),
            fail_executions: AtomicBool::new(false),
        }
    }

    pub(crate) fn put_workflow(&self, workflow: WorkflowDefinition) {
        self.workflows.insert(workflow.id, workflow);
    }

    pub(crate) fn put_execution(&self, execution: ExecutionRecord) {
        self.executions.insert(execution.id, execution);
    }

    pub(crate) fn put_step_records(&self, execution_id: Uuid, records: Vec<StepRecord>) {
        self.step_records.insert(execution_id, records);
    }

    pub(crate) fn step_record_calls(&self) -> u32 {
        self.step_record_calls.load(Ordering::SeqCst)
    }

    /// Make every `get_execution` call fail with a query error.
    pub(crate) fn fail_executions(&self) {
        self.fail_executions.store(true, Ordering::SeqCst);
    }
}

impl WorkflowStore for MockStore {
    async fn get_workflow(
        &self,
        id: &Uuid,
        _space_id: &Uuid,
    ) -> Result<Option<WorkflowDefinition>, StoreError> {
        Ok(self.workflows.get(id).map(|w| w.clone()))
    }

    async fn get_execution(
        &self,
        execution_id: &Uuid,
        _space_id: &Uuid,
    ) -> Result<Option<ExecutionRecord>, StoreError> {
        if self.fail_executions.load(Ordering::SeqCst) {
            return Err(StoreError::Query("injected store failure".to_string()));
        }
        Ok(self.executions.get(execution_id).map(|e| e.clone()))
    }

    async fn list_step_records(
        &self,
        execution_id: &Uuid,
        step_ids: &[String],
    ) -> Result<Vec<StepRecord>, StoreError> {
        self.step_record_calls.fetch_add(1, Ordering::SeqCst);
        let Some(records) = self.step_records.get(execution_id) else {
            return Ok(vec![]);
        };
        // Filter to the requested step ids, preserving the given order.
        let mut out = Vec::new();
        for step_id in step_ids {
            for record in records.iter().filter(|r| &r.step_id == step_id) {
                out.push(record.clone());
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// MockEngine
// ---------------------------------------------------------------------------

pub(crate) struct MockEngine {
    pub(crate) start_calls: Mutex<Vec<InvocationRequest>>,
    pub(crate) cancel_calls: Mutex<Vec<Uuid>>,
    next_execution_id: Uuid,
    fail_start: AtomicBool,
    fail_cancel: AtomicBool,
}

impl MockEngine {
    pub(crate) fn new() -> Self {
        Self {
            start_calls: Mutex::new(Vec::new()),
            cancel_calls: Mutex::new(Vec::new()),
            next_execution_id: Uuid::now_v7(),
            fail_start: AtomicBool::new(false),
            fail_cancel: AtomicBool::new(false),
        }
    }

    /// The execution ID every successful `start` hands out.
    pub(crate) fn execution_id(&self) -> Uuid {
        self.next_execution_id
    }

    pub(crate) fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_cancel(&self) {
        self.fail_cancel.store(true, Ordering::SeqCst);
    }

    pub(crate) fn start_count(&self) -> usize {
        self.start_calls.lock().unwrap().len()
    }
}

impl ExecutionEngine for MockEngine {
    async fn start(
        &self,
        _workflow: &WorkflowDefinition,
        request: &InvocationRequest,
    ) -> Result<StartedExecution, EngineError> {
        self.start_calls.lock().unwrap().push(request.clone());
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(EngineError::Submission(
                "injected submission failure".to_string(),
            ));
        }
        Ok(StartedExecution {
            execution_id: self.next_execution_id,
        })
    }

    async fn cancel(&self, execution_id: &Uuid, _space_id: &Uuid) -> Result<(), EngineError> {
        self.cancel_calls.lock().unwrap().push(*execution_id);
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(EngineError::Cancel("injected cancel failure".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockRuntime
// ---------------------------------------------------------------------------

pub(crate) struct MockRuntime {
    config: SubWorkflowStepConfig,
    wait: Mutex<Option<WaitState>>,
    token: CancellationToken,
    pub(crate) delays: Mutex<Vec<String>>,
    pub(crate) recorded_inputs: Mutex<Vec<Value>>,
    pub(crate) finished: Mutex<Option<Option<Value>>>,
    pub(crate) failed: Mutex<Vec<Value>>,
    started_calls: AtomicU32,
    render_calls: AtomicU32,
    flush_calls: AtomicU32,
    fail_set_wait_state: AtomicBool,
}

impl MockRuntime {
    pub(crate) fn new(config: SubWorkflowStepConfig) -> Self {
        Self {
            config,
            wait: Mutex::new(None),
            token: CancellationToken::new(),
            delays: Mutex::new(Vec::new()),
            recorded_inputs: Mutex::new(Vec::new()),
            finished: Mutex::new(None),
            failed: Mutex::new(Vec::new()),
            started_calls: AtomicU32::new(0),
            render_calls: AtomicU32::new(0),
            flush_calls: AtomicU32::new(0),
            fail_set_wait_state: AtomicBool::new(false),
        }
    }

    pub(crate) fn seed_wait_state(&self, state: WaitState) {
        *self.wait.lock().unwrap() = Some(state);
    }

    pub(crate) fn stored_wait_state(&self) -> Option<WaitState> {
        self.wait.lock().unwrap().clone()
    }

    pub(crate) fn signal_cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn started_count(&self) -> u32 {
        self.started_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn render_count(&self) -> u32 {
        self.render_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn flush_count(&self) -> u32 {
        self.flush_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_set_wait_state(&self) {
        self.fail_set_wait_state.store(true, Ordering::SeqCst);
    }
}

impl StepRuntime for MockRuntime {
    async fn mark_started(&self) -> Result<(), RuntimeError> {
        self.started_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn mark_finished(&self, output: Option<Value>) -> Result<(), RuntimeError> {
        *self.finished.lock().unwrap() = Some(output);
        Ok(())
    }

    async fn mark_failed(&self, error: Value) -> Result<(), RuntimeError> {
        self.failed.lock().unwrap().push(error);
        Ok(())
    }

    async fn wait_state(&self) -> Result<Option<WaitState>, RuntimeError> {
        Ok(self.wait.lock().unwrap().clone())
    }

    async fn set_wait_state(&self, state: WaitState) -> Result<(), RuntimeError> {
        if self.fail_set_wait_state.load(Ordering::SeqCst) {
            return Err(RuntimeError::State(
                "injected wait state failure".to_string(),
            ));
        }
        *self.wait.lock().unwrap() = Some(state);
        Ok(())
    }

    async fn request_delay(&self, delay: &str) -> Result<bool, RuntimeError> {
        self.delays.lock().unwrap().push(delay.to_string());
        Ok(true)
    }

    async fn render_inputs(&self) -> Result<SubWorkflowStepConfig, RuntimeError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.config.clone())
    }

    async fn record_inputs(&self, inputs: &Value) -> Result<(), RuntimeError> {
        self.recorded_inputs.lock().unwrap().push(inputs.clone());
        Ok(())
    }

    fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    async fn flush_logs(&self) {
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// MockRun
// ---------------------------------------------------------------------------

pub(crate) struct MockRun {
    advance_calls: AtomicU32,
}

impl MockRun {
    pub(crate) fn new() -> Self {
        Self {
            advance_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn advance_count(&self) -> u32 {
        self.advance_calls.load(Ordering::SeqCst)
    }
}

impl RunRuntime for MockRun {
    async fn advance_to_next_step(&self) -> Result<(), RuntimeError> {
        self.advance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub(crate) fn parent_context() -> ParentContext {
    ParentContext {
        execution_id: Uuid::now_v7(),
        workflow_id: Uuid::now_v7(),
        step_id: "run-sub".to_string(),
        space_id: Uuid::now_v7(),
        caller_id: "user-1".to_string(),
        is_test_run: false,
        composition_depth: None,
    }
}

pub(crate) fn workflow(name: &str) -> WorkflowDefinition {
    WorkflowDefinition {
        id: Uuid::now_v7(),
        name: name.to_string(),
        enabled: true,
        valid: true,
        body: serde_json::json!({}),
    }
}

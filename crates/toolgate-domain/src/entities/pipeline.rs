//! Ephemeral per-step outcome produced while a pipeline composition runs.
//!
//! Step results are never persisted; they live only for the duration of one
//! `mcp_pipe` invocation, threaded through `{vars, steps, last}` for
//! `${dotted.path}` interpolation and `{"$ref": "..."}` resolution.

use serde_json::Value;

use crate::value_objects::{PipelineStepId, PipelineStepOutcome};

/// The outcome of one step within a pipeline composition.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStepResult {
    pub id: PipelineStepId,
    /// Step name as given in the pipeline definition, used as the `steps.<name>` key.
    pub name: String,
    pub outcome: PipelineStepOutcome,
    /// The invoked tool's raw JSON output, present when `outcome` is `Ok`.
    pub output: Option<Value>,
    /// Machine-stable error code, present when `outcome` is `Error`.
    pub error_code: Option<String>,
    pub duration_ms: u64,
}

impl PipelineStepResult {
    /// Whether a later step may safely reference this step's output.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.outcome == PipelineStepOutcome::Ok
    }
}

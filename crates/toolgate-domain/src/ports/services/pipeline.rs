//! Pipeline Composer service port (C8).

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::PipelineStepResult;
use crate::error::Result;
use crate::value_objects::TenantFingerprint;

/// Port for executing an ordered/parallel/nested tool composition.
///
/// Implementations never recurse through the transport: each step invokes
/// tool dispatch (C9) in-process.
#[async_trait]
pub trait PipelineComposer: Send + Sync {
    /// Run a pipeline definition and return every step's outcome in order.
    async fn run(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        definition: Value,
    ) -> Result<Vec<PipelineStepResult>>;
}

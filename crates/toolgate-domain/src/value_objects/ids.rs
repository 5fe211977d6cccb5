//! Strong-typed UUID identifiers for all persisted entities.

define_id!(FileId, "Strong typed identifier for a file row");
define_id!(ChunkId, "Strong typed identifier for a content chunk");
define_id!(IndexJobId, "Strong typed identifier for an outbox index job");
define_id!(TurnGuardId, "Strong typed identifier for a memory turn guard");
define_id!(CallLogId, "Strong typed identifier for a call-audit entry");
define_id!(FactId, "Strong typed identifier for a memory fact");
define_id!(
    PipelineStepId,
    "Strong typed identifier for a pipeline step result"
);

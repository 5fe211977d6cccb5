//! Small value-object enums shared across components.

use serde::{Deserialize, Serialize};

/// Embedding provider identifier, resolved against the provider registry.
pub type EmbeddingProviderKind = String;

/// Vector store provider identifier, resolved against the provider registry.
pub type VectorStoreProviderKind = String;

/// Cache provider identifier, resolved against the provider registry.
pub type CacheProviderKind = String;

/// Retention tier for a memory fact, controlling how long it survives recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemoryTier {
    /// Short-lived, session-scoped fact.
    L1,
    /// Long-lived fact promoted across sessions.
    L2,
}

impl MemoryTier {
    /// The config key naming this tier's retention knob.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
        }
    }
}

impl_from_str!(MemoryTier, "unknown memory tier: {}", {
    "l1" => MemoryTier::L1,
    "l2" => MemoryTier::L2,
});

/// Kind of mutation an outbox job represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexJobKind {
    /// Rebuild chunks/embeddings/lexical rows for a file's current content.
    Upsert,
    /// Remove all indexed rows for a file.
    Delete,
}

/// Lifecycle state of an outbox job as it moves through the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IndexJobStatus {
    /// Inserted, not yet claimed by a worker.
    Pending,
    /// Claimed by a worker and in flight.
    Processing,
    /// Completed successfully.
    Done,
    /// Exhausted its retry budget.
    Failed,
}

/// Idempotency state for a memory `after_turn` commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TurnGuardStatus {
    /// Commit is in flight; a concurrent retry should not duplicate work.
    Processing,
    /// Commit has completed; later retries are a no-op that replays the result.
    Done,
}

/// How a pipeline executes its child steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStepMode {
    /// Steps run one after another; later steps may reference earlier outputs.
    Sequence,
    /// Steps run concurrently; none may reference a sibling's output.
    Parallel,
}

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStepOutcome {
    /// The step's tool call returned successfully.
    Ok,
    /// The step's tool call returned an error.
    Error,
    /// The step was never run because an earlier dependency failed.
    Skipped,
}

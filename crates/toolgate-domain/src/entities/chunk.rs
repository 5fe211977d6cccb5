//! Derived, index-worker-owned rows rebuilt from a file's current content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChunkId, FileId, TenantFingerprint};

/// A contiguous slice of a file's content, the unit of embedding and retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Primary key.
    pub id: ChunkId,
    /// Owning tenant, denormalized for single-predicate search queries.
    pub tenant: TenantFingerprint,
    /// Owning project, denormalized for the same reason.
    pub project: String,
    /// The file this chunk was cut from.
    pub file_id: FileId,
    /// Path of the owning file at chunk-build time, denormalized for display.
    pub file_path: String,
    /// Zero-based position of this chunk within the file's chunk sequence.
    pub ordinal: u32,
    /// Start offset (inclusive) of this chunk within the owning file's byte content.
    pub start_byte: u64,
    /// End offset (exclusive) of this chunk within the owning file's byte content.
    pub end_byte: u64,
    /// Chunk text; always equal to `file.content[start_byte..end_byte]` at build time.
    pub text: String,
    /// Version of the owning [`crate::entities::File`] this chunk was built from;
    /// a stale chunk (version behind the file) is excluded from search.
    pub file_version: u64,
    /// Timestamp this chunk's row was last read by a search response.
    pub last_served_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl_table_schema!(Chunk, "chunks",
    columns: [
        ("id", Uuid, pk),
        ("tenant_fingerprint", Text),
        ("project", Text),
        ("file_id", Uuid),
        ("file_path", Text),
        ("ordinal", Integer),
        ("start_byte", Integer),
        ("end_byte", Integer),
        ("text", Text),
        ("file_version", Integer),
        ("last_served_at", Timestamp, nullable),
        ("created_at", Timestamp),
    ],
    indexes: [
        "idx_chunks_file" => ["file_id"],
        "idx_chunks_tenant_project" => ["tenant_fingerprint", "project"],
    ],
    foreign_keys: [
        ("file_id", "files", "id"),
    ],
);

/// A chunk's dense vector representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkEmbedding {
    /// The chunk this embedding was computed for; also the primary key.
    pub chunk_id: ChunkId,
    /// Embedding model identifier, used to detect stale embeddings on model change.
    pub model: String,
    /// Dense vector, length equal to the model's output dimension.
    pub vector: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl_table_schema!(ChunkEmbedding, "chunk_embeddings",
    columns: [
        ("chunk_id", Uuid, pk),
        ("model", Text),
        ("vector_json", Json),
        ("created_at", Timestamp),
    ],
    foreign_keys: [
        ("chunk_id", "chunks", "id"),
    ],
);

/// A chunk's lexical (full-text) representation, mirrored into an FTS5 index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLexicalRow {
    /// The chunk this row indexes; also the primary key.
    pub chunk_id: ChunkId,
    /// Normalized text fed to the lexical index (lower-cased, tokenized).
    pub normalized_text: String,
    pub created_at: DateTime<Utc>,
}

impl_table_schema!(ChunkLexicalRow, "chunk_lexical_rows",
    columns: [
        ("chunk_id", Uuid, pk),
        ("normalized_text", Text),
        ("created_at", Timestamp),
    ],
    foreign_keys: [
        ("chunk_id", "chunks", "id"),
    ],
);

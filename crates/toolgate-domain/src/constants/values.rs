//! Chunking and virtual file system domain constants.

/// Minimum character length for a content chunk to be worth indexing.
pub const CHUNK_MIN_LENGTH: usize = 25;

/// Target character length for a content chunk before a split is considered.
pub const CHUNK_TARGET_LENGTH: usize = 1200;

/// Maximum number of chunks extracted from a single file.
pub const CHUNKS_MAX_PER_FILE: usize = 200;

/// Root virtual path; every project's files live beneath it.
pub const VIRTUAL_ROOT: &str = "/";

/// Reserved path prefix under which memory facts and session logs live.
pub const MEMORY_PATH_PREFIX: &str = "/memory";

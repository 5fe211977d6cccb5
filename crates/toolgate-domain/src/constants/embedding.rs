//! Known embedding dimensions, used to validate provider configuration and
//! to size the brute-force vector store's in-memory arrays up front.

/// `FastEmbed` default model dimension (MiniLM-L6-v2), used by the in-process
/// test double and local-first deployments.
pub const EMBEDDING_DIMENSION_FASTEMBED_DEFAULT: usize = 384;
/// `OpenAI` text-embedding-3-small dimension.
pub const EMBEDDING_DIMENSION_OPENAI_SMALL: usize = 1536;
/// `OpenAI` text-embedding-3-large dimension.
pub const EMBEDDING_DIMENSION_OPENAI_LARGE: usize = 3072;
/// System-wide default when a provider does not report its dimension.
pub const EMBEDDING_DIMENSION_DEFAULT: usize = 384;

//! A tiered long-term memory fact.
//!
//! Facts have no table of their own: each is persisted as an ordinary
//! [`crate::entities::File`] under `/memory/{session_id}/facts/{tier}/{fact_id}.md`
//! and therefore rides the same chunk/embed/lexical machinery as any other
//! file. This type is the parsed, in-memory view the memory engine and
//! retention worker operate on.

use chrono::{DateTime, Utc};

use crate::value_objects::{FactId, MemoryTier};

/// One extracted fact, recalled during `before_turn` and swept by the
/// retention worker once past [`MemoryFact::expires_at`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryFact {
    pub id: FactId,
    pub session_id: String,
    pub tier: MemoryTier,
    pub content: String,
    /// Turn that produced this fact, for provenance.
    pub source_turn_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MemoryFact {
    /// The virtual file path this fact is persisted under.
    #[must_use]
    pub fn file_path(&self) -> String {
        format!("/memory/{}/facts/{}/{}.md", self.session_id, self.tier.as_str(), self.id)
    }

    /// Whether this fact has aged out of recall and should be swept.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_places_fact_under_tiered_directory() {
        let fact = MemoryFact {
            id: FactId::from_name("fact-1"),
            session_id: "sess-1".into(),
            tier: MemoryTier::L1,
            content: "user prefers dark mode".into(),
            source_turn_id: "turn-1".into(),
            created_at: Utc::now(),
            expires_at: Utc::now(),
        };
        assert_eq!(
            fact.file_path(),
            format!("/memory/sess-1/facts/l1/{}.md", fact.id)
        );
    }
}

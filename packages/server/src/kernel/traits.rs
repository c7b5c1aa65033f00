// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseTicketStore)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Ticket Store Trait (Infrastructure - ticket artifact persistence)
// =============================================================================

/// A stored artifact as handed back by a ticket store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait BaseTicketStore: Send + Sync {
    /// Persist an artifact, returning the reference saved on the registration row.
    async fn put(&self, bytes: &[u8], content_type: &str) -> Result<String>;

    /// Resolve a reference produced by `put`.
    async fn get(&self, reference: &str) -> Result<StoredArtifact>;
}

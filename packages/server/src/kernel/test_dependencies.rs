// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseTicketStore, InlineTicketStore, ServerDeps, StoredArtifact};
use crate::domains::auth::JwtService;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const TEST_JWT_ISSUER: &str = "campus-tickets-test";

// =============================================================================
// Mock Ticket Store
// =============================================================================

/// Inline store that records every `put` and can be switched into failure.
pub struct MockTicketStore {
    inner: InlineTicketStore,
    failing: AtomicBool,
    puts: Mutex<Vec<String>>,
}

impl MockTicketStore {
    pub fn new() -> Self {
        Self {
            inner: InlineTicketStore::new(),
            failing: AtomicBool::new(false),
            puts: Mutex::new(Vec::new()),
        }
    }

    /// Every subsequent `put` fails until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Content types of successful puts, in call order.
    pub fn stored_content_types(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }
}

impl Default for MockTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseTicketStore for MockTicketStore {
    async fn put(&self, bytes: &[u8], content_type: &str) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("ticket store unavailable");
        }
        let reference = self.inner.put(bytes, content_type).await?;
        self.puts.lock().unwrap().push(content_type.to_string());
        Ok(reference)
    }

    async fn get(&self, reference: &str) -> Result<StoredArtifact> {
        self.inner.get(reference).await
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub ticket_store: Arc<MockTicketStore>,
    pub jwt_service: Arc<JwtService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            ticket_store: Arc::new(MockTicketStore::new()),
            jwt_service: Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
        }
    }

    pub fn server_deps(&self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.ticket_store.clone(),
            self.jwt_service.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

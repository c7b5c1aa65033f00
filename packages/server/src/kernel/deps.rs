//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain actions.
//! External services use trait abstractions to enable testing.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::BaseTicketStore;

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Where issued ticket documents live; the registration row keeps the reference.
    pub ticket_store: Arc<dyn BaseTicketStore>,
    /// JWT service for bearer token verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        ticket_store: Arc<dyn BaseTicketStore>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            db_pool,
            ticket_store,
            jwt_service,
        }
    }
}

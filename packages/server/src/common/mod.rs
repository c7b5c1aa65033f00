// Common types and utilities shared across the ticketing domains

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;

pub use auth::{Actor, AuthError, Capability, Role};
pub use entity_ids::*;
pub use error::{Conflict, TicketingError, TicketingResult};
pub use id::{Id, V4, V7};

//! Caller identity and authorization checks.
//!
//! The identity service hands us a verified `{caller_id, role}`; nothing in
//! here validates tokens. Checks read as:
//!
//! ```rust,ignore
//! Actor::new(caller_id, role)
//!     .can(Capability::SendNotifications)
//!     .check()?;
//! ```

mod builder;
mod capability;
mod errors;
mod role;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::Capability;
pub use errors::AuthError;
pub use role::Role;

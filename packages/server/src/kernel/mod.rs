//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod ticket_store;
pub mod traits;

pub use deps::ServerDeps;
pub use test_dependencies::{MockTicketStore, TestDependencies};
pub use ticket_store::InlineTicketStore;
pub use traits::*;

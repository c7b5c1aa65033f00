// Campus Event Ticketing - API Core
//
// Capacity-constrained registration, ticket issuance, door check-in and
// event notifications for campus events.
//
// Business logic lives per-domain in domains/*/actions/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;

//! Users domain - read-side projection of identity-service accounts
//!
//! Accounts are created and edited elsewhere; the ticketing core only needs
//! a user's role (admission checks) and name/email (printed on tickets).

pub mod models;

pub use models::user::User;

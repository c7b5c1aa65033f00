//! Auth domain - bearer token validation
//!
//! Identity and sessions are issued by the campus identity service. This
//! domain only verifies the tokens it mints and turns their claims into an
//! `Actor` for the ticketing core.

pub mod jwt;

pub use jwt::{Claims, JwtService};

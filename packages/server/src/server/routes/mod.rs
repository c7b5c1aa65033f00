// HTTP routes
pub mod check_in;
pub mod health;
pub mod notifications;
pub mod registrations;

pub use check_in::*;
pub use health::*;
pub use notifications::*;
pub use registrations::*;

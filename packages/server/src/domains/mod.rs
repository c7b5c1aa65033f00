// Business domains
pub mod auth;
pub mod events;
pub mod notifications;
pub mod registrations;
pub mod tickets;
pub mod users;

//! Notifications domain - event fan-out and per-user inbox
//!
//! A fan-out writes one row per recipient. The event history view collapses
//! those copies by (title, message, sender); a user's inbox never does.

pub mod actions;
pub mod models;

pub use models::notification::{InboxEntry, NewNotification, Notification, NotificationType};

//! Typed ids for every entity the ticketing core touches.

pub use super::id::{Id, V4, V7};

/// Marker for users (attendees, organizers, admins).
pub struct User;

/// Marker for events.
pub struct Event;

/// Marker for registrations. Registration ids double as ticket ids.
pub struct Registration;

/// Marker for notifications.
pub struct Notification;

pub type UserId = Id<User>;

pub type EventId = Id<Event>;

/// Random (v4) so a ticket id printed in a QR code reveals nothing about
/// when or in which order it was issued.
pub type RegistrationId = Id<Registration, V4>;

pub type NotificationId = Id<Notification>;

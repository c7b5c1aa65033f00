//! Notification domain actions

mod fan_out;
mod inbox;
mod send;
mod validation;

pub use fan_out::{notify_event, FanOutReport};
pub use inbox::{
    event_notifications, list_user_notifications, mark_notification_read, page_bounds,
    unread_count,
};
pub use send::send_notification;

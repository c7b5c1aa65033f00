//! Direct notification to a single user

use tracing::info;

use crate::common::{Actor, Capability, EventId, TicketingError, TicketingResult, UserId};
use crate::domains::events::Event;
use crate::domains::notifications::models::notification::{
    NewNotification, Notification, NotificationType,
};
use crate::domains::users::User;
use crate::kernel::ServerDeps;

use super::validation::validate_content;

/// Send a notification to one user. Organizers and admins only; an attached
/// event must be one the sender organizes unless the sender is an admin.
pub async fn send_notification(
    actor: Actor,
    recipient_id: UserId,
    title: &str,
    message: &str,
    notification_type: NotificationType,
    event_id: Option<EventId>,
    deps: &ServerDeps,
) -> TicketingResult<Notification> {
    let (title, message) = validate_content(title, message)?;
    actor.can(Capability::SendNotifications).check()?;

    User::find_by_id(recipient_id, &deps.db_pool)
        .await?
        .ok_or_else(|| TicketingError::not_found("Recipient not found"))?;

    if let Some(event_id) = event_id {
        Event::find_by_id(event_id, &deps.db_pool)
            .await?
            .filter(|event| actor.is_admin() || event.is_organized_by(actor.user_id))
            .ok_or_else(|| TicketingError::not_found_or_unauthorized("Event"))?;
    }

    let new = NewNotification {
        event_id,
        sender_id: actor.user_id,
        recipient_id,
        title,
        message,
        notification_type,
    };
    let notification = Notification::insert(new, &deps.db_pool).await?;

    info!(
        notification_id = %notification.id,
        sender_id = %actor.user_id,
        %recipient_id,
        "Notification sent"
    );
    Ok(notification)
}

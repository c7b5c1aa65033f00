//! Inbox and history queries

use crate::common::{
    Actor, Capability, EventId, NotificationId, TicketingError, TicketingResult, UserId,
};
use crate::domains::events::Event;
use crate::domains::notifications::models::notification::{InboxEntry, Notification};
use crate::kernel::ServerDeps;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Clamp caller-supplied paging to sane bounds.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

pub async fn list_user_notifications(
    user_id: UserId,
    limit: Option<i64>,
    offset: Option<i64>,
    deps: &ServerDeps,
) -> TicketingResult<Vec<InboxEntry>> {
    let (limit, offset) = page_bounds(limit, offset);
    Ok(Notification::list_for_recipient(user_id, limit, offset, &deps.db_pool).await?)
}

pub async fn unread_count(user_id: UserId, deps: &ServerDeps) -> TicketingResult<i64> {
    Ok(Notification::unread_count(user_id, &deps.db_pool).await?)
}

pub async fn mark_notification_read(
    notification_id: NotificationId,
    user_id: UserId,
    deps: &ServerDeps,
) -> TicketingResult<Notification> {
    Notification::mark_read(notification_id, user_id, &deps.db_pool)
        .await?
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Notification"))
}

/// Deduplicated notification history of an event, for its organizer.
pub async fn event_notifications(
    event_id: EventId,
    actor: Actor,
    deps: &ServerDeps,
) -> TicketingResult<Vec<Notification>> {
    actor.can(Capability::ManageOwnEvents).check()?;

    Event::find_by_id(event_id, &deps.db_pool)
        .await?
        .filter(|event| actor.is_admin() || event.is_organized_by(actor.user_id))
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Event"))?;

    Ok(Notification::event_history(event_id, &deps.db_pool).await?)
}

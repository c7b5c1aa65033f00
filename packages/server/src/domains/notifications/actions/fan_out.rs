//! Event fan-out - one notification per approved registrant plus the organizer

use tracing::{debug, info, warn};

use crate::common::{Actor, Capability, EventId, TicketingError, TicketingResult};
use crate::domains::events::Event;
use crate::domains::notifications::models::notification::{
    NewNotification, Notification, NotificationType,
};
use crate::kernel::ServerDeps;

use super::validation::validate_content;

/// Outcome of a fan-out: how many recipients were resolved and how many rows
/// were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FanOutReport {
    pub expected: usize,
    pub delivered: usize,
}

impl FanOutReport {
    /// Partial delivery is success; nothing delivered out of at least one
    /// expected is an error.
    pub fn into_result(self) -> TicketingResult<usize> {
        if self.delivered == 0 && self.expected > 0 {
            return Err(TicketingError::PartialFailure {
                expected: self.expected,
            });
        }
        Ok(self.delivered)
    }
}

/// Send one notification to every approved registrant of an event and to
/// its organizer. Returns the number of notifications written.
///
/// 1. Validate content and the sender's capability
/// 2. Load the event; only its organizer (or an admin) may broadcast
/// 3. Resolve recipients in a single read
/// 4. Insert one row per recipient independently; failures are logged and skipped
pub async fn notify_event(
    event_id: EventId,
    actor: Actor,
    title: &str,
    message: &str,
    notification_type: NotificationType,
    deps: &ServerDeps,
) -> TicketingResult<usize> {
    let (title, message) = validate_content(title, message)?;
    actor.can(Capability::SendNotifications).check()?;

    Event::find_by_id(event_id, &deps.db_pool)
        .await?
        .filter(|event| actor.is_admin() || event.is_organized_by(actor.user_id))
        .ok_or_else(|| TicketingError::not_found_or_unauthorized("Event"))?;

    let recipients = Notification::event_recipients(event_id, &deps.db_pool).await?;
    debug!(%event_id, recipients = recipients.len(), "Resolved fan-out recipients");

    let mut report = FanOutReport {
        expected: recipients.len(),
        delivered: 0,
    };

    for recipient_id in recipients {
        let new = NewNotification::builder()
            .event_id(event_id)
            .sender_id(actor.user_id)
            .recipient_id(recipient_id)
            .title(title.clone())
            .message(message.clone())
            .notification_type(notification_type)
            .build();

        match Notification::insert(new, &deps.db_pool).await {
            Ok(_) => report.delivered += 1,
            Err(e) => warn!(%event_id, %recipient_id, error = %e, "Failed to notify recipient"),
        }
    }

    info!(
        %event_id,
        sender_id = %actor.user_id,
        expected = report.expected,
        delivered = report.delivered,
        "Event notification sent"
    );

    report.into_result()
}

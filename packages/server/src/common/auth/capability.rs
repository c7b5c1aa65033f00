use std::fmt;

/// Role-gated actions in the ticketing core.
///
/// Ownership (e.g. "is this the organizer of *this* event") is checked by the
/// operation itself; capabilities only answer "may this kind of account ever
/// do this".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Hold a registration for an event.
    RegisterForEvents,

    /// Send event broadcasts or direct notifications.
    SendNotifications,

    /// View participants and run check-in for owned events.
    ManageOwnEvents,

    /// Read any registration regardless of ownership.
    ViewAnyRegistration,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Capability::RegisterForEvents => "register for events",
            Capability::SendNotifications => "send notifications",
            Capability::ManageOwnEvents => "manage events",
            Capability::ViewAnyRegistration => "view other registrations",
        };
        f.write_str(action)
    }
}

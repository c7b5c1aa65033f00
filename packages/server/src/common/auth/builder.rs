use super::{AuthError, Capability, Role};
use crate::common::entity_ids::UserId;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Specify what the actor is trying to do.
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

pub struct CapabilityBuilder {
    actor: Actor,
    capability: Capability,
}

impl CapabilityBuilder {
    pub fn check(self) -> Result<Actor, AuthError> {
        if role_permits(self.actor.role, self.capability) {
            Ok(self.actor)
        } else {
            Err(AuthError::NotPermitted {
                role: self.actor.role,
                capability: self.capability,
            })
        }
    }
}

fn role_permits(role: Role, capability: Capability) -> bool {
    match (role, capability) {
        (Role::Attendee, Capability::RegisterForEvents) => true,
        (Role::Attendee, Capability::SendNotifications)
        | (Role::Attendee, Capability::ManageOwnEvents)
        | (Role::Attendee, Capability::ViewAnyRegistration) => false,

        (Role::Organizer, Capability::RegisterForEvents) => false,
        (Role::Organizer, Capability::SendNotifications)
        | (Role::Organizer, Capability::ManageOwnEvents) => true,
        (Role::Organizer, Capability::ViewAnyRegistration) => false,

        // Admins keep an attendee-style registration path for testing events.
        (Role::Admin, Capability::RegisterForEvents)
        | (Role::Admin, Capability::SendNotifications)
        | (Role::Admin, Capability::ManageOwnEvents)
        | (Role::Admin, Capability::ViewAnyRegistration) => true,
    }
}

//! Roles and the capabilities resolved from them
//!
//! Capabilities are never stored on records or actions. They are computed
//! from the actor's role by [`Capabilities::for_role`], the one place where
//! role branching happens.

use crate::error::EngineError;
use crate::ids::ActorId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profile role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Lab administrator
    Admin,
    /// Principal investigator, approves work
    PrincipalInvestigator,
    /// Bench researcher
    ResearchAssociate,
    /// Purchasing and inventory staff
    Accounts,
    /// Read-only visitor
    Guest,
}

impl Role {
    /// All roles, in privilege order
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::PrincipalInvestigator,
        Role::ResearchAssociate,
        Role::Accounts,
        Role::Guest,
    ];

    /// Wire name of the role
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::PrincipalInvestigator => "principal_investigator",
            Role::ResearchAssociate => "research_associate",
            Role::Accounts => "accounts",
            Role::Guest => "guest",
        }
    }

    /// Capabilities granted to this role
    #[inline]
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        Capabilities::for_role(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| EngineError::validation(format!("unknown role: '{s}'")))
    }
}

/// Named permission checked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create, edit and delete records
    Edit,
    /// Approve or reject records awaiting review
    Approve,
    /// Edit or delete records created by someone else
    EditAny,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Edit => f.write_str("edit"),
            Capability::Approve => f.write_str("approve"),
            Capability::EditAny => f.write_str("edit others' records"),
        }
    }
}

/// Capability flags resolved from a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May create, edit and delete
    pub can_edit: bool,
    /// May approve and reject
    pub can_approve: bool,
    /// May edit records created by others
    pub can_edit_any: bool,
    /// Read-only access
    pub view_only: bool,
    /// Menu restricted to inventory (presentation concern only)
    pub inventory_only: bool,
}

impl Capabilities {
    /// Resolve capabilities for a role
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self {
            can_edit: !matches!(role, Role::Guest),
            can_approve: matches!(role, Role::Admin | Role::PrincipalInvestigator),
            can_edit_any: matches!(role, Role::Admin),
            view_only: matches!(role, Role::Guest),
            inventory_only: matches!(role, Role::Accounts),
        }
    }

    /// Check a single capability
    #[inline]
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Edit => self.can_edit,
            Capability::Approve => self.can_approve,
            Capability::EditAny => self.can_edit_any,
        }
    }
}

/// Authenticated user performing an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Profile id
    pub id: ActorId,
    /// Profile role
    pub role: Role,
}

impl Actor {
    /// Create actor
    #[inline]
    #[must_use]
    pub fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }

    /// Capabilities of this actor
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role)
    }

    /// Fail with `PermissionDenied` unless the actor holds `capability`
    ///
    /// # Errors
    /// Returns [`EngineError::PermissionDenied`] naming the capability and role
    pub fn require(&self, capability: Capability) -> Result<(), EngineError> {
        if self.capabilities().allows(capability) {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied {
                required: capability,
                role: self.role,
            })
        }
    }

    /// Fail unless the actor may edit a record created by `owner`
    ///
    /// Creators may edit their own records; everyone else needs
    /// [`Capability::EditAny`].
    ///
    /// # Errors
    /// Returns [`EngineError::PermissionDenied`] when neither holds
    pub fn require_owner_or(&self, owner: ActorId) -> Result<(), EngineError> {
        self.require(Capability::Edit)?;
        if self.id == owner {
            Ok(())
        } else {
            self.require(Capability::EditAny)
        }
    }

    /// Whether the actor is an administrator
    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_is_view_only() {
        let caps = Capabilities::for_role(Role::Guest);
        assert!(caps.view_only);
        assert!(!caps.can_edit);
        assert!(!caps.can_approve);
    }

    #[test]
    fn approvers_are_admin_and_pi() {
        let approvers: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| r.capabilities().can_approve)
            .collect();
        assert_eq!(approvers, vec![Role::Admin, Role::PrincipalInvestigator]);
    }

    #[test]
    fn accounts_edits_inventory_only() {
        let caps = Role::Accounts.capabilities();
        assert!(caps.can_edit);
        assert!(caps.inventory_only);
        assert!(!caps.can_approve);
    }

    #[test]
    fn require_reports_role() {
        let actor = Actor::new(ActorId::new(), Role::ResearchAssociate);
        assert!(actor.require(Capability::Edit).is_ok());
        assert_eq!(
            actor.require(Capability::Approve),
            Err(EngineError::PermissionDenied {
                required: Capability::Approve,
                role: Role::ResearchAssociate,
            })
        );
    }

    #[test]
    fn only_creator_or_admin_edits() {
        let owner = ActorId::new();
        let creator = Actor::new(owner, Role::ResearchAssociate);
        let colleague = Actor::new(ActorId::new(), Role::ResearchAssociate);
        let admin = Actor::new(ActorId::new(), Role::Admin);
        let visitor = Actor::new(owner, Role::Guest);

        assert!(creator.require_owner_or(owner).is_ok());
        assert!(admin.require_owner_or(owner).is_ok());
        assert_eq!(
            colleague.require_owner_or(owner),
            Err(EngineError::PermissionDenied {
                required: Capability::EditAny,
                role: Role::ResearchAssociate,
            })
        );
        assert_eq!(
            visitor.require_owner_or(owner),
            Err(EngineError::PermissionDenied {
                required: Capability::Edit,
                role: Role::Guest,
            })
        );
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}

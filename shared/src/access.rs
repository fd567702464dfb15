//! Access policy
//!
//! Every operation needs an authenticated identity; administrative ones
//! additionally need the Administrator role claim. The identity is always
//! passed in explicitly by the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Role that unlocks administration, reports, and supplier creation
pub const ADMINISTRATOR: &str = "Administrator";

/// The authenticated caller: name plus role claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Role claims are matched exactly
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_administrator(&self) -> bool {
        self.has_role(ADMINISTRATOR)
    }
}

/// Why access was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Role '{0}' required")]
    MissingRole(String),
}

/// Check the caller may run an operation that requires `role` (if any)
pub fn authorize<'a>(
    identity: Option<&'a Identity>,
    role: Option<&str>,
) -> Result<&'a Identity, AccessError> {
    let identity = identity.ok_or(AccessError::Unauthenticated)?;
    match role {
        Some(role) if !identity.has_role(role) => Err(AccessError::MissingRole(role.to_string())),
        _ => Ok(identity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(roles: &[&str]) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            name: "sara".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_identity_is_unauthenticated() {
        assert_eq!(authorize(None, None), Err(AccessError::Unauthenticated));
        assert_eq!(
            authorize(None, Some(ADMINISTRATOR)),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn test_any_identity_passes_without_role() {
        let user = identity(&[]);
        assert!(authorize(Some(&user), None).is_ok());
    }

    #[test]
    fn test_admin_role_required() {
        let clerk = identity(&["Clerk"]);
        assert_eq!(
            authorize(Some(&clerk), Some(ADMINISTRATOR)),
            Err(AccessError::MissingRole(ADMINISTRATOR.to_string()))
        );

        let admin = identity(&["Clerk", ADMINISTRATOR]);
        assert!(authorize(Some(&admin), Some(ADMINISTRATOR)).is_ok());
    }

    #[test]
    fn test_role_match_is_exact() {
        assert!(!identity(&["administrator"]).is_administrator());
    }
}

//! Principal
//!
//! The authenticated identity and role under which an operation executes.
//! Identity verification itself belongs to the external identity provider;
//! every core call receives the principal explicitly rather than reading
//! ambient session state.

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::DomainError;

/// Platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Creator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creator" => Ok(Self::Creator),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::UnknownStatus {
                entity: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// The acting principal for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn creator(id: Uuid) -> Self {
        Self::new(id, Role::Creator)
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("creator".parse::<Role>().unwrap(), Role::Creator);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_principal_roles() {
        let admin = Principal::admin(Uuid::new_v4());
        assert!(admin.is_admin());

        let creator = Principal::creator(Uuid::new_v4());
        assert!(!creator.is_admin());
    }
}

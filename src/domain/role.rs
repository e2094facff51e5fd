//! User roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three roles the backend knows about.
///
/// Unknown role strings deserialize to `User`, the most restrictive role.
/// `User` sits last because serde only accepts `#[serde(other)]` on the
/// final variant; wire names come from `rename_all` and display order from
/// [`Role::ALL`], so the declaration order carries no other meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Technician,
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Technician, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Technician => "technician",
            Role::Admin => "admin",
        }
    }

    /// Display label for terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Technician => "Technician",
            Role::Admin => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "technician" => Ok(Role::Technician),
            "admin" => Ok(Role::Admin),
            other => Err(format!(
                "unknown role '{}' (expected user, technician or admin)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_roundtrip() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(role, back);
        }
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!(Role::from_str("root").is_err());
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
    }
}

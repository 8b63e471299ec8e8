use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role of a staff user. Determines which order transitions the user
/// may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Prepares tickets: moves orders into and out of the kitchen.
    #[serde(alias = "kitchen")]
    Kitchen,

    /// Takes orders at the tables and delivers them.
    #[serde(alias = "waiter")]
    Waiter,

    /// Can perform any permitted transition, cancel, and delete orders.
    #[serde(alias = "admin")]
    Admin,
}

impl Role {
    /// All roles, in a stable order.
    pub const ALL: [Role; 3] = [Role::Kitchen, Role::Waiter, Role::Admin];

    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Kitchen => "Kitchen",
            Role::Waiter => "Waiter",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl std::fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kitchen" | "kitchen" => Ok(Role::Kitchen),
            "Waiter" | "waiter" => Ok(Role::Waiter),
            "Admin" | "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_and_lowercase_names() {
        assert_eq!("Kitchen".parse::<Role>().unwrap(), Role::Kitchen);
        assert_eq!("waiter".parse::<Role>().unwrap(), Role::Waiter);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("Chef".parse::<Role>().is_err());
    }

    #[test]
    fn deserialize_accepts_the_same_names_as_parse() {
        for name in ["Kitchen", "kitchen", "Waiter", "waiter", "Admin", "admin"] {
            let from_json: Role = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(from_json, name.parse::<Role>().unwrap());
        }
        assert!(serde_json::from_str::<Role>("\"KITCHEN\"").is_err());
        assert!("KITCHEN".parse::<Role>().is_err());
    }

    #[test]
    fn display_matches_serialized_name() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }
}

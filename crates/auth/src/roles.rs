use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Privilege tier of a user account.
///
/// Tiers are totally ordered: each one includes every privilege of the tiers
/// below it, so role checks are a single comparison (`role >= required`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Authenticated account with no staff privileges.
    Member,
    /// Baseline staff account.
    Staff,
    Cashier,
    Manager,
    Superuser,
}

/// Legacy boolean view of a role, derived and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub is_staff: bool,
    pub is_cashier: bool,
    pub is_manager: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Member,
        Role::Staff,
        Role::Cashier,
        Role::Manager,
        Role::Superuser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Staff => "staff",
            Role::Cashier => "cashier",
            Role::Manager => "manager",
            Role::Superuser => "superuser",
        }
    }

    /// Whether this role meets or exceeds `required`.
    pub fn has_at_least(self, required: Role) -> bool {
        self >= required
    }

    pub fn flags(self) -> RoleFlags {
        RoleFlags {
            is_staff: self >= Role::Staff,
            is_cashier: self >= Role::Cashier,
            is_manager: self >= Role::Manager,
            is_superuser: self >= Role::Superuser,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Member => "Authenticated account; can browse the catalog",
            Role::Staff => "Staff account; can browse the catalog",
            Role::Cashier => "Front-desk account; can browse the catalog",
            Role::Manager => "Maintains catalog, parties, purchase orders and staff accounts",
            Role::Superuser => "Unrestricted account; manages managers",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(Role::Superuser > Role::Manager);
        assert!(Role::Manager > Role::Cashier);
        assert!(Role::Cashier > Role::Staff);
        assert!(Role::Staff > Role::Member);
        assert!(Role::Manager.has_at_least(Role::Manager));
        assert!(!Role::Cashier.has_at_least(Role::Manager));
    }

    #[test]
    fn flags_imply_every_lower_tier() {
        let manager = Role::Manager.flags();
        assert!(manager.is_staff && manager.is_cashier && manager.is_manager);
        assert!(!manager.is_superuser);

        let member = Role::Member.flags();
        assert!(!member.is_staff && !member.is_cashier && !member.is_manager);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(" cashier ".parse::<Role>().unwrap(), Role::Cashier);
        assert_eq!(
            "admin".parse::<Role>().unwrap_err(),
            UnknownRole("admin".to_string())
        );
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_value(Role::Superuser).unwrap();
        assert_eq!(json, serde_json::json!("superuser"));
    }
}

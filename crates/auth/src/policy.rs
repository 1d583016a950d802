//! Action-scoped permission table.
//!
//! Every request resolves to a `(ResourceKind, Action)` pair. The required
//! privilege comes from a short override table, falling back to a per-action
//! default when no override matches.

use serde::{Deserialize, Serialize};

use crate::Role;

/// CRUD-style request intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
}

/// Resource families guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Unit,
    Category,
    Product,
    Supplier,
    Customer,
    PurchaseOrder,
    User,
}

/// What an identity must satisfy for an action to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum Requirement {
    /// Any resolved identity, whatever its role.
    Authenticated,
    AtLeast(Role),
}

impl Requirement {
    pub fn is_met_by(&self, role: Role) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::AtLeast(required) => role.has_at_least(*required),
        }
    }
}

impl core::fmt::Display for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Requirement::Authenticated => f.write_str("authenticated"),
            Requirement::AtLeast(role) => write!(f, "at least {role}"),
        }
    }
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::PartialUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
        }
    }

    /// Whether the action mutates state.
    pub fn is_write(&self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::PartialUpdate)
    }
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Unit,
        ResourceKind::Category,
        ResourceKind::Product,
        ResourceKind::Supplier,
        ResourceKind::Customer,
        ResourceKind::PurchaseOrder,
        ResourceKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Unit => "unit",
            ResourceKind::Category => "category",
            ResourceKind::Product => "product",
            ResourceKind::Supplier => "supplier",
            ResourceKind::Customer => "customer",
            ResourceKind::PurchaseOrder => "purchase_order",
            ResourceKind::User => "user",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

impl core::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}

/// Override rows: `(resource, action or every action, requirement)`.
///
/// Rows naming a specific action must precede catch-all rows for the same
/// resource; the first match wins.
const OVERRIDES: &[(ResourceKind, Option<Action>, Requirement)] = &[
    (ResourceKind::PurchaseOrder, None, Requirement::AtLeast(Role::Manager)),
    (ResourceKind::User, None, Requirement::AtLeast(Role::Manager)),
];

fn default_requirement(action: Action) -> Requirement {
    match action {
        Action::List | Action::Retrieve => Requirement::Authenticated,
        Action::Create | Action::Update | Action::PartialUpdate => {
            Requirement::AtLeast(Role::Manager)
        }
    }
}

/// Requirement for `action` on `resource`.
pub fn required_for(resource: ResourceKind, action: Action) -> Requirement {
    OVERRIDES
        .iter()
        .find(|(r, a, _)| *r == resource && a.is_none_or(|a| a == action))
        .map(|(_, _, requirement)| *requirement)
        .unwrap_or_else(|| default_requirement(action))
}

/// One row of the effective policy, for audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyEntry {
    pub resource: ResourceKind,
    pub action: Action,
    pub requirement: Requirement,
}

/// The full effective policy: every resource crossed with every action.
pub fn policy_matrix() -> Vec<PolicyEntry> {
    ResourceKind::ALL
        .into_iter()
        .flat_map(|resource| {
            Action::ALL.into_iter().map(move |action| PolicyEntry {
                resource,
                action,
                requirement: required_for(resource, action),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_reads_are_open_to_any_identity() {
        for resource in [
            ResourceKind::Unit,
            ResourceKind::Category,
            ResourceKind::Product,
            ResourceKind::Supplier,
            ResourceKind::Customer,
        ] {
            assert_eq!(required_for(resource, Action::List), Requirement::Authenticated);
            assert_eq!(required_for(resource, Action::Retrieve), Requirement::Authenticated);
            for action in [Action::Create, Action::Update, Action::PartialUpdate] {
                assert_eq!(
                    required_for(resource, action),
                    Requirement::AtLeast(Role::Manager)
                );
            }
        }
    }

    #[test]
    fn purchase_orders_and_users_need_manager_for_everything() {
        for resource in [ResourceKind::PurchaseOrder, ResourceKind::User] {
            for action in Action::ALL {
                assert_eq!(
                    required_for(resource, action),
                    Requirement::AtLeast(Role::Manager)
                );
            }
        }
    }

    #[test]
    fn requirement_checks_role_ladder() {
        assert!(Requirement::Authenticated.is_met_by(Role::Member));
        assert!(Requirement::AtLeast(Role::Manager).is_met_by(Role::Manager));
        assert!(Requirement::AtLeast(Role::Manager).is_met_by(Role::Superuser));
        assert!(!Requirement::AtLeast(Role::Manager).is_met_by(Role::Cashier));
    }

    #[test]
    fn matrix_covers_every_pair() {
        let matrix = policy_matrix();
        assert_eq!(matrix.len(), ResourceKind::ALL.len() * Action::ALL.len());
    }

    #[test]
    fn requirement_serializes_with_role() {
        let json = serde_json::to_value(Requirement::AtLeast(Role::Manager)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "at_least", "role": "manager"}));
        let json = serde_json::to_value(Requirement::Authenticated).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "authenticated"}));
    }

    #[test]
    fn names_parse_back() {
        assert_eq!("partial_update".parse::<Action>().unwrap(), Action::PartialUpdate);
        assert_eq!(
            "purchase_order".parse::<ResourceKind>().unwrap(),
            ResourceKind::PurchaseOrder
        );
        assert!("delete".parse::<Action>().is_err());
    }
}

use serde::Serialize;
use thiserror::Error;

use tillpoint_core::UserId;

use crate::policy::{required_for, Action, Requirement, ResourceKind};
use crate::{Principal, Role};

/// Outcome of a gate evaluation. The gate itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No identity was resolved for the request.
    Unauthenticated,
    /// An identity was resolved but its role is too low.
    Forbidden { required: Role },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication credentials were not provided")]
    Unauthenticated,

    #[error("forbidden: requires at least the '{required}' role")]
    Forbidden { required: Role },

    #[error("cannot assign role '{role}': it must be below your own")]
    PrivilegeEscalation { role: Role },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(denial.into()),
        }
    }
}

impl From<Denial> for AuthzError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => AuthzError::Unauthenticated,
            Denial::Forbidden { required } => AuthzError::Forbidden { required },
        }
    }
}

/// Decide whether `principal` may perform `action` on `resource`.
///
/// - No IO
/// - No panics
/// - No mutation of the principal or any record
pub fn authorize(
    principal: Option<&Principal>,
    resource: ResourceKind,
    action: Action,
) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny(Denial::Unauthenticated);
    };

    match required_for(resource, action) {
        requirement if requirement.is_met_by(principal.role) => Decision::Allow,
        Requirement::AtLeast(required) => Decision::Deny(Denial::Forbidden { required }),
        Requirement::Authenticated => Decision::Allow,
    }
}

/// An actor may only grant roles strictly below their own.
pub fn ensure_can_assign(actor: &Principal, role: Role) -> Result<(), AuthzError> {
    if role < actor.role {
        Ok(())
    } else {
        Err(AuthzError::PrivilegeEscalation { role })
    }
}

/// Account visibility for user management, layered after the gate.
///
/// An actor sees accounts strictly below their own role, never their own
/// account: managers see cashiers/staff/members, superusers see every
/// non-superuser.
pub fn can_view_account(actor: &Principal, target_id: UserId, target_role: Role) -> bool {
    target_id != actor.user_id && target_role < actor.role
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub resource: ResourceKind,
    pub action: Action,
    pub requirement: Requirement,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// The principal that was checked, if any.
    pub principal: Option<PrincipalState>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: UserId,
    pub role: Role,
    #[serde(flatten)]
    pub flags: crate::RoleFlags,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    InsufficientRole,
}

/// Explain why an authorization decision was made (or would be made).
///
/// Always agrees with [`authorize`] for the same inputs.
pub fn explain_authorization(
    principal: Option<&Principal>,
    resource: ResourceKind,
    action: Action,
) -> AuthorizationExplanation {
    let requirement = required_for(resource, action);
    let decision = authorize(principal, resource, action);
    let state = principal.map(|p| PrincipalState {
        user_id: p.user_id,
        role: p.role,
        flags: p.role.flags(),
    });

    let (reason, denial_reason) = match (decision, principal) {
        (Decision::Allow, Some(p)) => (
            format!("role '{}' satisfies requirement '{}'", p.role, requirement),
            None,
        ),
        (Decision::Deny(Denial::Forbidden { required }), Some(p)) => (
            format!(
                "role '{}' does not satisfy requirement '{}' for {} on {}",
                p.role, requirement, action, resource
            ),
            Some(DenialReason {
                kind: DenialKind::InsufficientRole,
                message: format!("Requires at least the '{required}' role"),
                suggestions: vec![format!(
                    "Ask an account with a role above '{required}' to perform this action or to grant you a higher role"
                )],
            }),
        ),
        _ => (
            "no identity was resolved for the request".to_string(),
            Some(DenialReason {
                kind: DenialKind::Unauthenticated,
                message: "Authentication credentials were not provided".to_string(),
                suggestions: vec!["Log in and send the token as 'Authorization: Bearer <token>'".to_string()],
            }),
        ),
    };

    AuthorizationExplanation {
        resource,
        action,
        requirement,
        granted: decision.is_allowed(),
        reason,
        principal: state,
        denial_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tillpoint_core::SessionId;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: UserId::new(),
            email: format!("{role}@example.com"),
            role,
            session_id: SessionId::new(),
        }
    }

    const CATALOG: [ResourceKind; 5] = [
        ResourceKind::Unit,
        ResourceKind::Category,
        ResourceKind::Product,
        ResourceKind::Supplier,
        ResourceKind::Customer,
    ];

    #[test]
    fn cashier_reads_catalog_but_cannot_write() {
        let cashier = principal(Role::Cashier);
        for resource in CATALOG {
            assert!(authorize(Some(&cashier), resource, Action::List).is_allowed());
            assert!(authorize(Some(&cashier), resource, Action::Retrieve).is_allowed());
            assert_eq!(
                authorize(Some(&cashier), resource, Action::Create),
                Decision::Deny(Denial::Forbidden { required: Role::Manager })
            );
        }
    }

    #[test]
    fn manager_and_superuser_may_write_catalog() {
        for role in [Role::Manager, Role::Superuser] {
            let actor = principal(role);
            for resource in CATALOG {
                for action in Action::ALL {
                    assert!(authorize(Some(&actor), resource, action).is_allowed());
                }
            }
        }
    }

    #[test]
    fn purchase_orders_closed_to_cashier_even_for_reads() {
        let cashier = principal(Role::Cashier);
        for action in Action::ALL {
            let err = authorize(Some(&cashier), ResourceKind::PurchaseOrder, action)
                .into_result()
                .unwrap_err();
            match err {
                AuthzError::Forbidden { required: Role::Manager } => {}
                _ => panic!("Expected Forbidden error"),
            }
        }
    }

    #[test]
    fn missing_identity_is_unauthenticated_not_forbidden() {
        let err = authorize(None, ResourceKind::Product, Action::List)
            .into_result()
            .unwrap_err();
        assert_eq!(err, AuthzError::Unauthenticated);
    }

    #[test]
    fn privilege_escalation_blocked() {
        let manager = principal(Role::Manager);
        assert!(ensure_can_assign(&manager, Role::Cashier).is_ok());
        assert_eq!(
            ensure_can_assign(&manager, Role::Manager),
            Err(AuthzError::PrivilegeEscalation { role: Role::Manager })
        );

        let superuser = principal(Role::Superuser);
        assert!(ensure_can_assign(&superuser, Role::Manager).is_ok());
        assert!(ensure_can_assign(&superuser, Role::Superuser).is_err());
    }

    #[test]
    fn visibility_hides_self_and_peers() {
        let manager = principal(Role::Manager);
        assert!(can_view_account(&manager, UserId::new(), Role::Cashier));
        assert!(!can_view_account(&manager, UserId::new(), Role::Manager));
        assert!(!can_view_account(&manager, UserId::new(), Role::Superuser));
        assert!(!can_view_account(&manager, manager.user_id, Role::Cashier));

        let superuser = principal(Role::Superuser);
        assert!(can_view_account(&superuser, UserId::new(), Role::Manager));
        assert!(!can_view_account(&superuser, UserId::new(), Role::Superuser));
    }

    #[test]
    fn explanation_names_missing_role() {
        let cashier = principal(Role::Cashier);
        let explanation =
            explain_authorization(Some(&cashier), ResourceKind::Supplier, Action::Create);
        assert!(!explanation.granted);
        let denial = explanation.denial_reason.unwrap();
        assert_eq!(denial.kind, DenialKind::InsufficientRole);
        assert!(denial.message.contains("manager"));
    }

    #[test]
    fn explanation_without_identity() {
        let explanation = explain_authorization(None, ResourceKind::Unit, Action::List);
        assert!(!explanation.granted);
        assert!(explanation.principal.is_none());
        assert_eq!(explanation.denial_reason.unwrap().kind, DenialKind::Unauthenticated);
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn any_resource() -> impl Strategy<Value = ResourceKind> {
        prop::sample::select(ResourceKind::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn writes_denied_below_manager(role in any_role(), resource in any_resource(), action in any_action()) {
            prop_assume!(action.is_write());
            let actor = principal(role);
            let decision = authorize(Some(&actor), resource, action);
            prop_assert_eq!(decision.is_allowed(), role >= Role::Manager);
        }

        #[test]
        fn unauthenticated_never_forbidden(resource in any_resource(), action in any_action()) {
            prop_assert_eq!(
                authorize(None, resource, action),
                Decision::Deny(Denial::Unauthenticated)
            );
        }

        #[test]
        fn decision_is_monotonic_in_role(lower in any_role(), higher in any_role(), resource in any_resource(), action in any_action()) {
            prop_assume!(lower <= higher);
            let low = authorize(Some(&principal(lower)), resource, action);
            let high = authorize(Some(&principal(higher)), resource, action);
            prop_assert!(!low.is_allowed() || high.is_allowed());
        }

        #[test]
        fn explanation_agrees_with_gate(role in any_role(), resource in any_resource(), action in any_action()) {
            let actor = principal(role);
            let decision = authorize(Some(&actor), resource, action);
            let explanation = explain_authorization(Some(&actor), resource, action);
            prop_assert_eq!(explanation.granted, decision.is_allowed());
            prop_assert_eq!(explanation.denial_reason.is_none(), decision.is_allowed());
        }

        #[test]
        fn gate_does_not_touch_principal(role in any_role(), resource in any_resource(), action in any_action()) {
            let actor = principal(role);
            let before = actor.clone();
            let _ = authorize(Some(&actor), resource, action);
            prop_assert_eq!(actor, before);
        }
    }
}

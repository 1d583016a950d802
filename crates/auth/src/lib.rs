//! `tillpoint-auth` - authentication and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: the gate is a
//! pure function of (principal, resource, action), tokens and passwords are
//! plain values, and user records are validated here but persisted elsewhere.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{
    authorize, can_view_account, ensure_can_assign, explain_authorization,
    AuthorizationExplanation, AuthzError, Decision, Denial, DenialKind,
};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtIssuer, JwtValidator, TokenError};
pub use password::{PasswordError, PasswordHasher, MIN_PASSWORD_LENGTH};
pub use policy::{policy_matrix, required_for, Action, PolicyEntry, Requirement, ResourceKind};
pub use principal::Principal;
pub use roles::{Role, RoleFlags, UnknownRole};
pub use user::{NewUser, User};

//! User accounts.
//!
//! Holds identity, credential hash and role. Hashing happens before
//! construction (see [`crate::password`]); this module never sees plaintext.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tillpoint_core::validation::{check_email, normalize_email, require_text};
use tillpoint_core::{DomainResult, Entity, FieldErrors, UserId};

use crate::{can_view_account, Principal, Role, RoleFlags};

pub const NAME_MAX_LEN: usize = 255;

/// Validated input for a new account (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    /// Unique; stored normalized (domain lowercased).
    pub email: String,
    pub name: String,
    #[serde(skip)]
    password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, input: NewUser, now: DateTime<Utc>) -> DomainResult<Self> {
        let email = normalize_email(&input.email);
        let name = input.name.trim().to_string();
        validate_profile(&email, &name).into_result()?;

        Ok(Self {
            id,
            email,
            name,
            password_hash: input.password_hash,
            role: input.role,
            is_active: input.is_active,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Plain account with no staff privileges.
    pub fn create_user(
        id: UserId,
        email: &str,
        name: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::with_role(id, email, name, password_hash, Role::Member, now)
    }

    pub fn create_cashier(
        id: UserId,
        email: &str,
        name: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::with_role(id, email, name, password_hash, Role::Cashier, now)
    }

    pub fn create_manager(
        id: UserId,
        email: &str,
        name: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::with_role(id, email, name, password_hash, Role::Manager, now)
    }

    pub fn create_superuser(
        id: UserId,
        email: &str,
        name: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::with_role(id, email, name, password_hash, Role::Superuser, now)
    }

    fn with_role(
        id: UserId,
        email: &str,
        name: &str,
        password_hash: String,
        role: Role,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::new(
            id,
            NewUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash,
                role,
                is_active: true,
            },
            now,
        )
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn flags(&self) -> RoleFlags {
        self.role.flags()
    }

    /// Update email and/or name; absent values are kept.
    pub fn update_profile(
        &mut self,
        email: Option<&str>,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let email = email.map(normalize_email).unwrap_or_else(|| self.email.clone());
        let name = name.map(|n| n.trim().to_string()).unwrap_or_else(|| self.name.clone());
        validate_profile(&email, &name).into_result()?;

        self.email = email;
        self.name = name;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: String, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.updated_at = now;
    }

    pub fn set_role(&mut self, role: Role, now: DateTime<Utc>) {
        self.role = role;
        self.updated_at = now;
    }

    pub fn set_active(&mut self, is_active: bool, now: DateTime<Utc>) {
        self.is_active = is_active;
        self.updated_at = now;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
    }

    /// Whether `actor` may see this account through user management.
    pub fn is_visible_to(&self, actor: &Principal) -> bool {
        can_view_account(actor, self.id, self.role)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Email and display-name rules shared by creation and profile edits.
pub fn validate_profile(email: &str, name: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, "email", email);
    require_text(&mut errors, "name", name, NAME_MAX_LEN);
    errors
}

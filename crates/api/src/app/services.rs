//! Store and credential wiring shared by every handler.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use tillpoint_auth::password::check_password;
use tillpoint_auth::user::validate_profile;
use tillpoint_auth::{
    Hs256JwtValidator, JwtClaims, JwtIssuer, JwtValidator, NewUser, PasswordHasher, Principal,
    Role, User,
};
use tillpoint_core::validation::normalize_email;
use tillpoint_core::{FieldErrors, SessionId, UserId};
use tillpoint_infra::{InMemoryRecordStore, InMemorySessionStore, RecordStore, SessionStore};
use tillpoint_parties::{Customer, Supplier};
use tillpoint_products::{Category, Product, Unit};
use tillpoint_purchasing::PurchaseOrder;

use crate::app::errors::ApiError;
use crate::config::ApiConfig;

pub const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials";

/// Process-wide state: one store per resource plus credential services.
pub struct AppServices {
    pub users: InMemoryRecordStore<User>,
    pub units: InMemoryRecordStore<Unit>,
    pub categories: InMemoryRecordStore<Category>,
    pub products: InMemoryRecordStore<Product>,
    pub suppliers: InMemoryRecordStore<Supplier>,
    pub customers: InMemoryRecordStore<Customer>,
    pub purchase_orders: InMemoryRecordStore<PurchaseOrder>,
    pub sessions: InMemorySessionStore,
    jwt: Arc<Hs256JwtValidator>,
    hasher: PasswordHasher,
    token_ttl: Duration,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn user_email(user: &User) -> String {
    user.email.clone()
}

impl AppServices {
    pub fn new(jwt_secret: &str, token_ttl: Duration, hasher: PasswordHasher) -> Self {
        Self {
            users: InMemoryRecordStore::with_unique("email", user_email),
            units: InMemoryRecordStore::new(),
            categories: InMemoryRecordStore::new(),
            products: InMemoryRecordStore::new(),
            suppliers: InMemoryRecordStore::new(),
            customers: InMemoryRecordStore::new(),
            purchase_orders: InMemoryRecordStore::new(),
            sessions: InMemorySessionStore::new(),
            jwt: Arc::new(Hs256JwtValidator::new(jwt_secret)),
            hasher,
            token_ttl,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::seconds(config.token_ttl_secs),
            PasswordHasher::default(),
        )
    }

    pub fn jwt_validator(&self) -> Arc<dyn JwtValidator> {
        self.jwt.clone()
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        self.hasher.hash(password).map_err(ApiError::internal)
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.hasher.verify(password, stored_hash)
    }

    /// Validate, hash and store a new account.
    pub fn provision_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ApiError> {
        self.provision_account(email, name, password, role, true)
    }

    /// Validate, hash and insert a new account in one store write.
    pub fn provision_account(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
        is_active: bool,
    ) -> Result<User, ApiError> {
        let mut errors = validate_profile(&normalize_email(email), name.trim());
        check_password(&mut errors, "password", password);
        errors.into_result()?;

        let user = User::new(
            UserId::new(),
            NewUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash: self.hash_password(password)?,
                role,
                is_active,
            },
            Utc::now(),
        )?;
        self.users.insert(user.clone())?;
        tracing::info!(user_id = %user.id, role = %user.role, "user provisioned");
        Ok(user)
    }

    /// Seed a superuser unless an account with that email already exists.
    pub fn bootstrap_superuser(&self, email: &str, password: &str) -> Result<(), ApiError> {
        if self.users.find_unique(&normalize_email(email)).is_some() {
            tracing::info!("bootstrap superuser already present");
            return Ok(());
        }
        self.provision_user(email, "Administrator", password, Role::Superuser)?;
        Ok(())
    }

    /// Exchange credentials for a token backed by a fresh session.
    pub fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, ApiError> {
        let user = self
            .users
            .find_unique(&normalize_email(email))
            .filter(|u| u.is_active && self.verify_password(password, u.password_hash()))
            .ok_or_else(|| ApiError::non_field(BAD_CREDENTIALS))?;

        let session = self.sessions.open(user.id, now, self.token_ttl)?;
        let token = self
            .jwt
            .issue(&JwtClaims {
                sub: user.id,
                sid: session.id,
                issued_at: now,
                expires_at: session.expires_at,
            })
            .map_err(ApiError::internal)?;

        self.users.update(&user.id, |u: &mut User| {
            u.record_login(now);
            Ok::<_, ApiError>(())
        })?;
        tracing::info!(user_id = %user.id, session_id = %session.id, "login");

        Ok(IssuedToken {
            token,
            expires_at: session.expires_at,
        })
    }

    pub fn logout(&self, session_id: SessionId, now: DateTime<Utc>) {
        if self.sessions.revoke(session_id, now) {
            tracing::info!(session_id = %session_id, "logout");
        }
    }

    /// Turn verified claims into a principal, reading the current user record.
    ///
    /// Fails when the session is unknown, revoked or expired, belongs to a
    /// different user, or the account is disabled.
    pub fn principal_for(
        &self,
        claims: &JwtClaims,
        now: DateTime<Utc>,
    ) -> Result<Principal, ApiError> {
        let session = self
            .sessions
            .resolve(claims.sid, now)
            .filter(|s| s.user_id == claims.sub)
            .ok_or_else(ApiError::invalid_token)?;

        let user = self
            .users
            .get(&claims.sub)
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::Unauthenticated("User inactive or deleted.".to_string()))?;

        Ok(Principal {
            user_id: user.id,
            email: user.email,
            role: user.role,
            session_id: session.id,
        })
    }

    /// Replace a user's password after checking the current one.
    pub fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let current = self.users.get(&user_id).ok_or(ApiError::NotFound)?;
        if !self.verify_password(old_password, current.password_hash()) {
            return Err(ApiError::field("old_password", "Wrong password."));
        }

        let mut errors = FieldErrors::new();
        check_password(&mut errors, "password", new_password);
        errors.into_result()?;

        let hash = self.hash_password(new_password)?;
        self.users.update(&user_id, |u: &mut User| {
            u.set_password_hash(hash, now);
            Ok::<_, ApiError>(())
        })?;
        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }
}

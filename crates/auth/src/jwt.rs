//! HS256 bearer tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or unsigned token: {0}")]
    Malformed(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Signs claims into a bearer token.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, claims: &JwtClaims) -> Result<String, TokenError>;
}

/// Shared-secret HS256 signer/verifier.
///
/// Time-window checks use [`validate_claims`] with an explicit `now` instead of
/// the library's clock, so expiry is deterministic under test.
pub struct Hs256JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl JwtIssuer for Hs256JwtValidator {
    fn issue(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tillpoint_core::{SessionId, UserId};

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            sid: SessionId::new(),
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn issued_token_validates() {
        let jwt = Hs256JwtValidator::new("test-secret");
        let now = Utc::now();
        let claims = claims(now);

        let token = jwt.issue(&claims).unwrap();
        let decoded = jwt.validate(&token, now + Duration::minutes(1)).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let now = Utc::now();
        let token = Hs256JwtValidator::new("secret-a").issue(&claims(now)).unwrap();
        let err = Hs256JwtValidator::new("secret-b").validate(&token, now).unwrap_err();
        match err {
            TokenError::Malformed(_) => {}
            _ => panic!("Expected Malformed error"),
        }
    }

    #[test]
    fn expired_token_rejected() {
        let jwt = Hs256JwtValidator::new("test-secret");
        let now = Utc::now();
        let token = jwt.issue(&claims(now)).unwrap();
        let err = jwt.validate(&token, now + Duration::hours(2)).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn garbage_rejected() {
        let jwt = Hs256JwtValidator::new("test-secret");
        assert!(jwt.validate("not.a.token", Utc::now()).is_err());
    }
}

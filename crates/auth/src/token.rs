//! Bearer token verification.
//!
//! Every accessor goes through [`TokenValidator::decode`], so a token is never
//! read without its signature and time window being checked first.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use meshguard_core::UserId;

use crate::{JwtClaims, Role, TokenValidationError, validate_claims};

/// Verifies bearer tokens and extracts identity claims.
///
/// Implementations hold their verification key for the life of the process
/// and must be safe to share between requests without locking.
pub trait TokenValidator: Send + Sync {
    /// Verify `token` at `now` and return its claims.
    ///
    /// Must fail closed: malformed input yields an error, never a panic.
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;

    fn validate(&self, token: &str) -> bool {
        self.decode(token, Utc::now()).is_ok()
    }

    fn extract_role(&self, token: &str) -> Result<Role, TokenValidationError> {
        Ok(self.decode(token, Utc::now())?.role)
    }

    fn extract_user_id(&self, token: &str) -> Result<UserId, TokenValidationError> {
        Ok(self.decode(token, Utc::now())?.user_id)
    }

    fn extract_username(&self, token: &str) -> Result<String, TokenValidationError> {
        Ok(self.decode(token, Utc::now())?.sub)
    }
}

/// HMAC-SHA256 validator over a shared secret.
pub struct Hs256TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256TokenValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenValidator").finish_non_exhaustive()
    }
}

impl TokenValidator for Hs256TokenValidator {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        if token.is_empty() {
            return Err(TokenValidationError::Malformed);
        }

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenValidationError {
    match kind {
        ErrorKind::ExpiredSignature => TokenValidationError::Expired,
        ErrorKind::ImmatureSignature => TokenValidationError::NotYetValid,
        ErrorKind::InvalidSignature => TokenValidationError::InvalidSignature,
        ErrorKind::InvalidEcdsaKey
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::RsaFailedSigning
        | ErrorKind::Crypto(_) => TokenValidationError::Internal(format!("{kind:?}")),
        _ => TokenValidationError::Malformed,
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::errors::AuthError;
use crate::domain::Identity;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and verifies HS256 bearer tokens. Holds only immutable keys, so
/// one instance is shared across all requests.
#[derive(Clone)]
pub struct CredentialGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl CredentialGate {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self { Self::new(&cfg.jwt_secret, cfg.token_ttl_secs) }

    pub fn ttl_secs(&self) -> u64 { self.ttl_secs }

    /// Issue a token for `user_id`, valid for the configured TTL.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        let iat = now_secs();
        let claims = Claims { sub: user_id.to_string(), email: email.to_string(), iat, exp: iat + self.ttl_secs };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify a raw token (no scheme prefix).
    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(err = %e, "token rejected");
            AuthError::InvalidCredential
        })?;
        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidCredential)?;
        Ok(Identity { user_id, email: data.claims.email })
    }

    /// Gate a request given its method and raw `Authorization` header.
    ///
    /// `OPTIONS` passes with no identity. Otherwise the header must read
    /// `Bearer <token>`: an absent header or empty token is
    /// `MissingCredential`; any other scheme, or a token that fails
    /// verification, is `InvalidCredential`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{CredentialGate, errors::AuthError};
    /// let gate = CredentialGate::new("secret", 3600);
    /// let uid = uuid::Uuid::new_v4();
    /// let token = gate.issue(uid, "u@example.com").unwrap();
    /// let who = gate.authenticate("GET", Some(&format!("Bearer {token}"))).unwrap().unwrap();
    /// assert_eq!(who.user_id, uid);
    /// assert!(gate.authenticate("OPTIONS", None).unwrap().is_none());
    /// assert!(matches!(gate.authenticate("POST", None), Err(AuthError::MissingCredential)));
    /// ```
    pub fn authenticate(&self, method: &str, header: Option<&str>) -> Result<Option<Identity>, AuthError> {
        if method.eq_ignore_ascii_case("OPTIONS") {
            return Ok(None);
        }
        let raw = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(AuthError::MissingCredential)?;
        let (scheme, token) = match raw.split_once(' ') {
            Some((s, t)) => (s, t.trim()),
            None => (raw, ""),
        };
        if !scheme.eq_ignore_ascii_case("Bearer") {
            return Err(AuthError::InvalidCredential);
        }
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.verify_token(token).map(Some)
    }
}

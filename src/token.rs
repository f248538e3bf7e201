use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::JwtConfig, models::User};

/// Access tokens are valid for exactly this long after issuance.
pub const TOKEN_LIFETIME_SECS: i64 = 15 * 60;

/// HMAC-SHA-256 keys shorter than the hash output are refused at startup.
pub const MIN_KEY_LEN: usize = 32;

/// Claims
///
/// The payload of every access token. Identity claims come from the user record,
/// `role` carries one entry per assigned role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    /// Issued At (iat), seconds since the epoch.
    pub iat: i64,
    /// Expiration Time (exp): always `iat + TOKEN_LIFETIME_SECS`.
    pub exp: i64,
}

/// ConfigError
///
/// Raised while building the issuer from configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT signing key is missing")]
    MissingKey,
    #[error("JWT signing key must be at least 32 bytes, got {0}")]
    WeakKey(usize),
}

/// TokenError
///
/// Failure while signing or verifying a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// TokenIssuer
///
/// Signs and verifies HS256 access tokens with the symmetric key from `JwtConfig`.
/// Cheap to clone; lives in `AppState`.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Result<Self, ConfigError> {
        let key = config.key.as_bytes();
        if key.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        if key.len() < MIN_KEY_LEN {
            return Err(ConfigError::WeakKey(key.len()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    /// issue_token
    ///
    /// Produces a signed token for an authenticated user, valid for 15 minutes from now.
    pub fn issue_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue_token_at(user, Utc::now())
    }

    /// Same as `issue_token` with an explicit issuance instant.
    pub fn issue_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at + Duration::seconds(TOKEN_LIFETIME_SECS);
        let claims = Claims {
            sub: user.id,
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.roles.iter().cloned().collect(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// verify
    ///
    /// Checks signature, algorithm, issuer, audience and expiry (no leeway) and
    /// returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid(e)),
            },
        }
    }
}

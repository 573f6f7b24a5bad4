//! JWT token service
//!
//! Issues and validates access/refresh token pairs for the back-office
//! API.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::models::Role;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Access token lifetime (minutes)
    pub access_minutes: i64,
    /// Refresh token lifetime (minutes)
    pub refresh_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Load from environment variables
    ///
    /// Without `JWT_SECRET` a random per-process secret is generated:
    /// fine for development, but every restart invalidates all tokens,
    /// so production deployments must set it explicitly.
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                tracing::warn!("JWT_SECRET shorter than 32 bytes, generating a random secret");
                generate_secret()
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating a random per-process secret");
                generate_secret()
            }
        };

        Self {
            secret,
            access_minutes: std::env::var("JWT_ACCESS_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            refresh_minutes: std::env::var("JWT_REFRESH_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60 * 24 * 7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "store-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "store-clients".to_string()),
        }
    }
}

/// Random printable 64-character secret
fn generate_secret() -> String {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    // SystemRandom only fails if the OS RNG is broken
    rng.fill(&mut bytes)
        .expect("system random number generator unavailable");
    bytes
        .iter()
        .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
        .collect()
}

/// Claims stored in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    pub username: String,
    pub role: String,
    /// "access" or "refresh"
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// Access + refresh token pair returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Wrong token type: expected {0}")]
    WrongTokenType(String),

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue an access/refresh pair for a user
    pub fn generate_token_pair(
        &self,
        user_id: &str,
        username: &str,
        role: Role,
    ) -> Result<TokenPair, JwtError> {
        let access_token =
            self.generate_token(user_id, username, role, "access", self.config.access_minutes)?;
        let refresh_token =
            self.generate_token(user_id, username, role, "refresh", self.config.refresh_minutes)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_minutes * 60,
        })
    }

    fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        role: Role,
        token_type: &str,
        minutes: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
            token_type: token_type.to_string(),
            exp: (now + Duration::minutes(minutes)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate a token of any type
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }

    /// Validate an access token specifically
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "access" {
            return Err(JwtError::WrongTokenType("access".to_string()));
        }
        Ok(claims)
    }

    /// Validate a refresh token specifically
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != "refresh" {
            return Err(JwtError::WrongTokenType("refresh".to_string()));
        }
        Ok(claims)
    }

    /// Pull the token out of an `Authorization: Bearer <token>` header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Current user context, parsed from validated claims
///
/// Injected into the request extensions by the auth middleware and
/// available in handlers through the [`CurrentUser`] extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Staff and admins may operate the back office
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Staff)
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| JwtError::InvalidToken(format!("unknown role {}", claims.role)))?;
        Ok(Self {
            id: claims.sub,
            username: claims.username,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_minutes: 60,
            refresh_minutes: 1440,
            issuer: "store-server".to_string(),
            audience: "store-clients".to_string(),
        }
    }

    #[test]
    fn test_token_pair_roundtrip() {
        let service = JwtService::new(test_config());
        let pair = service
            .generate_token_pair("user:1", "alice", Role::Staff)
            .expect("generate pair");

        let claims = service
            .validate_access_token(&pair.access_token)
            .expect("validate access");
        assert_eq!(claims.sub, "user:1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "staff");

        let claims = service
            .validate_refresh_token(&pair.refresh_token)
            .expect("validate refresh");
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_token_type_mismatch_is_rejected() {
        let service = JwtService::new(test_config());
        let pair = service
            .generate_token_pair("user:1", "alice", Role::Admin)
            .expect("generate pair");

        assert!(service.validate_access_token(&pair.refresh_token).is_err());
        assert!(service.validate_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let service = JwtService::new(test_config());
        let pair = service
            .generate_token_pair("user:1", "alice", Role::Admin)
            .expect("generate pair");

        let other = JwtService::new(JwtConfig {
            secret: "another-secret-that-is-also-long-enough!".to_string(),
            ..test_config()
        });
        assert!(other.validate_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_current_user_roles() {
        let admin = CurrentUser {
            id: "user:1".into(),
            username: "root".into(),
            role: Role::Admin,
        };
        let customer = CurrentUser {
            id: "user:2".into(),
            username: "bob".into(),
            role: Role::Customer,
        };
        assert!(admin.is_admin());
        assert!(admin.is_staff());
        assert!(!customer.is_staff());
    }
}

//! Identity token encoding/decoding.
//!
//! Tokens are HS256-signed JWTs carrying the user's id and username. A token
//! stays usable only while its session row is active; only the SHA-256 hash
//! of the token is stored server-side so a database leak does not expose
//! live tokens.
//!
//! Expiry is a policy: with `expiry_hours` set, tokens carry and are checked
//! against `exp`; without it, validity is signature plus session state.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sitecrm_core::types::DbId;
use uuid::Uuid;

/// Claims embedded in every identity token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's internal database id.
    pub id: DbId,
    pub username: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp), absent when expiry is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Unique token identifier so two logins never share a token (and hash).
    pub jti: String,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in hours; `None` disables expiry.
    pub expiry_hours: Option<i64>,
}

/// Default token lifetime in hours.
const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Upper bound accepted for `JWT_EXPIRY_HOURS` (ten years).
pub const MAX_EXPIRY_HOURS: i64 = 24 * 365 * 10;

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var            | Required | Default |
    /// |--------------------|----------|---------|
    /// | `JWT_SECRET`       | **yes**  | --      |
    /// | `JWT_EXPIRY_HOURS` | no       | `24`    |
    ///
    /// `JWT_EXPIRY_HOURS=0` disables expiry.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty, or if
    /// `JWT_EXPIRY_HOURS` is not an integer in `0..=MAX_EXPIRY_HOURS`.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let expiry_hours: i64 = std::env::var("JWT_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_HOURS.to_string())
            .parse()
            .expect("JWT_EXPIRY_HOURS must be a valid i64");
        assert!(
            (0..=MAX_EXPIRY_HOURS).contains(&expiry_hours),
            "JWT_EXPIRY_HOURS must be between 0 and {MAX_EXPIRY_HOURS}"
        );

        Self {
            secret,
            expiry_hours: (expiry_hours > 0).then_some(expiry_hours),
        }
    }
}

/// Sign a token for the given user.
pub fn generate_token(
    user_id: DbId,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        iat: now,
        exp: config
            .expiry_hours
            .map(|hours| now.saturating_add(hours.saturating_mul(3600))),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a token's signature (and `exp` when expiry is enabled) and return
/// its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    if config.expiry_hours.is_none() {
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// SHA-256 hex digest of a token, the key of its session row.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(expiry_hours: Option<i64>) -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours,
        }
    }

    fn sign(claims: &Claims, config: &JwtConfig) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = test_config(Some(24));
        let token = generate_token(42, "alice", &config).expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp.unwrap() > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_huge_expiry_saturates_instead_of_overflowing() {
        let config = test_config(Some(i64::MAX));
        let token = generate_token(5, "hank", &config).expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token should validate");
        assert_eq!(claims.exp, Some(i64::MAX));
    }

    #[test]
    fn test_two_logins_produce_distinct_tokens() {
        let config = test_config(None);
        let a = generate_token(1, "bob", &config).unwrap();
        let b = generate_token(1, "bob", &config).unwrap();
        assert_ne!(a, b);
        assert_ne!(hash_token(&a), hash_token(&b));
    }

    #[test]
    fn test_expired_token_fails_when_expiry_enabled() {
        let config = test_config(Some(1));
        let now = chrono::Utc::now().timestamp();
        // Well past the default 60-second leeway.
        let claims = Claims {
            id: 1,
            username: "carol".to_string(),
            iat: now - 600,
            exp: Some(now - 300),
            jti: Uuid::new_v4().to_string(),
        };

        let result = validate_token(&sign(&claims, &config), &config);
        assert!(result.is_err(), "expired token must fail validation");
    }

    #[test]
    fn test_token_without_exp_rejected_when_expiry_enabled() {
        let config = test_config(Some(1));
        let claims = Claims {
            id: 1,
            username: "dave".to_string(),
            iat: chrono::Utc::now().timestamp(),
            exp: None,
            jti: Uuid::new_v4().to_string(),
        };

        assert!(validate_token(&sign(&claims, &config), &config).is_err());
    }

    #[test]
    fn test_disabled_expiry_accepts_token_without_exp() {
        let config = test_config(None);
        let token = generate_token(7, "erin", &config).unwrap();

        let claims = validate_token(&token, &config).expect("token should validate");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = JwtConfig {
            secret: "secret-alpha".to_string(),
            expiry_hours: Some(1),
        };
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            expiry_hours: Some(1),
        };

        let token = generate_token(1, "frank", &config_a).expect("token generation should succeed");
        assert!(
            validate_token(&token, &config_b).is_err(),
            "token signed with a different secret must fail"
        );
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(validate_token("not.a.jwt", &test_config(None)).is_err());
    }

    #[test]
    fn test_token_hash_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash, hash_token("abc"));
        assert_eq!(hash.len(), 64);
    }
}

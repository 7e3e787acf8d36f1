/// Identity token issuing and verification
///
/// Tokens are self-contained JWTs signed with HS256. The claims embed the
/// user's id, name, email, and role (name plus permission string), so
/// protected requests can be authorized without a storage lookup.
///
/// Verification failures are deliberately opaque: a malformed token, a bad
/// signature, and an expired token all surface the same `Invalid token`
/// error, so callers cannot distinguish why a token was rejected.
///
/// The signing secret and the expiry window are injected at construction
/// time; the process refuses to start without a secret (enforced by the
/// configuration layer).
///
/// # Example
///
/// ```
/// use fieldops_shared::auth::token::{parse_expiry, TokenIssuer};
/// use fieldops_shared::models::role::RoleSummary;
/// use fieldops_shared::models::user::UserProfile;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("signing-secret", parse_expiry("7d")?);
///
/// let profile = UserProfile {
///     id: Uuid::new_v4(),
///     name: "technician".to_string(),
///     email: "technician@mail.com".to_string(),
///     role: RoleSummary {
///         name: "Technician".to_string(),
///         permissions: "create_task;read_my_tasks".to_string(),
///     },
/// };
///
/// let token = issuer.sign(&profile)?;
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.sub, profile.id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::RoleSummary;
use crate::models::user::UserProfile;

/// Default expiry window when `JWT_EXPIRES_IN` is not configured.
pub const DEFAULT_EXPIRY: &str = "7d";

/// Error type for token operations.
///
/// Both variants carry fixed, caller-safe messages; underlying causes are
/// intentionally not exposed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token could not be signed
    #[error("Error creating jwt")]
    Sign,

    /// Token was malformed, had a bad signature, or expired
    #[error("Invalid token")]
    Invalid,
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role name and its raw permission string
    pub role: RoleSummary,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims for a user profile with the given expiry window.
    pub fn new(profile: &UserProfile, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: profile.id,
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role.clone(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks whether the claims are past their expiration time.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs and verifies identity tokens.
///
/// Constructed once at startup from the configured signing secret and
/// expiry window, then shared across all requests.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from a signing secret and an expiry window.
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    /// Signs a token over the outward-facing user profile.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Sign`] if encoding fails.
    pub fn sign(&self, profile: &UserProfile) -> Result<String, TokenError> {
        let claims = Claims::new(profile, self.expires_in);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "token encoding failed");
            TokenError::Sign
        })
    }

    /// Verifies a token and extracts its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for every failure mode (malformed
    /// token, bad signature, or expiration) without distinguishing them.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Error returned for unparseable expiry windows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expiry window: {0}")]
pub struct InvalidExpiry(pub String);

/// Parses an expiry window of the form `90s`, `15m`, `24h`, or `7d`.
///
/// A bare number is read as seconds. The amount must be positive.
pub fn parse_expiry(raw: &str) -> Result<Duration, InvalidExpiry> {
    let raw = raw.trim();

    let (amount, unit) = match raw.chars().last() {
        Some(c) if c.is_ascii_digit() => (raw, 's'),
        Some(c) if c.is_ascii_alphabetic() => (&raw[..raw.len() - 1], c),
        _ => return Err(InvalidExpiry(raw.to_string())),
    };

    let amount: i64 = amount
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| InvalidExpiry(raw.to_string()))?;

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        _ => Err(InvalidExpiry(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "technician".to_string(),
            email: "technician@mail.com".to_string(),
            role: RoleSummary {
                name: "Technician".to_string(),
                permissions: "create_task;read_task;read_my_tasks;update_task".to_string(),
            },
        }
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let issuer = TokenIssuer::new("test-secret", Duration::days(7));
        let profile = profile();

        let token = issuer.sign(&profile).expect("should sign");
        let claims = issuer.verify(&token).expect("should verify");

        assert_eq!(claims.sub, profile.id);
        assert_eq!(claims.name, profile.name);
        assert_eq!(claims.email, profile.email);
        assert_eq!(claims.role, profile.role);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_verify_with_wrong_secret_fails() {
        let issuer = TokenIssuer::new("secret-one", Duration::days(7));
        let other = TokenIssuer::new("secret-two", Duration::days(7));

        let token = issuer.sign(&profile()).unwrap();

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_verify_corrupted_token_fails() {
        let issuer = TokenIssuer::new("test-secret", Duration::days(7));
        let mut token = issuer.sign(&profile()).unwrap();
        token.push_str("tampered");

        assert_eq!(issuer.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_verify_garbage_fails() {
        let issuer = TokenIssuer::new("test-secret", Duration::days(7));

        assert_eq!(issuer.verify("not-a-token"), Err(TokenError::Invalid));
        assert_eq!(issuer.verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn test_verify_expired_token_fails() {
        // negative window = already expired at signing time
        let issuer = TokenIssuer::new("test-secret", Duration::seconds(-3600));
        let token = issuer.sign(&profile()).unwrap();

        assert_eq!(issuer.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_rejection_reason_is_opaque() {
        // expired, corrupted, and wrong-secret tokens all read the same
        assert_eq!(TokenError::Invalid.to_string(), "Invalid token");
        assert_eq!(TokenError::Sign.to_string(), "Error creating jwt");
    }

    #[test]
    fn test_parse_expiry_units() {
        assert_eq!(parse_expiry("90s"), Ok(Duration::seconds(90)));
        assert_eq!(parse_expiry("15m"), Ok(Duration::minutes(15)));
        assert_eq!(parse_expiry("24h"), Ok(Duration::hours(24)));
        assert_eq!(parse_expiry("7d"), Ok(Duration::days(7)));
        assert_eq!(parse_expiry("300"), Ok(Duration::seconds(300)));
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        assert!(parse_expiry("").is_err());
        assert!(parse_expiry("d").is_err());
        assert!(parse_expiry("-7d").is_err());
        assert!(parse_expiry("0d").is_err());
        assert!(parse_expiry("7w").is_err());
        assert!(parse_expiry("soon").is_err());
    }

    #[test]
    fn test_default_expiry_parses() {
        assert_eq!(parse_expiry(DEFAULT_EXPIRY), Ok(Duration::days(7)));
    }
}

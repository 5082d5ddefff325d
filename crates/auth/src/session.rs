//! Session token model and HS256 codec.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use atrium_core::EmailAddress;

use crate::Identity;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated email.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// Signs and resolves session tokens.
///
/// Resolution never fails loudly: a missing, malformed, or expired token is
/// the normal "no session" outcome and maps to `None`. Upstream callers
/// translate absence into an Unauthenticated signal.
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a signed session token for an authenticated email.
    pub fn issue(&self, email: &EmailAddress, now: DateTime<Utc>) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Resolve a bearer token into an identity, or `None` for no session.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default()).ok()?;
        let email = EmailAddress::parse(&data.claims.sub).ok()?;
        Some(Identity { email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionCodec {
        SessionCodec::new(b"test-secret", Duration::hours(1))
    }

    #[test]
    fn issue_then_resolve_round_trip() {
        let codec = codec();
        let email = EmailAddress::parse("alice@example.com").unwrap();

        let token = codec.issue(&email, Utc::now()).unwrap();
        let identity = codec.resolve(&token).unwrap();
        assert_eq!(identity.email, email);
    }

    #[test]
    fn expired_token_resolves_to_none() {
        let codec = codec();
        let email = EmailAddress::parse("alice@example.com").unwrap();

        let token = codec.issue(&email, Utc::now() - Duration::days(2)).unwrap();
        assert!(codec.resolve(&token).is_none());
    }

    #[test]
    fn garbage_token_resolves_to_none() {
        assert!(codec().resolve("not-a-token").is_none());
    }

    #[test]
    fn token_from_another_secret_resolves_to_none() {
        let email = EmailAddress::parse("alice@example.com").unwrap();
        let other = SessionCodec::new(b"other-secret", Duration::hours(1));

        let token = other.issue(&email, Utc::now()).unwrap();
        assert!(codec().resolve(&token).is_none());
    }
}

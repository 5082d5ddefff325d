//! In-process broadcast hub.
//!
//! Stand-in for a hosted pub/sub provider behind the same contract: a lossy
//! tokio broadcast channel fanned out to SSE subscribers, plus HS256
//! subscribe-scoped client tokens. Lossy by design — no backpressure on the
//! executors.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use atrium_auth::Identity;
use atrium_core::EmailAddress;

use crate::notifier::{ClientToken, RealtimeNotifier};

/// Message as delivered to channel subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelMessage {
    pub channel: String,
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClientClaims {
    sub: String,
    scope: String,
    iat: i64,
    exp: i64,
}

const SUBSCRIBE_SCOPE: &str = "subscribe";

pub struct BroadcastHub {
    tx: broadcast::Sender<ChannelMessage>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl BroadcastHub {
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        let (tx, _rx) = broadcast::channel(256);
        Self {
            tx,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            token_ttl,
        }
    }

    /// Subscribe to everything the hub carries; callers filter by channel.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.tx.subscribe()
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Validate a client token, returning the subscriber's identity.
    ///
    /// Like session resolution, failure is the normal "no access" outcome,
    /// never an error: `None` for expired, malformed, or wrongly scoped
    /// tokens.
    pub fn verify_token(&self, token: &str) -> Option<Identity> {
        let data = decode::<ClientClaims>(token, &self.decoding, &Validation::default()).ok()?;
        if data.claims.scope != SUBSCRIBE_SCOPE {
            return None;
        }
        let email = EmailAddress::parse(&data.claims.sub).ok()?;
        Some(Identity { email })
    }
}

impl RealtimeNotifier for BroadcastHub {
    fn publish(&self, channel: &str, event: &str, payload: serde_json::Value) {
        // A send with no subscribers returns Err; at-most-once means we
        // drop it on the floor.
        let _ = self.tx.send(ChannelMessage {
            channel: channel.to_string(),
            event: event.to_string(),
            payload,
        });
    }

    fn issue_token(&self, identity: &Identity) -> anyhow::Result<ClientToken> {
        let now = Utc::now();
        let claims = ClientClaims {
            sub: identity.email.to_string(),
            scope: SUBSCRIBE_SCOPE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        let raw = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(ClientToken::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use atrium_core::PostId;

    use super::*;
    use crate::channel::{channel_for_post, event};

    fn hub() -> BroadcastHub {
        BroadcastHub::new(b"hub-secret", Duration::hours(1))
    }

    fn identity() -> Identity {
        Identity {
            email: EmailAddress::parse("alice@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let hub = hub();
        let mut rx = hub.subscribe();

        let post_id = PostId::new();
        hub.publish(
            &channel_for_post(post_id),
            event::COMMENT_CREATED,
            serde_json::json!({ "content": "hello" }),
        );

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.channel, channel_for_post(post_id));
        assert_eq!(msg.event, event::COMMENT_CREATED);
        assert_eq!(msg.payload["content"], "hello");
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        hub().publish("post-comments-x", event::TYPING, serde_json::json!({}));
    }

    #[test]
    fn token_round_trip() {
        let hub = hub();
        let token = hub.issue_token(&identity()).unwrap();
        let resolved = hub.verify_token(token.as_str()).unwrap();
        assert_eq!(resolved.email.as_str(), "alice@example.com");
    }

    #[test]
    fn foreign_or_garbage_tokens_do_not_verify() {
        let hub = hub();
        assert!(hub.verify_token("garbage").is_none());

        let other = BroadcastHub::new(b"other-secret", Duration::hours(1));
        let token = other.issue_token(&identity()).unwrap();
        assert!(hub.verify_token(token.as_str()).is_none());
    }
}

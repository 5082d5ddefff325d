//! Contract for the real-time collaborator.

use serde::Serialize;

use atrium_auth::Identity;

/// Opaque subscribe-scoped credential for the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClientToken(String);

impl ClientToken {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Publishes channel events and issues scoped client tokens.
///
/// `publish` is fire-and-forget, at-most-once from the publisher's
/// perspective: no delivery confirmation is awaited and a send with no
/// subscribers is not an error. Token issuance is gated upstream on a
/// resolved session, mirroring every other gate.
pub trait RealtimeNotifier: Send + Sync {
    fn publish(&self, channel: &str, event: &str, payload: serde_json::Value);

    fn issue_token(&self, identity: &Identity) -> anyhow::Result<ClientToken>;
}

use atrium_auth::Actor;

/// Resolved actor for a request.
///
/// Built fresh per request by the auth middleware (session resolution plus
/// active-only directory lookup); must be present for all protected routes.
#[derive(Debug, Clone)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}

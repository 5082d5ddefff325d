//! Real-time token issuance and the SSE subscription endpoint.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::get,
};
use serde::Deserialize;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use atrium_auth::Identity;
use atrium_core::PostId;
use atrium_realtime::{RealtimeNotifier, TYPING_TTL, channel_for_post};

use crate::app::{errors, services::AppServices};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/token", get(issue_token))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub token: String,
}

/// GET /realtime/token - subscribe-scoped client token for this session
///
/// Reaching this handler already required a resolved session; an
/// unauthenticated request never gets a token, mirroring every other gate.
pub async fn issue_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    let identity = Identity {
        email: actor.actor().email.clone(),
    };

    match services.notifier.issue_token(&identity) {
        Ok(token) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "token": token.as_str(),
                "expires_in_secs": services.hub.token_ttl().num_seconds(),
                "typing_ttl_secs": TYPING_TTL.as_secs(),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e.into()),
    }
}

/// GET /realtime/posts/:id/stream?token=... - SSE subscription to a post's
/// comment/typing channel.
///
/// Authenticates with the subscribe-scoped client token rather than the
/// session bearer, matching how a hosted provider authenticates its client
/// connections.
pub async fn subscribe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<SubscribeQuery>,
) -> axum::response::Response {
    let post_id: PostId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid post id"),
    };

    if services.hub.verify_token(&query.token).is_none() {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "invalid realtime token",
        );
    }

    let channel = channel_for_post(post_id);
    let rx = services.hub.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.channel == channel => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok::<_, Infallible>(SseEvent::default().event(m.event).data(data)))
        }
        _ => None,
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

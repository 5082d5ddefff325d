//! Channel naming and event vocabulary.

use std::time::Duration;

use atrium_core::PostId;

/// How long subscribers keep a typing signal alive before expiring it
/// locally. A UX timer, not authoritative state: the server never tracks
/// who is typing.
pub const TYPING_TTL: Duration = Duration::from_secs(6);

/// Channel carrying a post's comment and typing events.
pub fn channel_for_post(post_id: PostId) -> String {
    format!("post-comments-{post_id}")
}

/// Event names published on post channels.
pub mod event {
    /// A comment was committed to the store.
    pub const COMMENT_CREATED: &str = "comment.created";

    /// Someone is composing a comment.
    pub const TYPING: &str = "typing";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_name_embeds_the_post_id() {
        let post_id: PostId = "0191f3a0-5c6e-7000-8000-7b2d6c1e4f9a".parse().unwrap();
        assert_eq!(
            channel_for_post(post_id),
            "post-comments-0191f3a0-5c6e-7000-8000-7b2d6c1e4f9a"
        );
    }
}

use chrono::{DateTime, Utc};

use atrium_core::{CommentId, PostId, UserId};

/// A comment in a post's thread.
///
/// `created_at` is `None` only on the value echoed straight back from a
/// fresh insert: the UI reads the missing timestamp as "just posted"
/// instead of trusting a server clock it has not otherwise observed.
/// Listings always carry the stored timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Insertion payload; the store assigns `created_at`.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
}

/// A comment joined with its author's display name for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_name: String,
}

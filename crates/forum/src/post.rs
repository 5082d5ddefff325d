use chrono::{DateTime, Utc};

use atrium_core::{CategoryId, PostId, UserId};

/// A post as the content store holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub post_id: PostId,
    pub author_id: UserId,
    pub category_id: CategoryId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// Insertion payload; the store assigns `created_at`.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_id: PostId,
    pub author_id: UserId,
    pub category_id: CategoryId,
    pub title: String,
    pub description: String,
}

/// A post joined with everything the home view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub post: Post,
    pub author_name: String,
    pub author_role: String,
    pub category_name: String,
    pub comment_count: u64,
}

//! Store contracts consumed by the forum executors.

use async_trait::async_trait;

use atrium_core::{CategoryId, PostId};

use crate::category::Category;
use crate::comment::{Comment, CommentWithAuthor, NewComment};
use crate::post::{NewPost, Post, PostSummary};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_category(&self, category_id: CategoryId) -> anyhow::Result<Option<Category>>;

    async fn find_category_by_name(&self, name: &str) -> anyhow::Result<Option<Category>>;

    async fn insert_category(&self, category: Category) -> anyhow::Result<Category>;

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post>;

    async fn find_post(&self, post_id: PostId) -> anyhow::Result<Option<Post>>;

    /// Home listing: posts joined with author, author role, category name,
    /// and comment count.
    async fn list_posts_with_aggregates(&self) -> anyhow::Result<Vec<PostSummary>>;

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment>;

    async fn list_comments_by_post(
        &self,
        post_id: PostId,
    ) -> anyhow::Result<Vec<CommentWithAuthor>>;
}

//! Forum read and mutation executors.
//!
//! Rule checks come first; on a deny, nothing has been written. Publishes to
//! the real-time channel happen only after the corresponding insert has been
//! committed, and a publish is fire-and-forget by contract.

use std::sync::Arc;

use atrium_auth::{Actor, PermissionThresholds, ServiceError, rules};
use atrium_core::{CategoryId, CommentId, PostId};
use atrium_realtime::{RealtimeNotifier, channel_for_post, event};

use crate::category::Category;
use crate::comment::{Comment, CommentWithAuthor, NewComment};
use crate::post::{NewPost, Post, PostSummary};
use crate::store::{CatalogStore, ContentStore};

/// Everything the home view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeView {
    pub categories: Vec<Category>,
    pub posts: Vec<PostSummary>,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPostInput {
    pub category_id: CategoryId,
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct ForumService {
    catalog: Arc<dyn CatalogStore>,
    content: Arc<dyn ContentStore>,
    notifier: Arc<dyn RealtimeNotifier>,
    thresholds: PermissionThresholds,
}

impl ForumService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        content: Arc<dyn ContentStore>,
        notifier: Arc<dyn RealtimeNotifier>,
        thresholds: PermissionThresholds,
    ) -> Self {
        Self {
            catalog,
            content,
            notifier,
            thresholds,
        }
    }

    pub async fn home(&self, actor: &Actor) -> Result<HomeView, ServiceError> {
        rules::can_view_home(&self.thresholds, actor)?;

        let categories = self.catalog.list_categories().await?;
        let posts = self.content.list_posts_with_aggregates().await?;
        Ok(HomeView { categories, posts })
    }

    pub async fn list_categories(&self, actor: &Actor) -> Result<Vec<Category>, ServiceError> {
        rules::can_view_home(&self.thresholds, actor)?;
        Ok(self.catalog.list_categories().await?)
    }

    pub async fn create_category(
        &self,
        actor: &Actor,
        name: &str,
    ) -> Result<Category, ServiceError> {
        rules::can_create_category(&self.thresholds, actor)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid_input("category name cannot be empty"));
        }

        // Check-then-insert; concurrent duplicates are accepted as a race
        // and left to the store's unique index.
        if self.catalog.find_category_by_name(name).await?.is_some() {
            return Err(ServiceError::conflict("category name is already taken"));
        }

        let category = self
            .catalog
            .insert_category(Category {
                category_id: CategoryId::new(),
                name: name.to_string(),
            })
            .await?;

        tracing::info!(category = %category.name, "category created");
        Ok(category)
    }

    pub async fn create_post(
        &self,
        actor: &Actor,
        input: NewPostInput,
    ) -> Result<Post, ServiceError> {
        rules::can_create_post(&self.thresholds, actor)?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::invalid_input("title cannot be empty"));
        }
        if input.description.trim().is_empty() {
            return Err(ServiceError::invalid_input("description cannot be empty"));
        }
        if self.catalog.find_category(input.category_id).await?.is_none() {
            return Err(ServiceError::invalid_input("unknown category"));
        }

        let post = self
            .content
            .insert_post(NewPost {
                post_id: PostId::new(),
                author_id: actor.user_id,
                category_id: input.category_id,
                title: title.to_string(),
                description: input.description.trim().to_string(),
            })
            .await?;

        tracing::info!(post = %post.post_id, author = %actor.email, "post created");
        Ok(post)
    }

    pub async fn comments(
        &self,
        actor: &Actor,
        post_id: PostId,
    ) -> Result<Vec<CommentWithAuthor>, ServiceError> {
        rules::can_view_home(&self.thresholds, actor)?;

        if self.content.find_post(post_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }
        Ok(self.content.list_comments_by_post(post_id).await?)
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: PostId,
        content: &str,
    ) -> Result<Comment, ServiceError> {
        rules::can_add_comment(&self.thresholds, actor)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(ServiceError::invalid_input("comment cannot be empty"));
        }
        if self.content.find_post(post_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let inserted = self
            .content
            .insert_comment(NewComment {
                comment_id: CommentId::new(),
                post_id,
                author_id: actor.user_id,
                content: content.to_string(),
            })
            .await?;

        // Echo with the timestamp redacted: the UI reads a missing
        // timestamp as "just posted".
        let comment = Comment {
            created_at: None,
            ..inserted
        };

        self.notifier.publish(
            &channel_for_post(post_id),
            event::COMMENT_CREATED,
            serde_json::json!({
                "comment_id": comment.comment_id.to_string(),
                "post_id": post_id.to_string(),
                "author": actor.email.to_string(),
                "content": comment.content,
            }),
        );

        Ok(comment)
    }

    /// Publish a typing signal for the post's channel. Nothing is persisted
    /// and nothing is enforced server-side; subscribers expire the signal
    /// locally after [`atrium_realtime::TYPING_TTL`].
    pub async fn typing(&self, actor: &Actor, post_id: PostId) -> Result<(), ServiceError> {
        rules::can_add_comment(&self.thresholds, actor)?;

        if self.content.find_post(post_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        self.notifier.publish(
            &channel_for_post(post_id),
            event::TYPING,
            serde_json::json!({
                "author": actor.email.to_string(),
            }),
        );
        Ok(())
    }
}

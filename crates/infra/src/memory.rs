//! In-memory store implementations (dev/test wiring).
//!
//! Rows live in `Mutex<HashMap>`/`Mutex<Vec>` guards; reads join against the
//! role and catalog stores the same way the SQL implementation joins tables,
//! so the denormalized fields (`permission_level`, author/category names)
//! always reflect the current role assignments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use atrium_core::{CategoryId, EmailAddress, PostId, RoleId, UserId};
use atrium_directory::{DirectoryStore, DirectoryUser, NewUser, Role, RoleStore};
use atrium_forum::{
    CatalogStore, Category, Comment, CommentWithAuthor, ContentStore, NewComment, NewPost, Post,
    PostSummary,
};

/// Internal user row. The permission level is joined from the role store at
/// read time rather than stored, so role changes are visible on the next
/// lookup without a write-through.
#[derive(Debug, Clone)]
struct UserRow {
    user_id: UserId,
    email: EmailAddress,
    display_name: String,
    role_id: RoleId,
    password_hash: String,
    deactivated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryRoleStore {
    roles: Mutex<HashMap<RoleId, Role>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, role_id: RoleId) -> Option<Role> {
        self.roles.lock().unwrap().get(&role_id).cloned()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_role(&self, role_id: RoleId) -> anyhow::Result<Option<Role>> {
        Ok(self.get(role_id))
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<Role>> {
        let mut roles: Vec<Role> = self.roles.lock().unwrap().values().cloned().collect();
        roles.sort_by_key(|r| r.permission_level);
        Ok(roles)
    }

    async fn insert_role(&self, role: Role) -> anyhow::Result<()> {
        self.roles.lock().unwrap().insert(role.role_id, role);
        Ok(())
    }
}

pub struct MemoryDirectoryStore {
    users: Mutex<HashMap<String, UserRow>>,
    roles: Arc<MemoryRoleStore>,
}

impl MemoryDirectoryStore {
    pub fn new(roles: Arc<MemoryRoleStore>) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            roles,
        }
    }

    fn resolve(&self, row: &UserRow) -> anyhow::Result<DirectoryUser> {
        let role = self
            .roles
            .get(row.role_id)
            .ok_or_else(|| anyhow!("role {} missing for user {}", row.role_id, row.email))?;
        Ok(DirectoryUser {
            user_id: row.user_id,
            email: row.email.clone(),
            display_name: row.display_name.clone(),
            role_id: row.role_id,
            permission_level: role.permission_level,
            deactivated_at: row.deactivated_at,
            password_hash: row.password_hash.clone(),
        })
    }

    fn display_name_of(&self, user_id: UserId) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|r| r.user_id == user_id)
            .map(|r| r.display_name.clone())
    }

    fn row_of(&self, user_id: UserId) -> Option<UserRow> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|r| r.user_id == user_id)
            .cloned()
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn find_active_by_email(
        &self,
        email: &EmailAddress,
    ) -> anyhow::Result<Option<DirectoryUser>> {
        let row = self.users.lock().unwrap().get(email.as_str()).cloned();
        match row {
            Some(row) if row.deactivated_at.is_none() => Ok(Some(self.resolve(&row)?)),
            _ => Ok(None),
        }
    }

    async fn find_any_by_email(
        &self,
        email: &EmailAddress,
    ) -> anyhow::Result<Option<DirectoryUser>> {
        let row = self.users.lock().unwrap().get(email.as_str()).cloned();
        row.map(|row| self.resolve(&row)).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<DirectoryUser> {
        let row = UserRow {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            role_id: user.role_id,
            password_hash: user.password_hash,
            deactivated_at: None,
        };
        self.users
            .lock()
            .unwrap()
            .insert(row.email.as_str().to_string(), row.clone());
        self.resolve(&row)
    }

    async fn set_deactivated_at(
        &self,
        email: &EmailAddress,
        at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        if let Some(row) = self.users.lock().unwrap().get_mut(email.as_str()) {
            row.deactivated_at = at;
        }
        Ok(())
    }

    async fn update_role(&self, user_id: UserId, role_id: RoleId) -> anyhow::Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(row) = users.values_mut().find(|r| r.user_id == user_id) {
            row.role_id = role_id;
        }
        Ok(())
    }

    async fn update_password_hash(&self, email: &EmailAddress, hash: &str) -> anyhow::Result<()> {
        if let Some(row) = self.users.lock().unwrap().get_mut(email.as_str()) {
            row.password_hash = hash.to_string();
        }
        Ok(())
    }

    async fn list_users(&self) -> anyhow::Result<Vec<DirectoryUser>> {
        let rows: Vec<UserRow> = self.users.lock().unwrap().values().cloned().collect();
        let mut users = rows
            .iter()
            .map(|row| self.resolve(row))
            .collect::<anyhow::Result<Vec<_>>>()?;
        users.sort_by(|a, b| a.email.as_str().cmp(b.email.as_str()));
        Ok(users)
    }
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    categories: Mutex<Vec<Category>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_category(&self, category_id: CategoryId) -> anyhow::Result<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.category_id == category_id)
            .cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> anyhow::Result<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn insert_category(&self, category: Category) -> anyhow::Result<Category> {
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let mut categories = self.categories.lock().unwrap().clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

pub struct MemoryContentStore {
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    directory: Arc<MemoryDirectoryStore>,
    catalog: Arc<MemoryCatalogStore>,
    roles: Arc<MemoryRoleStore>,
}

impl MemoryContentStore {
    pub fn new(
        directory: Arc<MemoryDirectoryStore>,
        catalog: Arc<MemoryCatalogStore>,
        roles: Arc<MemoryRoleStore>,
    ) -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            directory,
            catalog,
            roles,
        }
    }

    fn summarize(&self, post: Post, comment_count: u64) -> anyhow::Result<PostSummary> {
        let author = self
            .directory
            .row_of(post.author_id)
            .ok_or_else(|| anyhow!("author {} missing for post {}", post.author_id, post.post_id))?;
        let role = self
            .roles
            .get(author.role_id)
            .ok_or_else(|| anyhow!("role {} missing for user {}", author.role_id, author.email))?;
        let category = self
            .catalog
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.category_id == post.category_id)
            .cloned()
            .ok_or_else(|| anyhow!("category {} missing for post {}", post.category_id, post.post_id))?;

        Ok(PostSummary {
            post,
            author_name: author.display_name,
            author_role: role.name,
            category_name: category.name,
            comment_count,
        })
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let post = Post {
            post_id: post.post_id,
            author_id: post.author_id,
            category_id: post.category_id,
            title: post.title,
            description: post.description,
            created_at: Utc::now(),
            edited_at: None,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: PostId) -> anyhow::Result<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.post_id == post_id)
            .cloned())
    }

    async fn list_posts_with_aggregates(&self) -> anyhow::Result<Vec<PostSummary>> {
        let mut posts = self.posts.lock().unwrap().clone();
        // Newest first, matching the home view.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let counts: HashMap<PostId, u64> = {
            let comments = self.comments.lock().unwrap();
            let mut counts = HashMap::new();
            for comment in comments.iter() {
                *counts.entry(comment.post_id).or_insert(0) += 1;
            }
            counts
        };

        posts
            .into_iter()
            .map(|post| {
                let count = counts.get(&post.post_id).copied().unwrap_or(0);
                self.summarize(post, count)
            })
            .collect()
    }

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment> {
        let comment = Comment {
            comment_id: comment.comment_id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Some(Utc::now()),
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn list_comments_by_post(
        &self,
        post_id: PostId,
    ) -> anyhow::Result<Vec<CommentWithAuthor>> {
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        comments
            .into_iter()
            .map(|comment| {
                let author_name = self
                    .directory
                    .display_name_of(comment.author_id)
                    .ok_or_else(|| {
                        anyhow!("author {} missing for comment {}", comment.author_id, comment.comment_id)
                    })?;
                Ok(CommentWithAuthor {
                    comment,
                    author_name,
                })
            })
            .collect()
    }
}

//! Postgres-backed store implementations (`postgres` feature).
//!
//! Plain `sqlx::query` with binds; the schema lives under `migrations/`.
//! Uniqueness is enforced twice: the executors check-then-insert for the
//! friendly conflict path, and the unique indexes catch the racy remainder.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use atrium_core::{CategoryId, EmailAddress, PostId, RoleId, UserId};
use atrium_directory::{DirectoryStore, DirectoryUser, NewUser, Role, RoleStore};
use atrium_forum::{
    CatalogStore, Category, Comment, CommentWithAuthor, ContentStore, NewComment, NewPost, Post,
    PostSummary,
};

const USER_COLUMNS: &str = "u.user_id, u.email, u.display_name, u.role_id, u.password_hash, \
     u.deactivated_at, r.permission_level";

fn user_from_row(row: &PgRow) -> anyhow::Result<DirectoryUser> {
    Ok(DirectoryUser {
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        email: EmailAddress::parse(&row.try_get::<String, _>("email")?)?,
        display_name: row.try_get("display_name")?,
        role_id: RoleId::from_uuid(row.try_get("role_id")?),
        permission_level: row.try_get("permission_level")?,
        deactivated_at: row.try_get("deactivated_at")?,
        password_hash: row.try_get("password_hash")?,
    })
}

fn role_from_row(row: &PgRow) -> anyhow::Result<Role> {
    Ok(Role {
        role_id: RoleId::from_uuid(row.try_get("role_id")?),
        name: row.try_get("name")?,
        permission_level: row.try_get("permission_level")?,
    })
}

pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn find_role(&self, role_id: RoleId) -> anyhow::Result<Option<Role>> {
        let row = sqlx::query("SELECT role_id, name, permission_level FROM roles WHERE role_id = $1")
            .bind(*role_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn list_roles(&self) -> anyhow::Result<Vec<Role>> {
        let rows =
            sqlx::query("SELECT role_id, name, permission_level FROM roles ORDER BY permission_level")
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(role_from_row).collect()
    }

    async fn insert_role(&self, role: Role) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO roles (role_id, name, permission_level) VALUES ($1, $2, $3)")
            .bind(*role.role_id.as_uuid())
            .bind(&role.name)
            .bind(role.permission_level)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn find_active_by_email(
        &self,
        email: &EmailAddress,
    ) -> anyhow::Result<Option<DirectoryUser>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.role_id = u.role_id \
             WHERE u.email = $1 AND u.deactivated_at IS NULL"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_any_by_email(
        &self,
        email: &EmailAddress,
    ) -> anyhow::Result<Option<DirectoryUser>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.role_id = u.role_id \
             WHERE u.email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<DirectoryUser> {
        sqlx::query(
            "INSERT INTO users (user_id, email, display_name, role_id, password_hash) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.display_name)
        .bind(*user.role_id.as_uuid())
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await?;

        self.find_any_by_email(&user.email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user row missing after insert"))
    }

    async fn set_deactivated_at(
        &self,
        email: &EmailAddress,
        at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET deactivated_at = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_role(&self, user_id: UserId, role_id: RoleId) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET role_id = $2 WHERE user_id = $1")
            .bind(*user_id.as_uuid())
            .bind(*role_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_password_hash(&self, email: &EmailAddress, hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_users(&self) -> anyhow::Result<Vec<DirectoryUser>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.role_id = u.role_id \
             ORDER BY u.email"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }
}

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn category_from_row(row: &PgRow) -> anyhow::Result<Category> {
    Ok(Category {
        category_id: CategoryId::from_uuid(row.try_get("category_id")?),
        name: row.try_get("name")?,
    })
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_category(&self, category_id: CategoryId) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query("SELECT category_id, name FROM categories WHERE category_id = $1")
            .bind(*category_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(category_from_row).transpose()
    }

    async fn find_category_by_name(&self, name: &str) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query("SELECT category_id, name FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(category_from_row).transpose()
    }

    async fn insert_category(&self, category: Category) -> anyhow::Result<Category> {
        sqlx::query("INSERT INTO categories (category_id, name) VALUES ($1, $2)")
            .bind(*category.category_id.as_uuid())
            .bind(&category.name)
            .execute(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query("SELECT category_id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(category_from_row).collect()
    }
}

pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> anyhow::Result<Post> {
    Ok(Post {
        post_id: PostId::from_uuid(row.try_get("post_id")?),
        author_id: UserId::from_uuid(row.try_get("author_id")?),
        category_id: CategoryId::from_uuid(row.try_get("category_id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
    })
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn insert_post(&self, post: NewPost) -> anyhow::Result<Post> {
        let row = sqlx::query(
            "INSERT INTO posts (post_id, author_id, category_id, title, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING created_at",
        )
        .bind(*post.post_id.as_uuid())
        .bind(*post.author_id.as_uuid())
        .bind(*post.category_id.as_uuid())
        .bind(&post.title)
        .bind(&post.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Post {
            post_id: post.post_id,
            author_id: post.author_id,
            category_id: post.category_id,
            title: post.title,
            description: post.description,
            created_at: row.try_get("created_at")?,
            edited_at: None,
        })
    }

    async fn find_post(&self, post_id: PostId) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT post_id, author_id, category_id, title, description, created_at, edited_at \
             FROM posts WHERE post_id = $1",
        )
        .bind(*post_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn list_posts_with_aggregates(&self) -> anyhow::Result<Vec<PostSummary>> {
        let rows = sqlx::query(
            "SELECT p.post_id, p.author_id, p.category_id, p.title, p.description, \
                    p.created_at, p.edited_at, \
                    u.display_name AS author_name, r.name AS role_name, c.name AS category_name, \
                    (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.post_id) AS comment_count \
             FROM posts p \
             JOIN users u ON u.user_id = p.author_id \
             JOIN roles r ON r.role_id = u.role_id \
             JOIN categories c ON c.category_id = p.category_id \
             ORDER BY p.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PostSummary {
                    post: post_from_row(row)?,
                    author_name: row.try_get("author_name")?,
                    author_role: row.try_get("role_name")?,
                    category_name: row.try_get("category_name")?,
                    comment_count: row.try_get::<i64, _>("comment_count")? as u64,
                })
            })
            .collect()
    }

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<Comment> {
        let row = sqlx::query(
            "INSERT INTO comments (comment_id, post_id, author_id, content) \
             VALUES ($1, $2, $3, $4) RETURNING created_at",
        )
        .bind(*comment.comment_id.as_uuid())
        .bind(*comment.post_id.as_uuid())
        .bind(*comment.author_id.as_uuid())
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(Comment {
            comment_id: comment.comment_id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Some(row.try_get("created_at")?),
        })
    }

    async fn list_comments_by_post(
        &self,
        post_id: PostId,
    ) -> anyhow::Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query(
            "SELECT cm.comment_id, cm.post_id, cm.author_id, cm.content, cm.created_at, \
                    u.display_name AS author_name \
             FROM comments cm JOIN users u ON u.user_id = cm.author_id \
             WHERE cm.post_id = $1 ORDER BY cm.created_at",
        )
        .bind(*post_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CommentWithAuthor {
                    comment: Comment {
                        comment_id: atrium_core::CommentId::from_uuid(row.try_get("comment_id")?),
                        post_id: PostId::from_uuid(row.try_get("post_id")?),
                        author_id: UserId::from_uuid(row.try_get("author_id")?),
                        content: row.try_get("content")?,
                        created_at: Some(row.try_get("created_at")?),
                    },
                    author_name: row.try_get("author_name")?,
                })
            })
            .collect()
    }
}

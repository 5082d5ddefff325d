//! Request DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::json;

use atrium_directory::{DirectoryUser, Role};
use atrium_forum::{Category, Comment, CommentWithAuthor, HomeView, Post, PostSummary};

// ─────────────────────────────────────────────────────────────────────────────
// Request DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub role_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub email: String,
    pub role_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub category_id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON mapping
// ─────────────────────────────────────────────────────────────────────────────

/// The password hash never leaves the server; this is the only user shape
/// the API emits.
pub fn user_to_json(user: &DirectoryUser) -> serde_json::Value {
    json!({
        "user_id": user.user_id.to_string(),
        "email": user.email.as_str(),
        "display_name": user.display_name,
        "role_id": user.role_id.to_string(),
        "permission_level": user.permission_level,
        "active": user.is_active(),
        "deactivated_at": user.deactivated_at.map(|t| t.to_rfc3339()),
    })
}

pub fn role_to_json(role: &Role) -> serde_json::Value {
    json!({
        "role_id": role.role_id.to_string(),
        "name": role.name,
        "permission_level": role.permission_level,
    })
}

pub fn category_to_json(category: &Category) -> serde_json::Value {
    json!({
        "category_id": category.category_id.to_string(),
        "name": category.name,
    })
}

pub fn post_to_json(post: &Post) -> serde_json::Value {
    json!({
        "post_id": post.post_id.to_string(),
        "author_id": post.author_id.to_string(),
        "category_id": post.category_id.to_string(),
        "title": post.title,
        "description": post.description,
        "created_at": post.created_at.to_rfc3339(),
        "edited_at": post.edited_at.map(|t| t.to_rfc3339()),
    })
}

pub fn post_summary_to_json(summary: &PostSummary) -> serde_json::Value {
    let mut value = post_to_json(&summary.post);
    let obj = value.as_object_mut().expect("post_to_json returns an object");
    obj.insert("author_name".to_string(), json!(summary.author_name));
    obj.insert("author_role".to_string(), json!(summary.author_role));
    obj.insert("category_name".to_string(), json!(summary.category_name));
    obj.insert("comment_count".to_string(), json!(summary.comment_count));
    value
}

/// A `null` `created_at` marks a freshly posted comment (echo of an
/// insert); listings always carry the stored timestamp.
pub fn comment_to_json(comment: &Comment) -> serde_json::Value {
    json!({
        "comment_id": comment.comment_id.to_string(),
        "post_id": comment.post_id.to_string(),
        "author_id": comment.author_id.to_string(),
        "content": comment.content,
        "created_at": comment.created_at.map(|t| t.to_rfc3339()),
    })
}

pub fn comment_with_author_to_json(entry: &CommentWithAuthor) -> serde_json::Value {
    let mut value = comment_to_json(&entry.comment);
    let obj = value.as_object_mut().expect("comment_to_json returns an object");
    obj.insert("author_name".to_string(), json!(entry.author_name));
    value
}

pub fn home_to_json(view: &HomeView) -> serde_json::Value {
    json!({
        "categories": view.categories.iter().map(category_to_json).collect::<Vec<_>>(),
        "posts": view.posts.iter().map(post_summary_to_json).collect::<Vec<_>>(),
    })
}

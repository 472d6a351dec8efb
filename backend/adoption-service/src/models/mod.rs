/// Data models for adoption-service
///
/// - Post / Comment: community posts written by users
/// - Article: notices and card-news published by administrators
/// - UserProfile: per-user record, including the AI search usage pair
///
/// Shelter animals are not modelled here: they are a read-only projection of
/// the open data API and are passed through as JSON.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    /// Rich-text (HTML) body
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "at most 10 tags are allowed"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 100, message = "title must be 1-100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,
    #[validate(length(max = 10, message = "at most 10 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub tag: Option<String>,
    pub author_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "comment must be 1-2000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "article_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    Notice,
    CardNews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "article_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Published,
}

/// Notice or card-news entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Article {
    pub id: Uuid,
    pub kind: ArticleKind,
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: ArticleStatus,
    /// Card-news pages, in display order
    pub image_urls: Vec<String>,
    pub author_id: Uuid,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub kind: ArticleKind,
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: ArticleStatus,
    pub image_urls: Vec<String>,
    pub author_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub status: Option<ArticleStatus>,
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateArticleRequest {
    pub kind: ArticleKind,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub category: String,
    #[serde(default = "default_status")]
    pub status: ArticleStatus,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

fn default_status() -> ArticleStatus {
    ArticleStatus::Draft
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    pub status: Option<ArticleStatus>,
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    pub kind: Option<ArticleKind>,
    pub category: Option<String>,
    pub include_drafts: bool,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub nickname: Option<String>,
    pub role: UserRole,
    /// Similarity searches charged in the current window
    pub ai_search_count: i32,
    /// Time of the last charged similarity search
    pub last_ai_search_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Count + timestamp pair written after a charged similarity search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiUsage {
    pub count: i32,
    pub last_at: DateTime<Utc>,
}

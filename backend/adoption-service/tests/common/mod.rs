//! Shared helpers for adoption-service integration tests
//!
//! - `MemoryDb`: in-memory implementation of every repository trait
//! - `FakeIndex` / `FixedExtractor`: similarity search backends without network or model files
//! - `test_config` / `build_state` / `bearer`: app wiring and token minting
#![allow(dead_code)]

use adoption_service::clients::{VectorIndex, VectorMatch, VectorPage, VectorRecord};
use adoption_service::config::Config;
use adoption_service::db::{
    ArticleRepository, CommentRepository, PostRepository, ProfileRepository, Repositories,
    ViewRepository,
};
use adoption_service::error::{AppError, Result};
use adoption_service::models::{
    AiUsage, Article, ArticleChanges, ArticleKind, ArticleQuery, ArticleStatus, Comment, NewArticle,
    NewPost, Post, PostChanges, PostQuery, UserProfile, UserRole,
};
use adoption_service::services::{FeatureExtractor, RawEmbedding, SharedModel};
use adoption_service::AppState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crypto_core::jwt::JwtSigner;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/jwt_test_private.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/jwt_test_public.pem");
pub const SHELTER_SECRET: &str = "integration-test-secret";
pub const INDEX_DIMENSION: usize = 4;

/// Build the service the way `main` does, minus health and swagger
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(adoption_service::middleware::JwtAuth::new(
                    $state.jwt_validator(),
                ))
                .configure(adoption_service::handlers::configure),
        )
        .await
    };
}

// =====================================================================
// In-memory repositories
// =====================================================================

#[derive(Default)]
struct Tables {
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    articles: HashMap<Uuid, Article>,
    views: HashSet<(Uuid, String)>,
    profiles: HashMap<Uuid, UserProfile>,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            posts: self.clone(),
            comments: self.clone(),
            articles: self.clone(),
            views: self.clone(),
            profiles: self.clone(),
        }
    }

    fn default_profile(user_id: Uuid) -> UserProfile {
        UserProfile {
            id: user_id,
            nickname: None,
            role: UserRole::User,
            ai_search_count: 0,
            last_ai_search_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn make_admin(&self, user_id: Uuid) {
        let mut tables = self.tables.lock().unwrap();
        tables
            .profiles
            .entry(user_id)
            .or_insert_with(|| Self::default_profile(user_id))
            .role = UserRole::Admin;
    }

    pub fn set_ai_usage(&self, user_id: Uuid, count: i32, last_at: Option<DateTime<Utc>>) {
        let mut tables = self.tables.lock().unwrap();
        let profile = tables
            .profiles
            .entry(user_id)
            .or_insert_with(|| Self::default_profile(user_id));
        profile.ai_search_count = count;
        profile.last_ai_search_at = last_at;
    }

    pub fn profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.tables.lock().unwrap().profiles.get(&user_id).cloned()
    }

    pub fn view_rows(&self) -> usize {
        self.tables.lock().unwrap().views.len()
    }

    pub fn insert_article(&self, kind: ArticleKind, status: ArticleStatus) -> Article {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            kind,
            title: "보호소 봉사활동 안내".to_string(),
            content: "<p>이번 주 토요일</p>".to_string(),
            category: "volunteer".to_string(),
            status,
            image_urls: Vec::new(),
            author_id: Uuid::new_v4(),
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .articles
            .insert(article.id, article.clone());
        article
    }
}

fn page<T: Clone>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl PostRepository for MemoryDb {
    async fn create(&self, post: NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            tags: post.tags,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .posts
            .insert(post.id, post.clone());
        Ok(post)
    }

    async fn get(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.tables.lock().unwrap().posts.get(&post_id).cloned())
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>> {
        let tables = self.tables.lock().unwrap();
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| query.tag.as_ref().map_or(true, |t| p.tags.contains(t)))
            .filter(|p| query.author_id.map_or(true, |a| p.author_id == a))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(posts, query.limit, query.offset))
    }

    async fn update(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.posts.get_mut(&post_id).map(|post| {
            if let Some(title) = changes.title {
                post.title = title;
            }
            if let Some(content) = changes.content {
                post.content = content;
            }
            if let Some(tags) = changes.tags {
                post.tags = tags;
            }
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete(&self, post_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        tables.comments.retain(|_, c| c.post_id != post_id);
        Ok(tables.posts.remove(&post_id).is_some())
    }
}

#[async_trait]
impl CommentRepository for MemoryDb {
    async fn create(&self, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .comments
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.lock().unwrap().comments.get(&comment_id).cloned())
    }

    async fn list_by_post(&self, post_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Comment>> {
        let tables = self.tables.lock().unwrap();
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page(comments, limit, offset))
    }

    async fn delete(&self, comment_id: Uuid) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .comments
            .remove(&comment_id)
            .is_some())
    }
}

#[async_trait]
impl ArticleRepository for MemoryDb {
    async fn create(&self, article: NewArticle) -> Result<Article> {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            kind: article.kind,
            title: article.title,
            content: article.content,
            category: article.category,
            status: article.status,
            image_urls: article.image_urls,
            author_id: article.author_id,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .articles
            .insert(article.id, article.clone());
        Ok(article)
    }

    async fn get(&self, article_id: Uuid) -> Result<Option<Article>> {
        Ok(self.tables.lock().unwrap().articles.get(&article_id).cloned())
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let tables = self.tables.lock().unwrap();
        let mut articles: Vec<Article> = tables
            .articles
            .values()
            .filter(|a| query.kind.map_or(true, |k| a.kind == k))
            .filter(|a| query.category.as_ref().map_or(true, |c| &a.category == c))
            .filter(|a| query.include_drafts || a.status == ArticleStatus::Published)
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(articles, query.limit, query.offset))
    }

    async fn update(&self, article_id: Uuid, changes: ArticleChanges) -> Result<Option<Article>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.articles.get_mut(&article_id).map(|article| {
            if let Some(title) = changes.title {
                article.title = title;
            }
            if let Some(content) = changes.content {
                article.content = content;
            }
            if let Some(category) = changes.category {
                article.category = category;
            }
            if let Some(status) = changes.status {
                article.status = status;
            }
            if let Some(image_urls) = changes.image_urls {
                article.image_urls = image_urls;
            }
            article.updated_at = Utc::now();
            article.clone()
        }))
    }

    async fn delete(&self, article_id: Uuid) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .articles
            .remove(&article_id)
            .is_some())
    }

    async fn increment_view_count(&self, article_id: Uuid) -> Result<i64> {
        let mut tables = self.tables.lock().unwrap();
        let article = tables
            .articles
            .get_mut(&article_id)
            .ok_or_else(|| AppError::NotFound("article".to_string()))?;
        article.view_count += 1;
        Ok(article.view_count)
    }
}

#[async_trait]
impl ViewRepository for MemoryDb {
    async fn exists(&self, article_id: Uuid, visitor_id: &str) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .views
            .contains(&(article_id, visitor_id.to_string())))
    }

    async fn insert(&self, article_id: Uuid, visitor_id: &str) -> Result<()> {
        self.tables
            .lock()
            .unwrap()
            .views
            .insert((article_id, visitor_id.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryDb {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.tables.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn ensure(&self, user_id: Uuid) -> Result<UserProfile> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .profiles
            .entry(user_id)
            .or_insert_with(|| Self::default_profile(user_id))
            .clone())
    }

    async fn record_ai_search(&self, user_id: Uuid, usage: AiUsage) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(profile) = tables.profiles.get_mut(&user_id) {
            profile.ai_search_count = usage.count;
            profile.last_ai_search_at = Some(usage.last_at);
        }
        Ok(())
    }
}

// =====================================================================
// Similarity search backends
// =====================================================================

/// Vector index that echoes a fixed match list and records every query
#[derive(Default)]
pub struct FakeIndex {
    pub queries: Mutex<Vec<(Vec<f32>, u32)>>,
    pub fail: AtomicBool,
}

impl FakeIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_top_k(&self) -> Option<u32> {
        self.queries.lock().unwrap().last().map(|(_, k)| *k)
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: u32,
        _filter: Option<Value>,
    ) -> Result<Vec<VectorMatch>> {
        self.queries.lock().unwrap().push((vector.to_vec(), top_k));
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::upstream("pinecone", 503, "index unavailable"));
        }
        Ok(vec![VectorMatch {
            id: "448548202400123".to_string(),
            score: 0.93,
            metadata: Some(serde_json::json!({ "kindCd": "[개] 믹스견" })),
        }])
    }

    async fn list(&self, limit: u32, _pagination_token: Option<&str>) -> Result<VectorPage> {
        Ok(VectorPage {
            vectors: (0..limit.min(2))
                .map(|i| VectorRecord {
                    id: format!("animal-{i}"),
                    metadata: None,
                })
                .collect(),
            pagination_token: None,
        })
    }
}

/// Extractor returning a `[1, INDEX_DIMENSION]` output for any input
pub struct FixedExtractor {
    pub calls: AtomicUsize,
}

impl FeatureExtractor for FixedExtractor {
    fn extract(&self, _image: &[u8]) -> Result<RawEmbedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawEmbedding {
            data: vec![1.0, 2.0, 2.0, 0.0],
            dims: vec![1, INDEX_DIMENSION],
        })
    }
}

pub fn fixed_model() -> Arc<SharedModel> {
    Arc::new(SharedModel::ready(Arc::new(FixedExtractor {
        calls: AtomicUsize::new(0),
    })))
}

// =====================================================================
// Wiring
// =====================================================================

/// Configuration with every upstream pointed at `upstream` (a mock server)
pub fn test_config(upstream: &str) -> Config {
    let mut config = Config::default();
    config.auth.jwt_public_key_pem = Some(TEST_PUBLIC_KEY.to_string());
    config.shelter_token.secret = Some(SHELTER_SECRET.to_string());
    config.open_data.animal_base_url = upstream.to_string();
    config.open_data.shelter_base_url = upstream.to_string();
    config.open_data.service_key = Some("test-service-key".to_string());
    config.geocoding.base_url = upstream.to_string();
    config.geocoding.rest_api_key = Some("kakao-key".to_string());
    config.youtube.base_url = upstream.to_string();
    config.youtube.api_key = Some("youtube-key".to_string());
    config.cloudinary.base_url = upstream.to_string();
    config.cloudinary.cloud_name = Some("demo".to_string());
    config.cloudinary.api_key = Some("123456".to_string());
    config.cloudinary.api_secret = Some("cloudinary-secret".to_string());
    config.vector_index.dimension = INDEX_DIMENSION;
    config.app.upstream_timeout_secs = 5;
    config
}

pub struct TestContext {
    pub db: Arc<MemoryDb>,
    pub index: Arc<FakeIndex>,
    pub state: actix_web::web::Data<AppState>,
}

pub fn build_state(config: Config) -> TestContext {
    let db = MemoryDb::new();
    let index = FakeIndex::new();
    let state = AppState::with_search_backend(
        config,
        db.repositories(),
        index.clone(),
        fixed_model(),
    )
    .expect("state");

    TestContext {
        db,
        index,
        state: actix_web::web::Data::new(state),
    }
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let signer = JwtSigner::from_private_key_pem(TEST_PRIVATE_KEY).expect("signer");
    let token = signer
        .issue(user_id, chrono::Duration::hours(1))
        .expect("token");
    ("Authorization", format!("Bearer {}", token))
}

/// Minimal multipart body with one file part and optional text fields
pub fn multipart_body(
    boundary: &str,
    file_field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
    fields: &[(&str, &str)],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{file_field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Multipart body made only of file parts, given as `(field, content type, bytes)`
pub fn multipart_files(boundary: &str, parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (i, (field, content_type, bytes)) in parts.iter().enumerate() {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"part-{i}.png\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

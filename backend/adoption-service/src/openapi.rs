/// OpenAPI documentation for the Haven adoption service
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::clients::{OpenDataPage, UploadedImage, Video, VectorMatch, VectorPage, VectorRecord};
use crate::handlers::articles::RecordViewRequest;
use crate::handlers::media::DeleteImageRequest;
use crate::handlers::tokens::{EncodeTokensRequest, EncodeTokensResponse, EncodedToken};
use crate::handlers::vectors::VectorQueryRequest;
use crate::handlers::videos::TrendingResponse;
use crate::models::{
    Article, ArticleKind, ArticleStatus, Comment, CreateArticleRequest, CreateCommentRequest,
    CreatePostRequest, Post, UpdateArticleRequest, UpdatePostRequest, UserProfile, UserRole,
};
use crate::services::{QuotaStatus, SearchResult, ViewOutcome};
use error_types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Haven Adoption Service API",
        version = "1.0.0",
        description = "Backend for the stray-animal adoption community: community board, notices and card-news, shelter open data proxies, image similarity search and media handling.",
        contact(
            name = "Haven Team",
            email = "team@haven.dev"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "posts", description = "Community board posts and comments"),
        (name = "articles", description = "Notices and card-news, view counting"),
        (name = "shelters", description = "Abandoned animals, shelter registry and code tables"),
        (name = "tokens", description = "Shelter-id token encoding"),
        (name = "ai-search", description = "Image similarity search with a daily quota"),
        (name = "media", description = "Image upload and deletion"),
        (name = "proxies", description = "Geocoding, trending videos, vector index, client IP"),
    ),
    components(schemas(
        ErrorResponse,
        Post, CreatePostRequest, UpdatePostRequest, Comment, CreateCommentRequest,
        Article, ArticleKind, ArticleStatus, CreateArticleRequest, UpdateArticleRequest,
        RecordViewRequest, ViewOutcome,
        UserProfile, UserRole,
        OpenDataPage,
        EncodeTokensRequest, EncodeTokensResponse, EncodedToken,
        SearchResult, QuotaStatus, VectorMatch, VectorPage, VectorRecord, VectorQueryRequest,
        UploadedImage, DeleteImageRequest,
        Video, TrendingResponse,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("RS256 access token from the identity provider"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}

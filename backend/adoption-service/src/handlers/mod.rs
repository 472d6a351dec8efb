/// HTTP handlers for adoption-service
///
/// Community:
/// - Posts / comments: community board
/// - Articles: notices and card-news, plus view recording
/// - Profile: the caller's own profile
///
/// Proxies and tools:
/// - Shelters: abandoned animals, shelter registry and code tables
/// - Tokens: shelter-id token encoding/decoding
/// - Geocode, videos, media, vectors, network
/// - AI search: image similarity search with a daily quota
pub mod ai_search;
pub mod articles;
pub mod comments;
pub mod geocode;
pub mod media;
pub mod network;
pub mod posts;
pub mod profile;
pub mod shelters;
pub mod tokens;
pub mod vectors;
pub mod videos;

use crate::error::AppError;
use actix_web::web;
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `limit` / `offset` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Register every `/api/v1` route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .limit(1024 * 1024)
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api/v1")
            // Community board
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .service(
                web::resource("/posts/{id}/comments")
                    .route(web::get().to(comments::list_comments))
                    .route(web::post().to(comments::create_comment)),
            )
            .route("/comments/{id}", web::delete().to(comments::delete_comment))
            // Notices and card-news
            .service(
                web::resource("/articles")
                    .route(web::get().to(articles::list_articles))
                    .route(web::post().to(articles::create_article)),
            )
            .service(
                web::resource("/articles/{id}")
                    .route(web::get().to(articles::get_article))
                    .route(web::put().to(articles::update_article))
                    .route(web::delete().to(articles::delete_article)),
            )
            .route("/articles/{id}/views", web::post().to(articles::record_view))
            .route("/me", web::get().to(profile::me))
            // Shelter data
            .route("/shelters", web::get().to(shelters::list_shelters))
            .route("/shelters/animals", web::get().to(shelters::list_animals))
            .route(
                "/shelters/animals/by-token/{token}",
                web::get().to(shelters::animals_by_token),
            )
            .route("/shelters/sido", web::get().to(shelters::list_sido))
            .route("/shelters/sigungu", web::get().to(shelters::list_sigungu))
            .route("/shelters/kinds", web::get().to(shelters::list_kinds))
            .route("/shelter-tokens", web::post().to(tokens::encode_tokens))
            .route("/shelter-tokens/{token}", web::get().to(tokens::decode_token))
            // Third-party proxies
            .route("/geocode/reverse", web::get().to(geocode::reverse_geocode))
            .route("/videos/trending", web::get().to(videos::trending_videos))
            .service(
                web::resource("/media/images")
                    .route(web::post().to(media::upload_image))
                    .route(web::delete().to(media::delete_image)),
            )
            .route("/vectors", web::get().to(vectors::list_vectors))
            .route("/vectors/query", web::post().to(vectors::query_vectors))
            .route("/ai-search", web::post().to(ai_search::search_similar))
            .route("/ai-search/quota", web::get().to(ai_search::quota_status))
            .route("/client-ip", web::get().to(network::client_ip)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination {
            limit: Some(1000),
            offset: Some(-5),
        };
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
        assert_eq!(Pagination::default().limit(), DEFAULT_PAGE_SIZE);
    }
}

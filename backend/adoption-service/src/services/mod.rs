/// Business logic layer for adoption-service
///
/// - Posts / comments: community board with author-only edits
/// - Articles: notices and card-news managed by administrators
/// - Views: deduplicated per-visitor view counting
/// - Quota / embedding / similarity: image similarity search with a daily allowance
pub mod articles;
pub mod comments;
pub mod embedding;
pub mod posts;
pub mod quota;
pub mod similarity;
pub mod views;

pub use articles::ArticleService;
pub use comments::CommentService;
pub use embedding::{
    extract_embedding, l2_normalize, FeatureExtractor, OnnxFeatureExtractor, RawEmbedding,
    SharedModel,
};
pub use posts::PostService;
pub use quota::{DailyQuota, QuotaStatus};
pub use similarity::{clamp_top_k, SearchResult, SimilaritySearch};
pub use views::{ViewOutcome, ViewRecorder};

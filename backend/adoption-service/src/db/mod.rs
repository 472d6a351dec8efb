/// Data access layer
///
/// Each repository is a trait so HTTP composition never talks to the
/// database directly; the PostgreSQL implementations live next to the traits.
pub mod article_repo;
pub mod comment_repo;
pub mod post_repo;
pub mod profile_repo;
pub mod view_repo;

pub use article_repo::{ArticleRepository, PgArticleRepository};
pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use post_repo::{PgPostRepository, PostRepository};
pub use profile_repo::{PgProfileRepository, ProfileRepository};
pub use view_repo::{PgViewRepository, ViewRepository};

use sqlx::PgPool;
use std::sync::Arc;

/// Bundle of repository handles shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub views: Arc<dyn ViewRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            articles: Arc::new(PgArticleRepository::new(pool.clone())),
            views: Arc::new(PgViewRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool)),
        }
    }
}

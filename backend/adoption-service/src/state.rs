/// Shared application state handed to every handler through `web::Data`
use crate::clients::{
    build_http_client, CloudinaryClient, GeocodingClient, OpenDataClient, PineconeClient,
    VectorIndex, YoutubeClient,
};
use crate::config::Config;
use crate::db::Repositories;
use crate::error::{AppError, Result};
use crate::services::{
    ArticleService, CommentService, DailyQuota, PostService, SharedModel, SimilaritySearch,
    ViewRecorder,
};
use crypto_core::jwt::JwtValidator;
use crypto_core::ShelterTokenCodec;
use std::sync::Arc;
use std::time::Duration;

pub struct AppState {
    pub config: Arc<Config>,
    pub repos: Repositories,
    pub posts: PostService,
    pub comments: CommentService,
    pub articles: ArticleService,
    pub views: ViewRecorder,
    pub similarity: SimilaritySearch,
    pub open_data: OpenDataClient,
    pub geocoding: GeocodingClient,
    pub youtube: YoutubeClient,
    pub cloudinary: CloudinaryClient,
    pub vector_index: Arc<dyn VectorIndex>,
    pub model: Arc<SharedModel>,
    shelter_tokens: Option<ShelterTokenCodec>,
    jwt: Option<Arc<JwtValidator>>,
}

impl AppState {
    /// Wire production clients: Pinecone for the index, the ONNX model on disk
    pub fn new(config: Config, repos: Repositories) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(config.app.upstream_timeout_secs))?;
        let vector_index: Arc<dyn VectorIndex> =
            Arc::new(PineconeClient::new(http.clone(), &config.vector_index));
        let model = Arc::new(SharedModel::onnx(&config.embedding));

        Self::assemble(config, repos, http, vector_index, model)
    }

    /// Same wiring with a caller-supplied vector index and model handle
    pub fn with_search_backend(
        config: Config,
        repos: Repositories,
        vector_index: Arc<dyn VectorIndex>,
        model: Arc<SharedModel>,
    ) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(config.app.upstream_timeout_secs))?;
        Self::assemble(config, repos, http, vector_index, model)
    }

    fn assemble(
        config: Config,
        repos: Repositories,
        http: reqwest::Client,
        vector_index: Arc<dyn VectorIndex>,
        model: Arc<SharedModel>,
    ) -> Result<Self> {
        let shelter_tokens = match config.shelter_token.secret.as_deref() {
            Some(secret) => Some(
                ShelterTokenCodec::new(secret)
                    .map_err(|e| AppError::Config(format!("shelter token codec: {}", e)))?,
            ),
            None => None,
        };

        let jwt = match config.auth.jwt_public_key_pem.as_deref() {
            Some(pem) => Some(Arc::new(
                JwtValidator::from_public_key_pem(&pem.replace("\\n", "\n"))
                    .map_err(|e| AppError::Config(format!("JWT_PUBLIC_KEY_PEM: {}", e)))?,
            )),
            None => None,
        };

        let quota = DailyQuota::new(
            config.ai_quota.daily_limit,
            chrono::Duration::hours(config.ai_quota.window_hours),
        );

        Ok(Self {
            posts: PostService::new(repos.posts.clone(), repos.profiles.clone()),
            comments: CommentService::new(
                repos.comments.clone(),
                repos.posts.clone(),
                repos.profiles.clone(),
            ),
            articles: ArticleService::new(repos.articles.clone(), repos.profiles.clone()),
            views: ViewRecorder::new(
                repos.articles.clone(),
                repos.views.clone(),
                Duration::from_millis(config.views.min_dwell_ms),
            ),
            similarity: SimilaritySearch::new(
                model.clone(),
                vector_index.clone(),
                repos.profiles.clone(),
                quota,
                config.vector_index.dimension,
            ),
            open_data: OpenDataClient::new(http.clone(), &config.open_data),
            geocoding: GeocodingClient::new(http.clone(), &config.geocoding),
            youtube: YoutubeClient::new(http.clone(), &config.youtube),
            cloudinary: CloudinaryClient::new(http, &config.cloudinary),
            vector_index,
            model,
            shelter_tokens,
            jwt,
            repos,
            config: Arc::new(config),
        })
    }

    pub fn shelter_tokens(&self) -> Result<&ShelterTokenCodec> {
        self.shelter_tokens
            .as_ref()
            .ok_or_else(|| AppError::missing_config("SHELTER_TOKEN_SECRET"))
    }

    pub fn jwt_validator(&self) -> Option<Arc<JwtValidator>> {
        self.jwt.clone()
    }
}

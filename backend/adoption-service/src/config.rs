/// Configuration management for Adoption Service
///
/// Everything is read from environment variables (optionally seeded from a
/// `.env` file by `main`). Third-party API keys are optional at boot: a missing
/// key only fails the routes that need it, with a descriptive 500.
use db_pool::env_utils::{parse_env_optional, parse_env_with_default};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub shelter_token: ShelterTokenConfig,
    pub open_data: OpenDataConfig,
    pub geocoding: GeocodingConfig,
    pub youtube: YoutubeConfig,
    pub cloudinary: CloudinaryConfig,
    pub vector_index: VectorIndexConfig,
    pub embedding: EmbeddingConfig,
    pub ai_quota: AiQuotaConfig,
    pub views: ViewConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Upper bound for any single upstream HTTP call
    pub upstream_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            upstream_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "http://localhost:3000".to_string(),
        }
    }
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Bearer token validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// RSA public key (PEM) used to verify access tokens
    pub jwt_public_key_pem: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelterTokenConfig {
    pub secret: Option<String>,
}

/// Government animal-protection open data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDataConfig {
    /// Base URL of the abandoned-animal service
    pub animal_base_url: String,
    /// Base URL of the shelter registry service
    pub shelter_base_url: String,
    pub service_key: Option<String>,
}

impl Default for OpenDataConfig {
    fn default() -> Self {
        Self {
            animal_base_url: "https://apis.data.go.kr/1543061/abandonmentPublicService_v2"
                .to_string(),
            shelter_base_url: "https://apis.data.go.kr/1543061/animalShelterSrvc_v2".to_string(),
            service_key: None,
        }
    }
}

/// Reverse geocoding (Kakao Local API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub rest_api_key: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dapi.kakao.com".to_string(),
            rest_api_key: None,
        }
    }
}

/// YouTube Data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Search phrase used for the trending listing
    pub query: String,
    pub region_code: String,
    pub max_results: u32,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com".to_string(),
            api_key: None,
            query: "유기동물 입양".to_string(),
            region_code: "KR".to_string(),
            max_results: 10,
        }
    }
}

/// Cloudinary image store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub base_url: String,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Folder uploaded images are placed in
    pub folder: String,
    pub max_upload_bytes: usize,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com".to_string(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
            folder: "community".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Pinecone vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Index host, e.g. `https://animals-abc123.svc.aped-4627-b74a.pinecone.io`
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub namespace: Option<String>,
    /// Dimensionality of the stored embeddings
    pub dimension: usize,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            host: None,
            api_key: None,
            namespace: None,
            dimension: 768,
        }
    }
}

/// Image feature extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Path to the ONNX vision model
    pub model_path: String,
    /// Square input resolution expected by the model
    pub image_size: u32,
    /// Largest accepted query image
    pub max_image_bytes: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_path: "models/vit-base-patch16-224.onnx".to_string(),
            image_size: 224,
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Per-user similarity search quota
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiQuotaConfig {
    pub daily_limit: u32,
    pub window_hours: i64,
}

impl Default for AiQuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: 5,
            window_hours: 24,
        }
    }
}

/// View counting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Minimum time on page before a view counts
    pub min_dwell_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { min_dwell_ms: 5_000 }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| defaults.app.env.clone());

        let app = AppConfig {
            env: app_env,
            host: std::env::var("ADOPTION_SERVICE_HOST").unwrap_or(defaults.app.host),
            port: parse_env_with_default("ADOPTION_SERVICE_PORT", defaults.app.port),
            upstream_timeout_secs: parse_env_with_default(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.app.upstream_timeout_secs,
            ),
        };

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if app.is_production() => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => defaults.cors.allowed_origins,
            };

            if app.is_production() && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let shelter_token = ShelterTokenConfig {
            secret: parse_env_optional("SHELTER_TOKEN_SECRET"),
        };
        if app.is_production() && shelter_token.secret.is_none() {
            return Err("SHELTER_TOKEN_SECRET must be set in production".to_string());
        }

        Ok(Config {
            cors,
            auth: AuthConfig {
                jwt_public_key_pem: parse_env_optional("JWT_PUBLIC_KEY_PEM"),
            },
            shelter_token,
            open_data: OpenDataConfig {
                animal_base_url: std::env::var("OPEN_DATA_ANIMAL_BASE_URL")
                    .unwrap_or(defaults.open_data.animal_base_url),
                shelter_base_url: std::env::var("OPEN_DATA_SHELTER_BASE_URL")
                    .unwrap_or(defaults.open_data.shelter_base_url),
                service_key: parse_env_optional("OPEN_DATA_SERVICE_KEY"),
            },
            geocoding: GeocodingConfig {
                base_url: std::env::var("KAKAO_API_BASE_URL")
                    .unwrap_or(defaults.geocoding.base_url),
                rest_api_key: parse_env_optional("KAKAO_REST_API_KEY"),
            },
            youtube: YoutubeConfig {
                base_url: std::env::var("YOUTUBE_API_BASE_URL")
                    .unwrap_or(defaults.youtube.base_url),
                api_key: parse_env_optional("YOUTUBE_API_KEY"),
                query: std::env::var("YOUTUBE_TRENDING_QUERY").unwrap_or(defaults.youtube.query),
                region_code: std::env::var("YOUTUBE_REGION_CODE")
                    .unwrap_or(defaults.youtube.region_code),
                max_results: parse_env_with_default(
                    "YOUTUBE_MAX_RESULTS",
                    defaults.youtube.max_results,
                ),
            },
            cloudinary: CloudinaryConfig {
                base_url: std::env::var("CLOUDINARY_API_BASE_URL")
                    .unwrap_or(defaults.cloudinary.base_url),
                cloud_name: parse_env_optional("CLOUDINARY_CLOUD_NAME"),
                api_key: parse_env_optional("CLOUDINARY_API_KEY"),
                api_secret: parse_env_optional("CLOUDINARY_API_SECRET"),
                folder: std::env::var("CLOUDINARY_FOLDER").unwrap_or(defaults.cloudinary.folder),
                max_upload_bytes: parse_env_with_default(
                    "CLOUDINARY_MAX_UPLOAD_BYTES",
                    defaults.cloudinary.max_upload_bytes,
                ),
            },
            vector_index: VectorIndexConfig {
                host: parse_env_optional("PINECONE_INDEX_HOST"),
                api_key: parse_env_optional("PINECONE_API_KEY"),
                namespace: parse_env_optional("PINECONE_NAMESPACE"),
                dimension: parse_env_with_default(
                    "PINECONE_DIMENSION",
                    defaults.vector_index.dimension,
                ),
            },
            embedding: EmbeddingConfig {
                model_path: std::env::var("EMBEDDING_MODEL_PATH")
                    .unwrap_or(defaults.embedding.model_path),
                image_size: parse_env_with_default(
                    "EMBEDDING_IMAGE_SIZE",
                    defaults.embedding.image_size,
                ),
                max_image_bytes: parse_env_with_default(
                    "EMBEDDING_MAX_IMAGE_BYTES",
                    defaults.embedding.max_image_bytes,
                ),
            },
            ai_quota: AiQuotaConfig {
                daily_limit: parse_env_with_default(
                    "AI_SEARCH_DAILY_LIMIT",
                    defaults.ai_quota.daily_limit,
                ),
                window_hours: parse_env_with_default(
                    "AI_SEARCH_WINDOW_HOURS",
                    defaults.ai_quota.window_hours,
                ),
            },
            views: ViewConfig {
                min_dwell_ms: parse_env_with_default("VIEW_MIN_DWELL_MS", defaults.views.min_dwell_ms),
            },
            app,
        })
    }
}

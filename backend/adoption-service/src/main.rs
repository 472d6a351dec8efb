use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use adoption_service::db::Repositories;
use adoption_service::handlers;
use adoption_service::metrics::serve_metrics;
use adoption_service::middleware::JwtAuth;
use adoption_service::openapi::ApiDoc;
use adoption_service::{AppState, Config};
use anyhow::Context;
use db_pool::{create_pool, DbConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SERVICE_NAME: &str = "adoption-service";

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness(pool: web::Data<sqlx::PgPool>, state: web::Data<AppState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let pg_result = sqlx::query("SELECT 1").execute(pool.get_ref()).await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);
    let ready = pg_result.is_ok();
    checks.insert(
        "postgresql".to_string(),
        match pg_result {
            Ok(_) => ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "PostgreSQL connection successful".to_string(),
                latency_ms,
            },
            Err(e) => ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms,
            },
        },
    );

    // Informational only: the model loads on first search.
    checks.insert(
        "embedding_model".to_string(),
        ComponentCheck {
            status: ComponentStatus::Healthy,
            message: if state.model.is_loaded() {
                "loaded".to_string()
            } else {
                "not loaded yet".to_string()
            },
            latency_ms: None,
        },
    );

    let body = ReadinessResponse {
        ready,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    if ready {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("failed to load configuration")?;
    tracing::info!(env = %config.app.env, "starting {}", SERVICE_NAME);

    let db_config = DbConfig::from_env(SERVICE_NAME).map_err(anyhow::Error::msg)?;
    let pool = create_pool(db_config)
        .await
        .context("failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("database migrations applied");

    let bind_addr = (config.app.host.clone(), config.app.port);
    let origins = config.cors.origins();
    let state = web::Data::new(AppState::new(config, Repositories::postgres(pool.clone()))?);
    let jwt_validator = state.jwt_validator();
    if jwt_validator.is_none() {
        tracing::warn!("JWT_PUBLIC_KEY_PEM not set; authenticated routes will answer 401");
    }
    let pool = web::Data::new(pool);
    let openapi = ApiDoc::openapi();

    tracing::info!("listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);
        for origin in &origins {
            cors = if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            };
        }

        App::new()
            .app_data(state.clone())
            .app_data(pool.clone())
            .wrap(JwtAuth::new(jwt_validator.clone()))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health))
            .route("/health/ready", web::get().to(readiness))
            .route("/metrics", web::get().to(serve_metrics))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url(ApiDoc::openapi_json_path(), openapi.clone()),
            )
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .shutdown_timeout(30)
    .run()
    .await?;

    Ok(())
}

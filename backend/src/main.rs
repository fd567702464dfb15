//! Inventory Management System - Backend Server
//!
//! Tracks products, categories and suppliers, keeps an append-only stock
//! ledger behind every change to a product's count, and serves reports
//! to administrators.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod repository;
mod routes;
mod services;
mod storage;

pub use config::Config;
use storage::{FileStorage, LocalFileStorage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub storage: Arc<dyn FileStorage>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ims_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Inventory Management Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    services::AuthService::new(db_pool.clone(), &config)
        .ensure_bootstrap_admin(&config.bootstrap)
        .await?;

    let storage = LocalFileStorage::new(&config.storage);
    let image_root = storage.image_root();

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        storage: Arc::new(storage),
    };

    // Build application
    let app = create_app(state).nest_service("/img", ServeDir::new(image_root));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Inventory Management System API v1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use jsonwebtoken::{encode, EncodingKey, Header};
    use shared::access::ADMINISTRATOR;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::{
        BootstrapConfig, DatabaseConfig, JwtConfig, ServerConfig, StorageConfig,
    };
    use crate::services::auth::Claims;

    const SECRET: &str = "router-test-secret";

    fn test_state() -> AppState {
        let config = Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/ims_test".to_string(),
                max_connections: 1,
                min_connections: 0,
            },
            jwt: JwtConfig {
                secret: SECRET.to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 86400,
            },
            storage: StorageConfig {
                upload_dir: std::env::temp_dir().to_string_lossy().to_string(),
                max_upload_bytes: 1024,
            },
            bootstrap: BootstrapConfig::default(),
        };

        // Never connects unless a handler reaches the database
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        AppState {
            db,
            storage: Arc::new(LocalFileStorage::new(&config.storage)),
            config: Arc::new(config),
        }
    }

    fn token(roles: &[&str]) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            name: "tester".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: now + 600,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        create_app(test_state())
            .oneshot(request)
            .await
            .unwrap()
            .status()
    }

    fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        assert_eq!(
            status_of(get_request("/api/v1/products", None)).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(get_request("/api/v1/dashboard", Some("not-a-jwt"))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_rejection_uses_error_envelope() {
        let response = create_app(test_state())
            .oneshot(get_request("/api/v1/categories", None))
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_reports_require_administrator() {
        let clerk = token(&["Clerk"]);
        for uri in [
            "/api/v1/products/report",
            "/api/v1/suppliers/report",
            "/api/v1/stock-levels/report",
            "/api/v1/admin/roles",
            "/api/v1/admin/users",
        ] {
            assert_eq!(
                status_of(get_request(uri, Some(&clerk))).await,
                StatusCode::FORBIDDEN,
                "{}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_supplier_create_requires_administrator() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/suppliers")
            .header(AUTHORIZATION, format!("Bearer {}", token(&["Clerk"])))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Acme"}"#))
            .unwrap();

        assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_claim_is_matched_exactly() {
        let lowercase = token(&[&ADMINISTRATOR.to_lowercase()]);
        assert_eq!(
            status_of(get_request("/api/v1/admin/roles", Some(&lowercase))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_root() {
        assert_eq!(status_of(get_request("/", None)).await, StatusCode::OK);
    }
}

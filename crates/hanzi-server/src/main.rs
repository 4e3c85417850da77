use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod config;
mod models;
mod routes;
mod seed;
#[cfg(test)]
mod testing;

use adapters::{Database, PgCharacterRepository, PgViewHistoryRepository};
use application::LookupService;
use config::Config;
use hanzi::{
    CharacterBackfill, CharacterRepository, LlmProvider, OpenAiProvider, ViewHistoryRepository,
};

/// Lookup service over trait objects, so tests can swap in fakes
pub type AppLookupService =
    LookupService<dyn CharacterRepository, dyn ViewHistoryRepository, dyn LlmProvider>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<AppLookupService>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
    /// Stored characters, `None` when the store is unreachable
    characters: Option<u64>,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthCheck> {
    let characters = match state.lookup.stored_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("Health check could not count characters: {}", e);
            None
        }
    };

    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Hanzi API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        characters,
    })
}

/// Build the router with all routes and middleware
pub fn app(state: AppState) -> Router {
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::word::router())
        .merge(routes::popular::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hanzi_server=info,hanzi=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Hanzi API initializing...");

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::debug!("Configuration: {:?}", config);

    let database = Database::open(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    database
        .migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed");

    let provider = OpenAiProvider::new(config.llm.api_key.clone())
        .with_api_base(&config.llm.api_base)
        .with_model(&config.llm.model)
        .with_timeout(config.backfill.request_timeout)
        .context("Failed to build model client")?;
    tracing::info!(
        "Backfill model: {} via {}",
        config.llm.model,
        config.llm.api_base
    );

    let characters: Arc<dyn CharacterRepository> =
        Arc::new(PgCharacterRepository::new(database.pool().clone()));
    let history: Arc<dyn ViewHistoryRepository> =
        Arc::new(PgViewHistoryRepository::new(database.pool().clone()));
    let provider: Arc<dyn LlmProvider> = Arc::new(provider);
    let lookup = Arc::new(LookupService::new(
        characters,
        history,
        CharacterBackfill::new(provider, Some(config.backfill.clone())),
    ));

    if let Some(path) = &config.seed_file {
        let records = seed::load(path)?;
        let report = lookup
            .seed(&records)
            .await
            .context("Failed to import seed file")?;
        tracing::info!(
            "Imported {}: {} inserted, {} skipped",
            path.display(),
            report.inserted,
            report.skipped
        );
    }

    let router = app(AppState { lookup });

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    tracing::info!("Swagger UI: /swagger-ui");
    tracing::info!("Hanzi API listening on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    database.close().await;
    tracing::info!("Hanzi API stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        app_state, get, record, wo_json, InMemoryCharacterRepository, InMemoryViewHistory,
        StubProvider,
    };
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_health_reports_count() {
        let characters = Arc::new(InMemoryCharacterRepository::with(vec![
            record("我"),
            record("你"),
        ]));
        let router = app(app_state(
            characters,
            Arc::new(InMemoryViewHistory::default()),
            StubProvider::always(wo_json()),
        ));

        let (status, _, body) = get(router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["characters"], 2);
    }

    #[tokio::test]
    async fn test_health_without_store() {
        let characters = Arc::new(InMemoryCharacterRepository::default());
        characters.fail_reads.store(true, Ordering::SeqCst);
        let router = app(app_state(
            characters,
            Arc::new(InMemoryViewHistory::default()),
            StubProvider::always(wo_json()),
        ));

        let (status, _, body) = get(router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["characters"].is_null());
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let router = app(app_state(
            Arc::new(InMemoryCharacterRepository::default()),
            Arc::new(InMemoryViewHistory::default()),
            StubProvider::always(wo_json()),
        ));

        let (status, _, body) = get(router, "/api-docs/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/api/word"));
    }
}

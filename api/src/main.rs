use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod error;
mod groq;
mod middleware;
mod routes;
mod state;
mod store;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SpeakCoach API",
        version = "0.1.0",
        description = "Adaptive English speaking practice: scenario chat, IELTS-style feedback, and a progression engine that plans the next session."
    ),
    paths(
        routes::health::health_check,
        routes::scenarios::list_scenarios,
        routes::profile::get_profile,
        routes::sessions::save_session,
        routes::sessions::recent_sessions,
        routes::sessions::session_stats,
        routes::chat::chat,
        routes::chat::transcribe,
        routes::feedback::feedback,
        routes::agent::next_item,
        routes::agent::complete_item,
        routes::agent::reflect,
        routes::agent::generate_plan,
    ),
    components(schemas(
        speakcoach_core::error::ApiError,
        speakcoach_core::metrics::DialogueTurn,
        speakcoach_core::metrics::ObjectiveMetrics,
        speakcoach_core::profile::MovingAverages,
        speakcoach_core::scores::ScoreSet,
        routes::health::HealthResponse,
        routes::scenarios::Scenario,
        routes::profile::ProfileResponse,
        routes::sessions::SaveSessionRequest,
        routes::sessions::SaveSessionResponse,
        routes::sessions::ProfileSummary,
        routes::sessions::RecentSession,
        routes::sessions::SessionStats,
        routes::chat::ChatRequest,
        routes::chat::ChatResponse,
        routes::feedback::FeedbackRequest,
        routes::feedback::FeedbackResponse,
        routes::agent::NextItemResponse,
        routes::agent::CompleteRequest,
        routes::agent::CompletedItem,
        routes::agent::CompleteResponse,
        routes::agent::ReflectRequest,
        routes::agent::ReflectResponse,
        routes::agent::PlanRequest,
        routes::agent::PlanResponse,
    ))
)]
struct ApiDoc;

async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "message": "English Speaking Practice API",
        "docs": "/swagger-ui"
    }))
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speakcoach_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://speaking.db?mode=rwc".to_string());

    let pool = match SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::warn!(%err, "DATABASE_URL connect failed, falling back to local file");
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect("sqlite://speaking.db?mode=rwc")
                .await
                .expect("Failed to open fallback database")
        }
    };

    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let app_state = state::AppState {
        db: pool,
        groq: groq::GroqClient::from_env(),
        locks: state::UserLocks::default(),
    };

    let cors_layer = middleware::cors::build_cors_layer();

    let api_prefix = std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string());

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .nest(&api_prefix, routes::api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("SpeakCoach API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

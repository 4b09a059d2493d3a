use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use radar_analytics::{CohortClassifier, TweetAggregates, TweetStore};
use radar_common::Config;

mod rest;

pub struct AppState {
    pub aggregates: Arc<dyn TweetAggregates>,
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/sentiment-distribution", get(rest::api_sentiment_distribution))
        .route("/api/tweets-over-time", get(rest::api_tweets_over_time))
        .route("/api/subtopics", get(rest::api_subtopics))
        .route("/api/tweets-per-province", get(rest::api_tweets_per_province))
        .route(
            "/api/sentiment-distribution-bpjs-users",
            get(rest::api_sentiment_distribution_bpjs_users),
        )
        .route(
            "/api/sentiment-distribution-per-subtopic",
            get(rest::api_sentiment_distribution_per_subtopic),
        )
        .with_state(state)
        // CORS: public read-only data, any origin may fetch it
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        // Logging layer: method + path per request
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url).await?;
    let store = TweetStore::new(pool);
    store.migrate().await?;

    // Cohort flags derive from text, so refresh them before serving
    // reads. Idempotent: reruns only touch newly matching tweets.
    let flagged = store.flag_bpjs_users().await?;
    info!(flagged, "BPJS user cohort refreshed");

    let state = Arc::new(AppState {
        aggregates: Arc::new(store),
    });

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("BPJS Radar API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

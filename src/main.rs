use matchstream::{
    adapters::mock::{feed_client::FeedClient as MockFeedClient, publisher::Publisher as MockPublisher},
    adapters::postgres::{PostgresEventStore, PostgresProjectionStore},
    api::{handlers::ApiState, router::create_router},
    application::streaming::{
        DEFAULT_MAX_CONCURRENT_STREAMS, SchedulerConfig, StreamDependencies, run_scheduler,
    },
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchstream=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection URL
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/matchstream".into());

    tracing::info!("Database URL: {}", database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Initialize adapters
    // The feed client and publisher are mock stand-ins until the real
    // HTTP feed adapter and broker client land (external collaborators).
    let event_store = Arc::new(PostgresEventStore::new(pool.clone()));
    let projection_store = Arc::new(PostgresProjectionStore::new(pool.clone()));
    let feed_client = Arc::new(MockFeedClient::new());
    let publisher = Arc::new(MockPublisher::new());

    let deps = Arc::new(StreamDependencies {
        event_store,
        projection_store: projection_store.clone(),
        feed_client,
        publisher,
    });

    // Scheduler configuration from the environment
    let tournament_id =
        std::env::var("TOURNAMENT_ID").unwrap_or_else(|_| "2kwbbcootiqqgmrzs6o5inle5".into());
    let poll_interval = std::env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let max_concurrent_streams = std::env::var("MAX_CONCURRENT_STREAMS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT_STREAMS);

    let config = SchedulerConfig {
        tournament_id,
        poll_interval: Duration::from_secs(poll_interval),
        max_concurrent_streams,
    };

    // Schedule ingestion tasks for the tournament calendar
    let scheduler_deps = Arc::clone(&deps);
    tokio::spawn(async move {
        if let Err(error) = run_scheduler(scheduler_deps, config).await {
            tracing::error!(%error, "scheduler failed");
        }
    });

    // Create application state for the query surface
    let app_state = ApiState { projection_store };

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

use custodia::config::Config;
use custodia::db::{DbConfig, create_pool_with_migrations};
use custodia::user::{ApiState, app};

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load application config from environment variables
    let config = Config::from_env();

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: database={}, jwt_secret={}",
        config.has_database(),
        config.has_jwt_secret()
    );

    let db_config = DbConfig {
        database_url: config.database_url_or_panic().to_string(),
        ..Default::default()
    };
    let pool = create_pool_with_migrations(&db_config).await.unwrap();

    let state = ApiState::new(
        pool,
        config.base_url.clone(),
        config.jwt_secret_or_panic(),
    );
    let app = app(state);

    tracing::info!("listening on http://{}", config.server_addr);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .unwrap();
    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}

use std::sync::Arc;

use anyhow::Result;
use api::{AppState, ServerConfig, create_app, repositories::MongoPostRepository};
use auth::{JwtConfig, JwtService, MongoUserRepository};
use common::database::{DatabaseConfig, health_check, init_database};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Dev Blog API service");

    let server_config = ServerConfig::from_env()?;
    if server_config.is_production() && std::env::var("MONGO_URI").is_err() {
        anyhow::bail!("MONGO_URI must be set when APP_ENV is production");
    }

    // Initialize database connection
    let db_config = DatabaseConfig::from_env()?;
    let database = init_database(&db_config).await?;

    // Check database connectivity
    if health_check(&database).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize repositories
    let user_repository = MongoUserRepository::new(&database);
    user_repository.ensure_indexes().await?;
    let post_repository = MongoPostRepository::new(&database);
    post_repository.ensure_indexes().await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let app_state = AppState::new(
        Arc::new(user_repository),
        Arc::new(post_repository),
        jwt_service,
    );

    // Start the web server
    let app = create_app(app_state, &server_config);

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Database module for handling MongoDB connections
//!
//! This module provides connection configuration, client initialization and
//! health checks for the MongoDB document store.

use crate::error::{DatabaseError, DatabaseResult};
use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use std::env;
use tracing::info;

const DEFAULT_URI: &str = "mongodb://localhost:27017/dev-blog";
const DEFAULT_DATABASE: &str = "dev-blog";

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: String,
    /// Name of the database holding the `users` and `posts` collections
    pub database: String,
    /// Maximum number of connections in the driver pool
    pub max_pool_size: u32,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MONGO_URI`: MongoDB connection string (default: "mongodb://localhost:27017/dev-blog")
    /// - `MONGO_DATABASE`: Database name (default: the one named in the URI, else "dev-blog")
    /// - `MONGO_MAX_POOL_SIZE`: Maximum number of pooled connections (default: 10)
    pub fn from_env() -> DatabaseResult<Self> {
        let uri = env::var("MONGO_URI").unwrap_or_else(|_| DEFAULT_URI.to_string());

        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err(DatabaseError::Configuration(format!(
                "Invalid MongoDB URI scheme: {}",
                uri
            )));
        }

        let database = env::var("MONGO_DATABASE")
            .ok()
            .filter(|name| !name.is_empty())
            .or_else(|| database_name_from_uri(&uri))
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let max_pool_size = env::var("MONGO_MAX_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            uri,
            database,
            max_pool_size,
        })
    }
}

/// Extract the default database name from a connection string
///
/// `mongodb://host:27017/dev-blog?retryWrites=true` yields `dev-blog`.
fn database_name_from_uri(uri: &str) -> Option<String> {
    let (_, rest) = uri.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Initialize a MongoDB client and select the configured database
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<Database>` - Handle to the configured database or error
pub async fn init_database(config: &DatabaseConfig) -> DatabaseResult<Database> {
    info!("Initializing MongoDB client for database {}", config.database);

    let mut options = ClientOptions::parse(&config.uri)
        .await
        .map_err(|e| DatabaseError::Configuration(format!("Invalid MongoDB URI: {}", e)))?;
    options.max_pool_size = Some(config.max_pool_size);
    options.app_name = Some("devblog".to_string());

    let client = Client::with_options(options).map_err(DatabaseError::Connection)?;

    Ok(client.database(&config.database))
}

/// Check database connectivity
///
/// # Arguments
///
/// * `database` - MongoDB database handle
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if the server answered the ping
pub async fn health_check(database: &Database) -> DatabaseResult<bool> {
    database
        .run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(DatabaseError::Query)?;

    Ok(true)
}

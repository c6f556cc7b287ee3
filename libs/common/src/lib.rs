//! Common library for the Dev Blog application
//!
//! This crate provides shared functionality used across the services of the
//! Dev Blog application: MongoDB connectivity and the database error type.

pub mod database;
pub mod error;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, init_database, health_check};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let database = init_database(&config).await?;
///     let is_healthy = health_check(&database).await?;
///     println!("Database health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}

//! Integration tests for the MongoDB connectivity helpers
//!
//! These tests need a reachable MongoDB server (see `MONGO_URI`) and are
//! ignored by default. Run them with `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_database};
use mongodb::bson::{Document, doc};

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn test_database_integration() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let database = init_database(&config).await?;

    assert!(health_check(&database).await?, "Database health check failed");

    let collection = database.collection::<Document>("integration_test");
    collection
        .insert_one(doc! { "key": "integration_test_key", "value": 1 }, None)
        .await?;

    let found = collection
        .find_one(doc! { "key": "integration_test_key" }, None)
        .await?;
    assert_eq!(found.and_then(|d| d.get_i32("value").ok()), Some(1));

    collection.drop(None).await?;

    Ok(())
}

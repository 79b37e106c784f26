use log::info;
use mongodb::bson::doc;
use mongodb::{options::ClientOptions, Client, Database};
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const SERVER_SELECTION_TIMEOUT_SECS: u64 = 30;

/// Error type for MongoDB connection setup
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Connect to MongoDB and return the database to use
///
/// The database named in the URI wins over `default_database`.
pub async fn connect(
    url: &str,
    default_database: &str,
    max_pool_size: u32,
) -> Result<Database, MongoError> {
    let mut options = ClientOptions::parse(url).await?;

    options.max_pool_size = Some(max_pool_size);
    options.connect_timeout = Some(Duration::from_secs(CONNECT_TIMEOUT_SECS));
    options.server_selection_timeout = Some(Duration::from_secs(SERVER_SELECTION_TIMEOUT_SECS));
    if options.app_name.is_none() {
        options.app_name = Some(crate::SERVICE_NAME.to_string());
    }

    let database_name =
        options.default_database.clone().unwrap_or_else(|| default_database.to_string());
    let client = Client::with_options(options)?;
    let database = client.database(&database_name);

    // Verify connection with a lightweight ping
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB database '{}'", database_name);
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_malformed_uri() {
        let result = connect("not-a-mongo-uri", "test", 4).await;
        assert!(matches!(result, Err(MongoError::Mongo(_))));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect() {
        let mongo_url = std::env::var("TEST_MONGO_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let result = connect(&mongo_url, "user_directory_test", 4).await;
        assert!(result.is_ok());
    }
}

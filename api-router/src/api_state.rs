use std::sync::Arc;

use common::{error::AppError, storage::db::SurrealDbClient, utils::config::AppConfig};
use tracing::info;

/// Shared, read-only handle passed to every handler. Holds no cached data.
#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
}

impl ApiState {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let surreal_db_client = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                &config.surrealdb_access_key,
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        surreal_db_client.ensure_initialized().await?;
        info!(address = %config.surrealdb_address, "Database client connected");

        Ok(Self::with_db(surreal_db_client))
    }

    pub fn with_db(db: Arc<SurrealDbClient>) -> Self {
        Self { db }
    }
}

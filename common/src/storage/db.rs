use crate::error::AppError;

use super::types::StoredObject;
use std::{collections::HashMap, sync::Arc};
use surrealdb::{
    engine::any::{connect, Any},
    Error, Surreal,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async lock per record key. An entry lives only while someone holds or
/// waits on its lock.
#[derive(Default)]
struct RecordLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    async fn acquire(&self, key: String) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.len()
    }
}

#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
    record_locks: Arc<RecordLocks>,
}

impl SurrealDbClient {
    /// # Initialize a new database client
    ///
    /// # Arguments
    /// * `address` - endpoint, e.g. `ws://localhost:8000`
    /// * `access_key` - token presented to the endpoint before selecting the namespace
    ///
    /// # Returns
    /// * `SurrealDbClient` initialized
    pub async fn new(
        address: &str,
        access_key: &str,
        namespace: &str,
        database: &str,
    ) -> Result<Self, Error> {
        let db = connect(address).await?;

        db.authenticate(access_key.to_owned()).await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(Self::from_client(db))
    }

    fn from_client(client: Surreal<Any>) -> Self {
        SurrealDbClient {
            client,
            record_locks: Arc::new(RecordLocks::default()),
        }
    }

    /// Exclusive access to one record for statements that read and rewrite it,
    /// such as counter increments. Held until the guard is dropped.
    ///
    /// The lock is process-local: it serializes writers sharing this client.
    pub async fn lock_record(&self, table: &str, id: &str) -> OwnedMutexGuard<()> {
        self.record_locks.acquire(format!("{table}:{id}")).await
    }

    /// Defines the `message` table and its fields. Safe to run on every start.
    pub async fn ensure_initialized(&self) -> Result<(), AppError> {
        self.client
            .query(
                "DEFINE TABLE IF NOT EXISTS message SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS name ON TABLE message TYPE string
                    ASSERT string::len($value) > 0 AND string::len($value) <= 100;
                DEFINE FIELD IF NOT EXISTS message ON TABLE message TYPE string
                    ASSERT string::len($value) > 0 AND string::len($value) <= 1000;
                DEFINE FIELD IF NOT EXISTS rating ON TABLE message TYPE int DEFAULT 5
                    ASSERT $value >= 1 AND $value <= 5;
                DEFINE FIELD IF NOT EXISTS upvotes ON TABLE message TYPE int DEFAULT 0
                    ASSERT $value >= 0;
                DEFINE FIELD IF NOT EXISTS downvotes ON TABLE message TYPE int DEFAULT 0
                    ASSERT $value >= 0;
                DEFINE FIELD IF NOT EXISTS created_at ON TABLE message TYPE datetime
                    DEFAULT time::now();
                DEFINE INDEX IF NOT EXISTS idx_message_created ON TABLE message FIELDS created_at;",
            )
            .await?
            .check()?;

        Ok(())
    }

    /// Cheap round trip used by the readiness probe.
    pub async fn is_ready(&self) -> Result<(), Error> {
        self.client.query("RETURN true").await?.check()?;
        Ok(())
    }

    /// Operation to store a object in SurrealDB, requires the struct to implement StoredObject
    ///
    /// # Arguments
    /// * `item` - The item to be stored
    ///
    /// # Returns
    /// * `Result` - Item or Error
    pub async fn store_item<T>(&self, item: T) -> Result<Option<T>, Error>
    where
        T: StoredObject + Send + Sync + 'static,
    {
        self.client
            .create((T::table_name(), item.get_id()))
            .content(item)
            .await
    }

    /// Operation to retrieve a single object by its ID, requires the struct to implement StoredObject
    ///
    /// # Arguments
    /// * `id` - The ID of the item to retrieve
    ///
    /// # Returns
    /// * `Result<Option<T>, Error>` - The found item or Error
    pub async fn get_item<T>(&self, id: &str) -> Result<Option<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select((T::table_name(), id)).await
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(Self::from_client(db))
    }
}

#![allow(clippy::module_name_repetitions)]
use std::{str::FromStr, time::Duration};

use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    storage::db::SurrealDbClient,
    stored_object,
    utils::validation::{validate_message_fields, validate_vote_fields, DEFAULT_RATING},
};

stored_object!(Message, "message", {
    name: String,
    message: String,
    rating: u8,
    upvotes: u64,
    downvotes: u64
});

/// Body of a new board entry as submitted by a client. Every field is optional
/// on the wire so that missing values surface as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

/// The updated record together with the counter that moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub message: Message,
    pub vote_type: VoteType,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Upvote => "upvote",
            VoteType::Downvote => "downvote",
        }
    }

    /// Column incremented by this vote.
    pub fn counter_field(self) -> &'static str {
        match self {
            VoteType::Upvote => "upvotes",
            VoteType::Downvote => "downvotes",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            other => Err(AppError::Validation(vec![format!(
                "Unknown vote type: {other}"
            )])),
        }
    }
}

impl VoteRequest {
    pub fn new(message_id: impl Into<String>, vote_type: VoteType) -> Self {
        Self {
            message_id: Some(message_id.into()),
            vote_type: Some(vote_type.as_str().to_string()),
        }
    }

    /// Returns the target id and the parsed vote, or every rule that failed.
    pub fn validated(&self) -> Result<(&str, VoteType), AppError> {
        let errors = validate_vote_fields(self.message_id.as_deref(), self.vote_type.as_deref());
        let vote_type = self.vote_type.as_deref().map(str::parse::<VoteType>);

        match (self.message_id.as_deref(), vote_type) {
            (Some(message_id), Some(Ok(vote_type))) if errors.is_empty() => {
                Ok((message_id, vote_type))
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

fn is_transaction_conflict(err: &surrealdb::Error) -> bool {
    err.to_string().to_lowercase().contains("conflict")
}

impl Message {
    pub fn new(name: String, message: String, rating: u8) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name,
            message,
            rating,
            upvotes: 0,
            downvotes: 0,
        }
    }

    /// Trims and validates the submission, defaults the rating to 5, and
    /// inserts it with both counters at zero.
    pub async fn create(input: NewMessage, db: &SurrealDbClient) -> Result<Self, AppError> {
        let name = input.name.as_deref().map(str::trim);
        let message = input.message.as_deref().map(str::trim);
        let rating = input.rating.unwrap_or(DEFAULT_RATING);

        let errors = validate_message_fields(name, message, Some(rating));
        let (Some(name), Some(message), Ok(rating)) = (name, message, u8::try_from(rating)) else {
            return Err(AppError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let record = Self::new(name.to_string(), message.to_string(), rating);
        let stored = db.store_item(record).await.inspect_err(|err| {
            error!(error = %err, "Failed to insert message");
        })?;
        let stored = stored.ok_or_else(|| {
            AppError::InternalError("Insert did not return the new message".to_string())
        })?;

        info!(message_id = %stored.id, rating = stored.rating, "Message created");
        Ok(stored)
    }

    /// Every message, newest first. Reads always go to the store.
    pub async fn list_newest_first(db: &SurrealDbClient) -> Result<Vec<Self>, AppError> {
        let messages: Vec<Self> = db
            .client
            .query("SELECT * FROM type::table($table_name) ORDER BY created_at DESC")
            .bind(("table_name", Self::table_name()))
            .await
            .and_then(|mut response| response.take(0))
            .inspect_err(|err| {
                error!(error = %err, "Failed to fetch messages");
            })?;

        Ok(messages)
    }

    /// Adds one to the counter named by the vote and returns the updated record.
    ///
    /// The increment runs in the store (`SET upvotes += 1`) under a per-message
    /// lock on `db`, so concurrent votes through one client are never lost.
    pub async fn vote(request: &VoteRequest, db: &SurrealDbClient) -> Result<VoteOutcome, AppError> {
        let (message_id, vote_type) = request.validated()?;

        let existing: Option<Self> = db.get_item(message_id).await.inspect_err(|err| {
            error!(error = %err, message_id, "Failed to fetch message before voting");
        })?;
        if existing.is_none() {
            return Err(AppError::NotFound(
                "No message found with the provided ID".to_string(),
            ));
        }

        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor(5)
            .max_delay(Duration::from_millis(250))
            .map(jitter)
            .take(8);

        // The store does not serialize concurrent `+=` on one record.
        let _guard = db.lock_record(Self::table_name(), message_id).await;
        let updated = RetryIf::start(
            retry_strategy,
            || Self::increment_counter(db, message_id, vote_type),
            is_transaction_conflict,
        )
        .await
        .inspect_err(|err| {
            error!(error = %err, message_id, %vote_type, "Failed to update vote");
        })?;

        let message = updated.ok_or_else(|| {
            AppError::NotFound("No message found with the provided ID".to_string())
        })?;

        info!(message_id, %vote_type, "Vote recorded");
        Ok(VoteOutcome { message, vote_type })
    }

    async fn increment_counter(
        db: &SurrealDbClient,
        message_id: &str,
        vote_type: VoteType,
    ) -> Result<Option<Self>, surrealdb::Error> {
        let query = format!(
            "UPDATE type::thing($table_name, $id) SET {field} += 1 RETURN AFTER",
            field = vote_type.counter_field()
        );

        db.client
            .query(query)
            .bind(("table_name", Self::table_name()))
            .bind(("id", message_id.to_string()))
            .await?
            .take(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::{
        MESSAGE_REQUIRED, NAME_REQUIRED, RATING_OUT_OF_RANGE, VOTE_TYPE_INVALID,
    };
    use std::sync::Arc;

    async fn setup_db() -> SurrealDbClient {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = SurrealDbClient::memory(namespace, database)
            .await
            .expect("Failed to start in-memory surrealdb");
        db.ensure_initialized()
            .await
            .expect("Failed to initialize schema");
        db
    }

    fn submission(name: &str, message: &str, rating: Option<i64>) -> NewMessage {
        NewMessage {
            name: Some(name.to_string()),
            message: Some(message.to_string()),
            rating,
        }
    }

    #[tokio::test]
    async fn test_create_message() {
        let db = setup_db().await;

        let created = Message::create(submission("Alice", "Great job!", Some(5)), &db)
            .await
            .expect("Failed to create message");

        assert!(!created.id.is_empty());
        assert_eq!(created.name, "Alice");
        assert_eq!(created.message, "Great job!");
        assert_eq!(created.rating, 5);
        assert_eq!(created.upvotes, 0);
        assert_eq!(created.downvotes, 0);

        let retrieved: Option<Message> = db
            .get_item(&created.id)
            .await
            .expect("Failed to retrieve message");
        assert_eq!(retrieved.map(|m| m.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_create_trims_and_defaults_rating() {
        let db = setup_db().await;

        let created = Message::create(submission("  Bob ", "\n hello  ", None), &db)
            .await
            .expect("Failed to create message");

        assert_eq!(created.name, "Bob");
        assert_eq!(created.message, "hello");
        assert_eq!(created.rating, 5);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let db = setup_db().await;

        let result = Message::create(NewMessage::default(), &db).await;
        match result {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors, vec![NAME_REQUIRED, MESSAGE_REQUIRED]);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }

        let result = Message::create(submission("   ", "text", None), &db).await;
        assert!(matches!(result, Err(AppError::Validation(errors)) if errors == vec![NAME_REQUIRED]));
    }

    #[tokio::test]
    async fn test_create_rejects_rating_out_of_range() {
        let db = setup_db().await;

        for rating in [0, 6, -3, 300] {
            let result = Message::create(submission("Alice", "hi", Some(rating)), &db).await;
            assert!(
                matches!(&result, Err(AppError::Validation(errors)) if errors == &vec![RATING_OUT_OF_RANGE]),
                "rating {rating} gave {result:?}"
            );
        }

        let all = Message::list_newest_first(&db).await.expect("list");
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let db = setup_db().await;

        let messages = Message::list_newest_first(&db)
            .await
            .expect("Listing an empty table should succeed");
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = setup_db().await;

        let mut first = Message::new("A".into(), "first".into(), 4);
        first.created_at = Utc::now() - chrono::Duration::seconds(60);
        let second = Message::new("B".into(), "second".into(), 3);

        db.store_item(first.clone()).await.expect("store first");
        db.store_item(second.clone()).await.expect("store second");

        let messages = Message::list_newest_first(&db).await.expect("list");
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn test_upvote_increments_only_upvotes() {
        let db = setup_db().await;
        let created = Message::create(submission("Alice", "Great job!", None), &db)
            .await
            .expect("create");

        let outcome = Message::vote(&VoteRequest::new(&created.id, VoteType::Upvote), &db)
            .await
            .expect("vote");

        assert_eq!(outcome.vote_type, VoteType::Upvote);
        assert_eq!(outcome.message.id, created.id);
        assert_eq!(outcome.message.upvotes, 1);
        assert_eq!(outcome.message.downvotes, 0);
        assert_eq!(outcome.message.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_downvote_increments_only_downvotes() {
        let db = setup_db().await;
        let created = Message::create(submission("Alice", "Great job!", None), &db)
            .await
            .expect("create");

        Message::vote(&VoteRequest::new(&created.id, VoteType::Downvote), &db)
            .await
            .expect("first vote");
        let outcome = Message::vote(&VoteRequest::new(&created.id, VoteType::Downvote), &db)
            .await
            .expect("second vote");

        assert_eq!(outcome.message.upvotes, 0);
        assert_eq!(outcome.message.downvotes, 2);
    }

    #[tokio::test]
    async fn test_vote_on_missing_message() {
        let db = setup_db().await;

        let result = Message::vote(&VoteRequest::new("nonexistent", VoteType::Upvote), &db).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_vote_type_rejected_before_lookup() {
        let db = setup_db().await;

        // The id does not exist either; validation must win over the lookup.
        let request = VoteRequest {
            message_id: Some("nonexistent".to_string()),
            vote_type: Some("sideways".to_string()),
        };
        let result = Message::vote(&request, &db).await;
        assert!(
            matches!(&result, Err(AppError::Validation(errors)) if errors == &vec![VOTE_TYPE_INVALID])
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_upvotes_are_not_lost() {
        let db = Arc::new(setup_db().await);
        let created = Message::create(submission("Alice", "Great job!", None), &db)
            .await
            .expect("create");

        let voters = 64;
        let bursts = 3;
        for burst in 1..=bursts {
            let handles: Vec<_> = (0..voters)
                .map(|_| {
                    let db = Arc::clone(&db);
                    let request = VoteRequest::new(&created.id, VoteType::Upvote);
                    tokio::spawn(async move { Message::vote(&request, &db).await })
                })
                .collect();

            for result in futures::future::join_all(handles).await {
                result.expect("task panicked").expect("vote failed");
            }

            let stored: Message = db
                .get_item(&created.id)
                .await
                .expect("fetch")
                .expect("message exists");
            assert_eq!(stored.upvotes, voters * burst);
            assert_eq!(stored.downvotes, 0);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_mixed_votes_are_not_lost() {
        let db = Arc::new(setup_db().await);
        let created = Message::create(submission("Bob", "Mixed bag", Some(3)), &db)
            .await
            .expect("create");

        let handles: Vec<_> = (0..96u64)
            .map(|i| {
                let db = Arc::clone(&db);
                let vote_type = if i % 3 == 0 {
                    VoteType::Downvote
                } else {
                    VoteType::Upvote
                };
                let request = VoteRequest::new(&created.id, vote_type);
                tokio::spawn(async move { Message::vote(&request, &db).await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result.expect("task panicked").expect("vote failed");
        }

        let stored: Message = db
            .get_item(&created.id)
            .await
            .expect("fetch")
            .expect("message exists");
        assert_eq!(stored.upvotes, 64);
        assert_eq!(stored.downvotes, 32);
    }

    #[test]
    fn test_vote_type_parsing_and_display() {
        assert_eq!("upvote".parse::<VoteType>().ok(), Some(VoteType::Upvote));
        assert_eq!("downvote".parse::<VoteType>().ok(), Some(VoteType::Downvote));
        assert!("UPVOTE".parse::<VoteType>().is_err());
        assert_eq!(VoteType::Downvote.to_string(), "downvote");
        assert_eq!(VoteType::Upvote.counter_field(), "upvotes");
    }

    #[test]
    fn test_vote_request_wire_format() {
        let request = VoteRequest::new("abc", VoteType::Downvote);
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"messageId": "abc", "voteType": "downvote"})
        );
    }
}

use std::time::{Duration, Instant};

use common::storage::types::message::VoteType;
use tracing::{debug, warn};

use super::{form::FeedbackForm, list::FeedbackList};
use crate::api::FeedbackApi;

/// Pause before the confirming refetch after a successful vote.
pub const RECONCILE_DELAY: Duration = Duration::from_millis(500);

/// Form and list bound to one API client.
///
/// After a successful vote the list is refetched once more after
/// [`RECONCILE_DELAY`]. That narrows the window in which local counters
/// disagree with the server but does not guarantee agreement: another client
/// may vote right after the refetch.
#[derive(Debug, Clone)]
pub struct FeedbackBoard {
    api: FeedbackApi,
    pub form: FeedbackForm,
    pub list: FeedbackList,
    reconcile_delay: Duration,
}

impl FeedbackBoard {
    pub fn new(api: FeedbackApi) -> Self {
        Self {
            api,
            form: FeedbackForm::new(),
            list: FeedbackList::new(),
            reconcile_delay: RECONCILE_DELAY,
        }
    }

    #[must_use]
    pub fn with_reconcile_delay(mut self, delay: Duration) -> Self {
        self.reconcile_delay = delay;
        self
    }

    pub fn api(&self) -> &FeedbackApi {
        &self.api
    }

    /// Replaces the list with the server's current state.
    pub async fn refresh(&mut self) {
        self.list.begin_fetch();
        match self.api.get_messages().await {
            Ok(response) => {
                debug!(count = response.data.count, "Messages fetched");
                self.list.reconcile(response.data.messages);
            }
            Err(err) => {
                warn!(error = %err, "Error fetching messages");
                self.list.fetch_failed();
            }
        }
    }

    /// Submits the form and refetches the list when the server accepted it.
    pub async fn submit(&mut self) -> bool {
        let accepted = self.form.submit(&self.api).await;
        if accepted {
            self.refresh().await;
        }
        accepted
    }

    /// Optimistic vote: the counter moves locally first, the request follows,
    /// and the list is refetched on both outcomes.
    pub async fn vote(&mut self, message_id: &str, vote_type: VoteType) -> bool {
        self.list.apply_optimistic_vote(message_id, vote_type);

        match self.api.vote(message_id, vote_type).await {
            Ok(_) => {
                tokio::time::sleep(self.reconcile_delay).await;
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!(error = %err, message_id, %vote_type, "Error voting");
                self.list.revert_optimistic_vote(message_id, vote_type);
                self.refresh().await;
                self.list.vote_failed(Instant::now());
                false
            }
        }
    }
}

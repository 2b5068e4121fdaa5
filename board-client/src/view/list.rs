use std::time::{Duration, Instant};

use common::storage::types::message::{Message, VoteType};

use super::Notice;

pub const LOAD_FAILED: &str = "Failed to load messages. Please try again.";
pub const VOTE_FAILED: &str = "Failed to record vote. Please try again.";
pub const VOTE_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Local projection of the board. Counters may run ahead of the server after
/// an optimistic vote until the next [`FeedbackList::reconcile`].
#[derive(Debug, Clone)]
pub struct FeedbackList {
    messages: Vec<Message>,
    loading: bool,
    error: Option<String>,
    vote_notice: Option<Notice>,
}

impl Default for FeedbackList {
    fn default() -> Self {
        Self::new()
    }
}

fn counter_mut(message: &mut Message, vote_type: VoteType) -> &mut u64 {
    match vote_type {
        VoteType::Upvote => &mut message.upvotes,
        VoteType::Downvote => &mut message.downvotes,
    }
}

impl FeedbackList {
    /// A freshly mounted list is loading until the first fetch settles.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            loading: true,
            error: None,
            vote_notice: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Server state wins: every local counter is replaced by the fetched one.
    pub fn reconcile(&mut self, server: Vec<Message>) {
        self.messages = server;
        self.loading = false;
        self.error = None;
    }

    pub fn fetch_failed(&mut self) {
        self.loading = false;
        self.error = Some(LOAD_FAILED.to_string());
    }

    /// Bumps the named counter of `message_id` before the server confirms.
    /// Returns `false` when the id is not on the board.
    pub fn apply_optimistic_vote(&mut self, message_id: &str, vote_type: VoteType) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                let counter = counter_mut(message, vote_type);
                *counter = counter.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Undoes [`Self::apply_optimistic_vote`] after the request failed.
    pub fn revert_optimistic_vote(&mut self, message_id: &str, vote_type: VoteType) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            let counter = counter_mut(message, vote_type);
            *counter = counter.saturating_sub(1);
        }
    }

    pub fn vote_failed(&mut self, now: Instant) {
        self.vote_notice = Some(Notice::new(VOTE_FAILED, now, VOTE_NOTICE_TTL));
    }

    pub fn visible_vote_notice(&self, now: Instant) -> Option<&str> {
        self.vote_notice
            .as_ref()
            .filter(|notice| notice.is_visible(now))
            .map(|notice| notice.text.as_str())
    }
}

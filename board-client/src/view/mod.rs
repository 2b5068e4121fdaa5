//! Client-side state for the submission form and the message list.
//!
//! State changes are plain methods so they can be exercised without a
//! network; [`board::FeedbackBoard`] wires them to [`crate::FeedbackApi`].

use std::time::{Duration, Instant};

pub mod board;
pub mod form;
pub mod list;
pub mod render;

/// A message that disappears on its own after `ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub shown_at: Instant,
    pub ttl: Duration,
}

impl Notice {
    pub fn new(text: impl Into<String>, shown_at: Instant, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            shown_at,
            ttl,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_expires() {
        let start = Instant::now();
        let notice = Notice::new("saved", start, Duration::from_secs(5));

        assert!(notice.is_visible(start));
        assert!(notice.is_visible(start + Duration::from_millis(4_999)));
        assert!(!notice.is_visible(start + Duration::from_secs(5)));
    }
}

use std::fmt::Write;

use chrono::{DateTime, Utc};
use common::{storage::types::message::Message, utils::validation::RATING_MAX};

use super::list::FeedbackList;

pub fn render_stars(rating: u8) -> String {
    let max = usize::try_from(RATING_MAX).unwrap_or(5);
    let filled = usize::from(rating).min(max);
    format!("{}{}", "⭐".repeat(filled), "☆".repeat(max.saturating_sub(filled)))
}

/// e.g. `May 1, 2024, 10:05 AM`
pub fn format_date(created_at: &DateTime<Utc>) -> String {
    created_at.format("%b %-d, %Y, %I:%M %p").to_string()
}

fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

pub fn render_message(message: &Message) -> String {
    format!(
        "[{initial}] {name} · {date}\n{stars} {rating}/{RATING_MAX}\n{body}\n👍 {up}  👎 {down}",
        initial = initial(&message.name),
        name = message.name,
        date = format_date(&message.created_at),
        stars = render_stars(message.rating),
        rating = message.rating,
        body = message.message,
        up = message.upvotes,
        down = message.downvotes,
    )
}

/// Plain-text view of the list in its current state.
pub fn render_list(list: &FeedbackList) -> String {
    if list.is_loading() {
        return "Community Feedback\nLoading messages...".to_string();
    }
    if let Some(error) = list.error() {
        return format!("Community Feedback\nError loading messages\n{error}");
    }

    let messages = list.messages();
    let mut out = format!("Community Feedback ({})", messages.len());
    if messages.is_empty() {
        out.push_str("\nNo feedback yet\nBe the first to share your thoughts!");
        return out;
    }
    for message in messages {
        let _ = write!(out, "\n\n{}", render_message(message));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_stars() {
        assert_eq!(render_stars(5), "⭐⭐⭐⭐⭐");
        assert_eq!(render_stars(2), "⭐⭐☆☆☆");
        assert_eq!(render_stars(0), "☆☆☆☆☆");
        assert_eq!(render_stars(9), "⭐⭐⭐⭐⭐");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 14, 5, 0).single().expect("valid date");
        assert_eq!(format_date(&date), "May 1, 2024, 02:05 PM");
    }

    #[test]
    fn test_render_states() {
        let mut list = FeedbackList::new();
        assert!(render_list(&list).contains("Loading messages..."));

        list.fetch_failed();
        assert!(render_list(&list).contains("Error loading messages"));

        list.reconcile(Vec::new());
        let empty = render_list(&list);
        assert!(empty.starts_with("Community Feedback (0)"));
        assert!(empty.contains("No feedback yet"));

        let mut message = Message::new("alice".into(), "Great job!".into(), 4);
        message.upvotes = 3;
        list.reconcile(vec![message]);
        let rendered = render_list(&list);
        assert!(rendered.starts_with("Community Feedback (1)"));
        assert!(rendered.contains("[A] alice"));
        assert!(rendered.contains("⭐⭐⭐⭐☆ 4/5"));
        assert!(rendered.contains("👍 3  👎 0"));
    }
}

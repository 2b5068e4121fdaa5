//! Field rules shared by the service, the HTTP layer and the client form.
//!
//! Every rule is checked independently so a single submission can report
//! several problems at once. An empty list means the input is valid.

use crate::storage::types::message::VoteType;

pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MAX_CHARS: usize = 1000;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;
pub const DEFAULT_RATING: i64 = 5;

pub const NAME_REQUIRED: &str = "Name is required";
pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5";
pub const NAME_TOO_LONG: &str = "Name must be at most 100 characters";
pub const MESSAGE_TOO_LONG: &str = "Message must be at most 1000 characters";
pub const MESSAGE_ID_REQUIRED: &str = "Message ID is required";
pub const VOTE_TYPE_REQUIRED: &str = "Vote type is required";
pub const VOTE_TYPE_INVALID: &str = "Vote type must be either \"upvote\" or \"downvote\"";

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn exceeds(value: Option<&str>, max_chars: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max_chars)
}

/// A missing rating is fine here; callers apply [`DEFAULT_RATING`] upstream.
pub fn rating_in_range(rating: i64) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&rating)
}

pub fn validate_message_fields(
    name: Option<&str>,
    message: Option<&str>,
    rating: Option<i64>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if is_blank(name) {
        errors.push(NAME_REQUIRED.to_string());
    }
    if is_blank(message) {
        errors.push(MESSAGE_REQUIRED.to_string());
    }
    if rating.is_some_and(|r| !rating_in_range(r)) {
        errors.push(RATING_OUT_OF_RANGE.to_string());
    }
    if exceeds(name, NAME_MAX_CHARS) {
        errors.push(NAME_TOO_LONG.to_string());
    }
    if exceeds(message, MESSAGE_MAX_CHARS) {
        errors.push(MESSAGE_TOO_LONG.to_string());
    }

    errors
}

pub fn validate_vote_fields(message_id: Option<&str>, vote_type: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();

    if is_blank(message_id) {
        errors.push(MESSAGE_ID_REQUIRED.to_string());
    }
    match vote_type {
        None | Some("") => errors.push(VOTE_TYPE_REQUIRED.to_string()),
        Some(kind) if kind.parse::<VoteType>().is_err() => {
            errors.push(VOTE_TYPE_INVALID.to_string());
        }
        Some(_) => {}
    }

    errors
}

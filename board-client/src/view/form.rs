use std::time::{Duration, Instant};

use common::{
    storage::types::message::NewMessage,
    utils::validation::{
        rating_in_range, MESSAGE_MAX_CHARS, MESSAGE_REQUIRED, MESSAGE_TOO_LONG, NAME_MAX_CHARS,
        NAME_REQUIRED, NAME_TOO_LONG, RATING_OUT_OF_RANGE,
    },
};
use tracing::warn;

use super::Notice;
use crate::{api::FeedbackApi, error::ClientError};

pub const SUCCESS_NOTICE: &str = "Thank you! Your feedback has been submitted successfully.";
pub const SUBMIT_FAILED: &str = "Failed to submit feedback. Please try again.";
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(5);
pub const DEFAULT_DRAFT_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Message,
    Rating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub message: String,
    pub rating: u8,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            name: String::new(),
            message: String::new(),
            rating: DEFAULT_DRAFT_RATING,
        }
    }
}

/// At most one error per field, plus the error of the last submit attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub message: Option<String>,
    pub rating: Option<String>,
    pub submit: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.message.is_none() && self.rating.is_none() && self.submit.is_none()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Message => self.message.as_deref(),
            Field::Rating => self.rating.as_deref(),
        }
    }

    fn clear(&mut self, field: Field) {
        match field {
            Field::Name => self.name = None,
            Field::Message => self.message = None,
            Field::Rating => self.rating = None,
        }
    }
}

fn check_text(value: &str, max_chars: usize, required: &str, too_long: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        Some(required.to_string())
    } else if value.chars().count() > max_chars {
        Some(too_long.to_string())
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    draft: Draft,
    errors: FormErrors,
    submitting: bool,
    notice: Option<Notice>,
}

impl FeedbackForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
        self.errors.clear(Field::Name);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.draft.message = message.into();
        self.errors.clear(Field::Message);
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.draft.rating = rating;
        self.errors.clear(Field::Rating);
    }

    /// Counter shown under the message box, e.g. `12/1000 characters`.
    pub fn character_count(&self) -> String {
        format!(
            "{}/{MESSAGE_MAX_CHARS} characters",
            self.draft.message.chars().count()
        )
    }

    /// Same rules the server applies, reported per field.
    pub fn validate(&self) -> FormErrors {
        FormErrors {
            name: check_text(&self.draft.name, NAME_MAX_CHARS, NAME_REQUIRED, NAME_TOO_LONG),
            message: check_text(
                &self.draft.message,
                MESSAGE_MAX_CHARS,
                MESSAGE_REQUIRED,
                MESSAGE_TOO_LONG,
            ),
            rating: (!rating_in_range(i64::from(self.draft.rating)))
                .then(|| RATING_OUT_OF_RANGE.to_string()),
            submit: None,
        }
    }

    /// Starts a submission. Returns the trimmed payload, or `None` when local
    /// validation failed and the errors were stored instead.
    pub fn begin_submit(&mut self) -> Option<NewMessage> {
        self.notice = None;

        let errors = self.validate();
        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }

        self.errors = FormErrors::default();
        self.submitting = true;
        Some(NewMessage {
            name: Some(self.draft.name.trim().to_string()),
            message: Some(self.draft.message.trim().to_string()),
            rating: Some(i64::from(self.draft.rating)),
        })
    }

    /// Applies the server's answer. Returns `true` when the list should refetch.
    pub fn finish_submit<T>(&mut self, result: Result<T, ClientError>, now: Instant) -> bool {
        self.submitting = false;
        match result {
            Ok(_) => {
                self.draft = Draft::default();
                self.notice = Some(Notice::new(SUCCESS_NOTICE, now, SUCCESS_NOTICE_TTL));
                true
            }
            Err(err) => {
                warn!(error = %err, "Error submitting feedback");
                self.errors.submit = Some(SUBMIT_FAILED.to_string());
                false
            }
        }
    }

    pub async fn submit(&mut self, api: &FeedbackApi) -> bool {
        let Some(payload) = self.begin_submit() else {
            return false;
        };
        let result = api.create_message(&payload).await;
        self.finish_submit(result, Instant::now())
    }

    pub fn visible_notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible(now))
            .map(|notice| notice.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> FeedbackForm {
        let mut form = FeedbackForm::new();
        form.set_name("  Alice ");
        form.set_message("Great job!");
        form.set_rating(4);
        form
    }

    #[test]
    fn test_new_form_defaults() {
        let form = FeedbackForm::new();
        assert_eq!(form.draft(), &Draft::default());
        assert_eq!(form.draft().rating, 5);
        assert_eq!(form.character_count(), "0/1000 characters");
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_empty_form_reports_per_field_errors() {
        let mut form = FeedbackForm::new();
        form.set_rating(0);

        assert!(form.begin_submit().is_none());
        assert_eq!(form.errors().get(Field::Name), Some(NAME_REQUIRED));
        assert_eq!(form.errors().get(Field::Message), Some(MESSAGE_REQUIRED));
        assert_eq!(form.errors().get(Field::Rating), Some(RATING_OUT_OF_RANGE));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_editing_clears_that_fields_error() {
        let mut form = FeedbackForm::new();
        assert!(form.begin_submit().is_none());

        form.set_name("Bob");
        assert_eq!(form.errors().get(Field::Name), None);
        assert_eq!(form.errors().get(Field::Message), Some(MESSAGE_REQUIRED));
    }

    #[test]
    fn test_too_long_fields() {
        let mut form = FeedbackForm::new();
        form.set_name("n".repeat(NAME_MAX_CHARS + 1));
        form.set_message("m".repeat(MESSAGE_MAX_CHARS + 1));

        let errors = form.validate();
        assert_eq!(errors.name.as_deref(), Some(NAME_TOO_LONG));
        assert_eq!(errors.message.as_deref(), Some(MESSAGE_TOO_LONG));
        assert_eq!(form.character_count(), "1001/1000 characters");
    }

    #[test]
    fn test_begin_submit_trims_payload() {
        let mut form = filled_form();

        let payload = form.begin_submit().expect("form is valid");
        assert_eq!(payload.name.as_deref(), Some("Alice"));
        assert_eq!(payload.message.as_deref(), Some("Great job!"));
        assert_eq!(payload.rating, Some(4));
        assert!(form.is_submitting());
    }

    #[test]
    fn test_successful_submit_resets_and_shows_notice() {
        let mut form = filled_form();
        let now = Instant::now();
        form.begin_submit().expect("form is valid");

        let refresh = form.finish_submit(Ok(()), now);

        assert!(refresh);
        assert!(!form.is_submitting());
        assert_eq!(form.draft(), &Draft::default());
        assert_eq!(form.visible_notice(now), Some(SUCCESS_NOTICE));
        assert_eq!(form.visible_notice(now + SUCCESS_NOTICE_TTL), None);
    }

    #[test]
    fn test_failed_submit_keeps_draft() {
        let mut form = filled_form();
        let now = Instant::now();
        form.begin_submit().expect("form is valid");

        let refresh = form.finish_submit::<()>(
            Err(ClientError::Api {
                status: 500,
                message: "Failed to create message".to_string(),
            }),
            now,
        );

        assert!(!refresh);
        assert!(!form.is_submitting());
        assert_eq!(form.draft().name, "  Alice ");
        assert_eq!(form.errors().submit.as_deref(), Some(SUBMIT_FAILED));
        assert_eq!(form.visible_notice(now), None);
    }
}

//! Per-operator session context.
//!
//! Holds what one screen hands to the next: who is logged in, which profile
//! is open, and the last global flag value seen. It is populated on login and
//! on profile selection and cleared on navigation away and on logout.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    directory::PickerView,
    error::{ConsoleError, ConsoleResult},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSession {
    pub id: String,
    pub admin_email: String,
    pub logged_in_at: DateTime<Utc>,
    pub selected_profile: Option<PickerView>,
    pub global_skip_button: Option<bool>,
}

impl ConsoleSession {
    pub fn new(admin_email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            admin_email: admin_email.to_string(),
            logged_in_at: Utc::now(),
            selected_profile: None,
            global_skip_button: None,
        }
    }

    pub fn select_profile(&mut self, profile: PickerView) {
        self.selected_profile = Some(profile);
    }

    pub fn clear_profile(&mut self) -> Option<PickerView> {
        self.selected_profile.take()
    }

    /// Drop the open profile if it is the one at `mobile_number`.
    pub fn forget_picker(&mut self, mobile_number: &str) {
        if self
            .selected_profile
            .as_ref()
            .is_some_and(|view| view.record.mobile_number == mobile_number)
        {
            self.selected_profile = None;
        }
    }
}

/// Check login input before touching the store.
pub fn validate_login(email: &str, password: &str) -> ConsoleResult<()> {
    if email.is_empty() || password.is_empty() {
        return Err(ConsoleError::Validation("Both fields are required.".into()));
    }
    if !looks_like_email(email) {
        return Err(ConsoleError::Validation(
            "Please enter a valid email address.".into(),
        ));
    }
    Ok(())
}

static EMAIL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// `<non-space>@<non-space>.<non-space>` somewhere in the input.
pub fn looks_like_email(input: &str) -> bool {
    match EMAIL.get_or_init(|| Regex::new(r"\S+@\S+\.\S+")) {
        Ok(pattern) => pattern.is_match(input),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::models::PickerRecord,
        metrics::PickerMetrics,
    };

    fn view(mobile: &str) -> PickerView {
        PickerView {
            record: PickerRecord {
                mobile_number: mobile.into(),
                name: "Asha".into(),
                password: "pw".into(),
                organization_id: "7".into(),
                completed_orders: Vec::new(),
                show_skip_button: false,
            },
            metrics: PickerMetrics::default(),
        }
    }

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("ops@example.com"));
        assert!(looks_like_email("a@b.c"));
        assert!(!looks_like_email("ops@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ops@.com"));
        assert!(!looks_like_email("ops@example."));
        assert!(!looks_like_email("plain"));
        assert!(looks_like_email("x y@z.w"));
        assert!(looks_like_email("a@@b.c"));
        assert!(looks_like_email("a@b..c"));
        assert!(looks_like_email("a@.b.c"));
        assert!(!looks_like_email("a @b.c"));
    }

    #[test]
    fn login_input_validation() {
        assert!(matches!(
            validate_login("", "pw"),
            Err(ConsoleError::Validation(msg)) if msg == "Both fields are required."
        ));
        assert!(matches!(
            validate_login("nope", "pw"),
            Err(ConsoleError::Validation(msg)) if msg == "Please enter a valid email address."
        ));
        assert!(validate_login("ops@example.com", "pw").is_ok());
    }

    #[test]
    fn forget_only_clears_matching_profile() {
        let mut session = ConsoleSession::new("ops@example.com");
        session.select_profile(view("555"));

        session.forget_picker("777");
        assert!(session.selected_profile.is_some());

        session.forget_picker("555");
        assert!(session.selected_profile.is_none());
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let a = ConsoleSession::new("ops@example.com");
        let b = ConsoleSession::new("ops@example.com");
        assert_ne!(a.id, b.id);
    }
}

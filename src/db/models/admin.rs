use serde_json::Value;

use crate::db::{models::picker::FIELD_PASSWORD, store::Document};

/// Operator credentials from the `admin` collection, keyed by email.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: Option<String>,
}

impl AdminCredentials {
    pub fn from_document(email: &str, doc: &Document) -> Self {
        Self {
            email: email.to_string(),
            password: doc
                .get(FIELD_PASSWORD)
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password.as_deref() == Some(candidate)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{models::picker::FIELD_SHOW_SKIP_BUTTON, store::Document};

/// Key of the one document in the `settings` collection.
pub const SETTINGS_KEY: &str = "settings";

/// Process-wide settings mirrored onto every picker record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSetting {
    pub show_skip_button: bool,
}

impl GlobalSetting {
    /// Absent document or field reads as `false`.
    pub fn from_document(doc: Option<&Document>) -> Self {
        let show_skip_button = doc
            .and_then(|doc| doc.get(FIELD_SHOW_SKIP_BUTTON))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self { show_skip_button }
    }

    pub fn to_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert(
            FIELD_SHOW_SKIP_BUTTON.into(),
            Value::Bool(self.show_skip_button),
        );
        doc
    }
}

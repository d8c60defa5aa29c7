//! Picker data models.
//!
//! Stored documents in the `users` collection use the field names below;
//! the serialized views handed to callers use camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::store::Document;

pub const FIELD_NAME: &str = "name";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_ORGANIZATION_ID: &str = "organization_id";
pub const FIELD_COMPLETED_ORDERS: &str = "completedOrders";
pub const FIELD_SHOW_SKIP_BUTTON: &str = "showSkipButton";
pub const FIELD_COMPLETION_TIME: &str = "completion_time";

/// One completed order, kept as the stored JSON so fields the console does
/// not interpret survive a re-key untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRecord(Value);

impl OrderRecord {
    pub fn new(completion_time: &str) -> Self {
        let mut order = Document::new();
        order.insert(
            FIELD_COMPLETION_TIME.into(),
            Value::String(completion_time.to_string()),
        );
        Self(Value::Object(order))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// The raw completion time, if the order carries one as a string.
    pub fn completion_time(&self) -> Option<&str> {
        self.0.get(FIELD_COMPLETION_TIME)?.as_str()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A picker as stored, keyed by mobile number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerRecord {
    pub mobile_number: String,
    pub name: String,
    pub password: String,
    pub organization_id: String,
    pub completed_orders: Vec<OrderRecord>,
    pub show_skip_button: bool,
}

impl PickerRecord {
    pub fn fields(&self) -> PickerFields {
        PickerFields {
            name: self.name.clone(),
            password: self.password.clone(),
            organization_id: self.organization_id.clone(),
            completed_orders: self.completed_orders.clone(),
            show_skip_button: self.show_skip_button,
        }
    }
}

/// Everything on a picker record except its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerFields {
    pub name: String,
    pub password: String,
    pub organization_id: String,
    pub completed_orders: Vec<OrderRecord>,
    pub show_skip_button: bool,
}

impl PickerFields {
    /// The stored form, with every field present.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(FIELD_NAME.into(), Value::String(self.name.clone()));
        doc.insert(FIELD_PASSWORD.into(), Value::String(self.password.clone()));
        doc.insert(
            FIELD_ORGANIZATION_ID.into(),
            Value::String(self.organization_id.clone()),
        );
        doc.insert(
            FIELD_COMPLETED_ORDERS.into(),
            Value::Array(
                self.completed_orders
                    .iter()
                    .map(|order| order.as_value().clone())
                    .collect(),
            ),
        );
        doc.insert(
            FIELD_SHOW_SKIP_BUTTON.into(),
            Value::Bool(self.show_skip_button),
        );
        doc
    }
}

/// Input for creating a picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPicker {
    pub mobile_number: String,
    pub name: String,
    pub password: String,
    pub organization_id: String,
}

/// Editable profile fields. Order history, organization and skip flag are
/// carried over from the stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEdit {
    pub mobile_number: String,
    pub name: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_document_uses_stored_field_names() {
        let fields = PickerFields {
            name: "Asha".into(),
            password: "pw".into(),
            organization_id: "42".into(),
            completed_orders: vec![OrderRecord::new("3 minutes")],
            show_skip_button: true,
        };
        let doc = fields.to_document();
        assert_eq!(doc.get("organization_id"), Some(&json!("42")));
        assert_eq!(
            doc.get("completedOrders"),
            Some(&json!([{ "completion_time": "3 minutes" }]))
        );
        assert_eq!(doc.get("showSkipButton"), Some(&json!(true)));
    }

    #[test]
    fn order_keeps_unknown_fields() {
        let raw = json!({ "completion_time": "2 minutes", "orderId": "A-17" });
        let order = OrderRecord::from_value(raw.clone());
        assert_eq!(order.completion_time(), Some("2 minutes"));
        assert_eq!(order.as_value(), &raw);
    }

    #[test]
    fn non_string_completion_time_reads_as_absent() {
        let order = OrderRecord::from_value(json!({ "completion_time": 5 }));
        assert_eq!(order.completion_time(), None);
    }
}

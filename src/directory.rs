//! Picker directory projection.
//!
//! Turns raw `users` documents into display-ready rows. This is the one place
//! missing or null picker fields are defaulted.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db::{
        models::{
            picker::{
                FIELD_COMPLETED_ORDERS, FIELD_NAME, FIELD_ORGANIZATION_ID, FIELD_PASSWORD,
                FIELD_SHOW_SKIP_BUTTON,
            },
            OrderRecord, PickerRecord,
        },
        Collection, Document, DocumentStore,
    },
    error::{ConsoleError, ConsoleResult},
    metrics::{aggregate_with_diagnostics, PickerMetrics},
    utils::remote::bounded,
};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_MOBILE_NUMBER: &str = "Unknown";
pub const DEFAULT_NAME: &str = "Unnamed Picker";
pub const DEFAULT_ORGANIZATION_ID: &str = "N/A";

/// A stored document as listed by the store. `key` is `None` when the
/// listing did not carry one.
#[derive(Debug, Clone, Default)]
pub struct RawDocument {
    pub key: Option<String>,
    pub fields: Document,
}

impl From<(String, Document)> for RawDocument {
    fn from((key, fields): (String, Document)) -> Self {
        Self {
            key: Some(key),
            fields,
        }
    }
}

/// One directory row: the normalized record plus its order metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerView {
    #[serde(flatten)]
    pub record: PickerRecord,
    #[serde(flatten)]
    pub metrics: PickerMetrics,
}

/// Project raw documents in input order.
pub fn project(raw: Vec<RawDocument>) -> Vec<PickerView> {
    raw.into_iter().map(project_one).collect()
}

pub fn project_one(raw: RawDocument) -> PickerView {
    let RawDocument { key, fields } = raw;

    let mobile_number = key
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| DEFAULT_MOBILE_NUMBER.to_string());
    let completed_orders = orders_field(&fields, &mobile_number);

    let aggregation = aggregate_with_diagnostics(&completed_orders);
    if aggregation.malformed_orders > 0 {
        crate::log_warn!(
            "Picker {mobile_number}: {} of {} orders have no usable completion time",
            aggregation.malformed_orders,
            completed_orders.len()
        );
    }

    PickerView {
        record: PickerRecord {
            name: text_field(&fields, FIELD_NAME).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            password: text_field(&fields, FIELD_PASSWORD).unwrap_or_default(),
            organization_id: text_field(&fields, FIELD_ORGANIZATION_ID)
                .unwrap_or_else(|| DEFAULT_ORGANIZATION_ID.to_string()),
            show_skip_button: fields
                .get(FIELD_SHOW_SKIP_BUTTON)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            completed_orders,
            mobile_number,
        },
        metrics: aggregation.metrics,
    }
}

/// Fetch every picker and project the lot.
pub async fn load_directory<S: DocumentStore>(
    store: &S,
    limit: Duration,
) -> ConsoleResult<Vec<PickerView>> {
    let listed = bounded("list users", limit, store.list_all(Collection::Users))
        .await?
        .map_err(|err| ConsoleError::fetch("picker directory", err))?;

    crate::log_debug!("Projecting {} picker documents", listed.len());
    Ok(project(listed.into_iter().map(RawDocument::from).collect()))
}

/// Fetch and project a single picker. A missing record is a fetch error.
pub async fn load_picker<S: DocumentStore>(
    store: &S,
    mobile_number: &str,
    limit: Duration,
) -> ConsoleResult<PickerView> {
    let what = format!("picker {mobile_number}");
    let fields = bounded(
        format!("get users/{mobile_number}"),
        limit,
        store.get(Collection::Users, mobile_number),
    )
    .await?
    .map_err(|err| ConsoleError::fetch(what.clone(), err))?
    .ok_or_else(|| ConsoleError::fetch(what, "no such picker"))?;

    Ok(project_one(RawDocument {
        key: Some(mobile_number.to_string()),
        fields,
    }))
}

/// Strings and numbers read as text; empty strings and anything else are absent.
fn text_field(fields: &Document, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn orders_field(fields: &Document, mobile_number: &str) -> Vec<OrderRecord> {
    match fields.get(FIELD_COMPLETED_ORDERS) {
        Some(Value::Array(orders)) => orders.iter().cloned().map(OrderRecord::from_value).collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            crate::log_warn!(
                "Picker {mobile_number}: completedOrders is not a list, treating as empty"
            );
            Vec::new()
        }
    }
}

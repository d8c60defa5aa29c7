use std::future::Future;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored document: a flat JSON object of named fields.
pub type Document = Map<String, Value>;

/// The collections the console reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Picker records keyed by mobile number.
    Users,
    /// Operator credentials keyed by email.
    Admin,
    /// The single global settings document.
    Settings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Admin => "admin",
            Collection::Settings => "settings",
        }
    }
}

/// How `set` treats fields already on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Drop every existing field, keep only the ones written.
    Replace,
    /// Overwrite the written fields, keep the rest. Creates the document if absent.
    Merge,
}

/// Remote document store the console runs against.
///
/// Every method is a single remote call. Implementations must be cheap to
/// clone so plans can fan out across tasks.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    fn get(
        &self,
        collection: Collection,
        key: &str,
    ) -> impl Future<Output = Result<Option<Document>>> + Send;

    fn set(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
        mode: SetMode,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Merge `fields` into an existing document. Fails if it does not exist.
    fn update(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deleting a missing document succeeds.
    fn delete(&self, collection: Collection, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// All documents in `collection`, ordered by key.
    fn list_all(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<(String, Document)>>> + Send;
}

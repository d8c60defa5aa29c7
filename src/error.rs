use std::fmt;

use crate::db::Collection;

/// A single document address in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRef {
    pub collection: Collection,
    pub key: String,
}

impl DocRef {
    pub fn new(collection: Collection, key: impl Into<String>) -> Self {
        Self {
            collection,
            key: key.into(),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection.as_str(), self.key)
    }
}

fn join_refs(refs: &[DocRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every failure the console core can report.
///
/// Validation failures (`MissingKey`, `Collision`, `Validation`) are raised
/// before any mutating call is issued. I/O failures during a multi-step plan
/// leave completed steps in place; nothing is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// A read from the store failed, or a record the operation needs is absent.
    #[error("failed to fetch {what}: {detail}")]
    Fetch { what: String, detail: String },

    /// A step of a sequential write plan failed.
    #[error("failed to write {target}: {detail}")]
    Write { target: DocRef, detail: String },

    /// The destination key of an identity change is already occupied.
    #[error("mobile number already exists: {key}")]
    Collision { key: String },

    /// A required key field was empty.
    #[error("{field} is missing")]
    MissingKey { field: &'static str },

    /// Some operations of a concurrent plan failed after all retries.
    #[error("{} update(s) failed: {}", .failed.len(), join_refs(.failed))]
    PartialPropagation { failed: Vec<DocRef> },

    /// An order's completion time carries no usable minutes value.
    #[error("unparseable completion time {value:?}")]
    MalformedOrderData { value: String },

    /// A remote call exceeded the configured bound.
    #[error("{op} timed out after {after_ms}ms")]
    Timeout { op: String, after_ms: u64 },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),
}

impl ConsoleError {
    pub fn fetch(what: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Fetch {
            what: what.into(),
            detail: format!("{err:#}"),
        }
    }

    /// Whether the error was raised before any write was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Collision { .. } | Self::MissingKey { .. } | Self::Validation(_)
        )
    }
}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

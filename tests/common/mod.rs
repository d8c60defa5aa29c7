#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{bail, Result};
use picker_console_lib::{
    db::{Collection, Database, Document, DocumentStore, SetMode},
    settings::ConsoleConfig,
};
use serde_json::Value;
use tempfile::TempDir;

pub fn open_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("console.sqlite3")).expect("open database");
    (dir, db)
}

pub fn test_config() -> ConsoleConfig {
    ConsoleConfig {
        request_timeout_ms: 2_000,
        propagation_retries: 2,
        ..ConsoleConfig::default()
    }
}

pub fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("object literal")
}

/// Wraps a real store, failing chosen documents a set number of times and
/// optionally stalling every call.
#[derive(Clone)]
pub struct FlakyStore {
    pub inner: Database,
    failures: Arc<Mutex<HashMap<String, u32>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FlakyStore {
    pub fn new(inner: Database) -> Self {
        Self {
            inner,
            failures: Arc::new(Mutex::new(HashMap::new())),
            delay: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail writes to `collection/key` the next `times` times.
    pub fn fail_writes(&self, collection: Collection, key: &str, times: u32) {
        self.failures
            .lock()
            .unwrap()
            .insert(format!("{}/{key}", collection.as_str()), times);
    }

    pub fn stall_for(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every write issued, as `"<kind> <collection>/<key>"`.
    pub fn writes(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn before_write(&self, kind: &str, collection: Collection, key: &str) -> Result<()> {
        let target = format!("{}/{key}", collection.as_str());
        self.calls.lock().unwrap().push(format!("{kind} {target}"));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let should_fail = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(&target) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            bail!("injected failure for {target}");
        }
        Ok(())
    }
}

impl DocumentStore for FlakyStore {
    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Document>> {
        self.inner.get(collection, key).await
    }

    async fn set(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
        mode: SetMode,
    ) -> Result<()> {
        self.before_write("set", collection, key).await?;
        self.inner.set(collection, key, fields, mode).await
    }

    async fn update(&self, collection: Collection, key: &str, fields: Document) -> Result<()> {
        self.before_write("update", collection, key).await?;
        self.inner.update(collection, key, fields).await
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        self.before_write("delete", collection, key).await?;
        self.inner.delete(collection, key).await
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
        self.inner.list_all(collection).await
    }
}

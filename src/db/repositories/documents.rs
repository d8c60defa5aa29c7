use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{decode_body, encode_body, merge_into, parse_datetime},
    store::{Collection, Document, DocumentStore, SetMode},
};

fn row_to_document(row: &Row) -> Result<(String, Document)> {
    let key: String = row.get("key")?;
    let body: String = row.get("body")?;
    let document = decode_body(&body, &key)?;
    Ok((key, document))
}

fn load_body(
    conn: &rusqlite::Connection,
    collection: Collection,
    key: &str,
) -> Result<Option<Document>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection.as_str(), key],
            |row| row.get(0),
        )
        .optional()?;

    body.map(|raw| decode_body(&raw, key)).transpose()
}

impl Database {
    pub async fn get_document(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<Document>> {
        let key = key.to_string();
        self.execute(move |conn| load_body(conn, collection, &key))
            .await
    }

    pub async fn set_document(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
        mode: SetMode,
    ) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            let now = Utc::now().to_rfc3339();
            let tx = conn.transaction()?;

            let body = match mode {
                SetMode::Replace => fields,
                SetMode::Merge => {
                    let mut existing = load_body(&tx, collection, &key)?.unwrap_or_default();
                    merge_into(&mut existing, fields);
                    existing
                }
            };

            tx.execute(
                "INSERT INTO documents (collection, key, body, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(collection, key) DO UPDATE SET
                     body = excluded.body,
                     updated_at = excluded.updated_at",
                params![collection.as_str(), key, encode_body(&body)?, now],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn update_document(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
    ) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let Some(mut existing) = load_body(&tx, collection, &key)? else {
                bail!("no document {}/{} to update", collection.as_str(), key);
            };
            merge_into(&mut existing, fields);

            tx.execute(
                "UPDATE documents
                 SET body = ?1,
                     updated_at = ?2
                 WHERE collection = ?3 AND key = ?4",
                params![
                    encode_body(&existing)?,
                    Utc::now().to_rfc3339(),
                    collection.as_str(),
                    key,
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn delete_document(&self, collection: Collection, key: &str) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection.as_str(), key],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_documents(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key, body
                 FROM documents
                 WHERE collection = ?1
                 ORDER BY key ASC",
            )?;

            let mut rows = stmt.query(params![collection.as_str()])?;
            let mut documents = Vec::new();
            while let Some(row) = rows.next()? {
                documents.push(row_to_document(row)?);
            }

            Ok(documents)
        })
        .await
    }

    /// When the document was last written, if it exists.
    pub async fn last_modified(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let updated_at: Option<String> = conn
                .query_row(
                    "SELECT updated_at FROM documents WHERE collection = ?1 AND key = ?2",
                    params![collection.as_str(), key],
                    |row| row.get(0),
                )
                .optional()?;

            updated_at
                .map(|raw| parse_datetime(&raw, "updated_at"))
                .transpose()
        })
        .await
    }
}

impl DocumentStore for Database {
    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Document>> {
        self.get_document(collection, key).await
    }

    async fn set(
        &self,
        collection: Collection,
        key: &str,
        fields: Document,
        mode: SetMode,
    ) -> Result<()> {
        self.set_document(collection, key, fields, mode).await
    }

    async fn update(&self, collection: Collection, key: &str, fields: Document) -> Result<()> {
        self.update_document(collection, key, fields).await
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        self.delete_document(collection, key).await
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
        self.list_documents(collection).await
    }
}

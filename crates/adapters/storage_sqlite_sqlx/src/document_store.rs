//! `SQLite` implementation of [`DocumentStore`].
//!
//! Every document is one row of the `documents` table, keyed by
//! `(collection, id)`, with its body stored as JSON text without the native
//! identifier key. Simple top-level equality clauses are pushed down to
//! `json_extract`; the full [`Filter`] is always re-applied in memory, so the
//! result set is exactly what [`Filter::matches`] accepts.

use infratree_app::ports::DocumentStore;
use infratree_domain::document::{Document, NATIVE_ID};
use infratree_domain::error::InfraTreeError;
use infratree_domain::filter::Filter;
use infratree_domain::id::ObjectId;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::error::StorageError;

/// Wrapper for converting database rows into documents, re-inserting the
/// native identifier key.
struct Wrapper(Document);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let body: String = row.try_get("body")?;

        let mut document: Document =
            serde_json::from_str(&body).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        document.insert(NATIVE_ID.to_string(), Value::String(id));

        Ok(Self(document))
    }
}

const INSERT: &str = "INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)";
const SELECT: &str = "SELECT id, body FROM documents WHERE collection = ";
const UPDATE_BODY: &str = "UPDATE documents SET body = ? WHERE collection = ? AND id = ?";
const DELETE_BY_ID: &str = "DELETE FROM documents WHERE collection = ? AND id = ?";

/// `SQLite`-backed document store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Keys safe to inline in a JSON path literal. Inlining (rather than
/// binding) the path lets `SQLite` use the expression indexes.
fn pushable_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn push_clauses(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) {
    for (field, expected) in filter.clauses() {
        if field == NATIVE_ID {
            if let Some(id) = expected.as_str() {
                qb.push(" AND id = ").push_bind(id.to_string());
            }
            continue;
        }
        if !pushable_key(field) {
            continue;
        }
        match expected {
            Value::String(value) => {
                qb.push(format!(" AND json_extract(body, '$.{field}') = "))
                    .push_bind(value.clone());
            }
            Value::Bool(value) => {
                qb.push(format!(" AND json_extract(body, '$.{field}') = "))
                    .push_bind(*value);
            }
            _ => {}
        }
    }
}

/// Every document of `collection` matching `filter`, in insertion order.
async fn select(
    conn: &mut SqliteConnection,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<Document>, StorageError> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT);
    qb.push_bind(collection.to_string());
    push_clauses(&mut qb, filter);
    qb.push(" ORDER BY rowid");

    let rows: Vec<Wrapper> = qb.build_query_as().fetch_all(conn).await?;
    Ok(rows
        .into_iter()
        .map(|w| w.0)
        .filter(|document| filter.matches(document))
        .collect())
}

fn id_of(document: &Document) -> Option<String> {
    document
        .get(NATIVE_ID)
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl DocumentStore for SqliteDocumentStore {
    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<ObjectId, InfraTreeError> {
        document.remove(NATIVE_ID);
        let id = ObjectId::new();
        let body = serde_json::to_string(&document).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(collection)
            .bind(id.to_hex())
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(id)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, InfraTreeError> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::from)?;
        let documents = select(&mut conn, collection, filter).await?;
        Ok(documents.into_iter().next())
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, InfraTreeError> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::from)?;
        Ok(select(&mut conn, collection, filter).await?)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, InfraTreeError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let Some(mut document) = select(&mut tx, collection, filter)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(0);
        };
        let Some(id) = id_of(&document) else {
            return Ok(0);
        };

        for (key, value) in set {
            if key != NATIVE_ID {
                document.insert(key, value);
            }
        }
        document.remove(NATIVE_ID);
        let body = serde_json::to_string(&document).map_err(StorageError::from)?;

        sqlx::query(UPDATE_BODY)
            .bind(body)
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, InfraTreeError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let Some(id) = select(&mut tx, collection, filter)
            .await?
            .first()
            .and_then(id_of)
        else {
            return Ok(0);
        };

        let result = sqlx::query(DELETE_BY_ID)
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(result.rows_affected())
    }
}

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::api::{Backend, BackendError, Query};
use crate::models::{
    Achievement, BlogPost, Certification, ContactMessage, Experience, Project, RecordId, Skill,
};

use super::FetchResult;

/// A model stored as rows of one backend table.
pub trait TableRow: DeserializeOwned + Send + 'static {
    const TABLE: &'static str;
}

impl TableRow for Skill {
    const TABLE: &'static str = "skills";
}

impl TableRow for Project {
    const TABLE: &'static str = "projects";
}

impl TableRow for BlogPost {
    const TABLE: &'static str = "blogs";
}

impl TableRow for Experience {
    const TABLE: &'static str = "experience";
}

impl TableRow for Certification {
    const TABLE: &'static str = "certifications";
}

impl TableRow for Achievement {
    const TABLE: &'static str = "achievements";
}

impl TableRow for ContactMessage {
    const TABLE: &'static str = "contacts";
}

/// Run a backend operation, logging and flattening any failure into
/// `FetchResult::Error`.
pub(crate) async fn execute<R>(
    resource: &str,
    operation: &str,
    fut: impl Future<Output = Result<R, BackendError>>,
) -> FetchResult<R> {
    match fut.await {
        Ok(data) => FetchResult::Data(data),
        Err(e) => {
            error!(resource, operation, error = %e, "Backend operation failed");
            FetchResult::Error(e.to_string())
        }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, BackendError> {
    Ok(serde_json::from_value(Value::Array(rows))?)
}

fn first_row<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Result<T, BackendError> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(what.to_string()))?;
    Ok(serde_json::from_value(row)?)
}

/// Generic CRUD over one backend table, decoding rows into `T`.
///
/// `T = serde_json::Value` gives untyped access to any table.
pub struct TableService<T> {
    backend: Arc<dyn Backend>,
    table: &'static str,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for TableService<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            table: self.table,
            _row: PhantomData,
        }
    }
}

impl<T: TableRow> TableService<T> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_table(backend, T::TABLE)
    }
}

impl<T: DeserializeOwned + Send + 'static> TableService<T> {
    pub fn with_table(backend: Arc<dyn Backend>, table: &'static str) -> Self {
        Self {
            backend,
            table,
            _row: PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub async fn get_all(&self, query: &Query) -> FetchResult<Vec<T>> {
        execute(self.table, "get_all", async {
            let rows = self.backend.select(self.table, query).await?;
            decode_rows(rows)
        })
        .await
    }

    pub async fn get_by_id(&self, id: &RecordId) -> FetchResult<T> {
        execute(self.table, "get_by_id", async {
            let rows = self
                .backend
                .select(self.table, &Query::by_id(&id.to_value()).limit(1))
                .await?;
            first_row(rows, &format!("{} {}", self.table, id))
        })
        .await
    }

    /// First row matching `query`, or a not-found error.
    pub async fn get_one(&self, query: &Query, what: &str) -> FetchResult<T> {
        execute(self.table, "get_one", async {
            let rows = self.backend.select(self.table, &query.clone().limit(1)).await?;
            first_row(rows, what)
        })
        .await
    }

    pub async fn create<B: Serialize + Sync>(&self, record: &B) -> FetchResult<T> {
        execute(self.table, "create", async {
            let row = serde_json::to_value(record)?;
            let rows = self.backend.insert(self.table, row).await?;
            first_row(rows, &format!("inserted {} row", self.table))
        })
        .await
    }

    pub async fn update<B: Serialize + Sync>(&self, id: &RecordId, patch: &B) -> FetchResult<T> {
        execute(self.table, "update", async {
            let patch = serde_json::to_value(patch)?;
            let rows = self
                .backend
                .update(self.table, &Query::by_id(&id.to_value()), patch)
                .await?;
            first_row(rows, &format!("{} {}", self.table, id))
        })
        .await
    }

    pub async fn delete(&self, id: &RecordId) -> FetchResult<()> {
        execute(self.table, "delete", async {
            self.backend
                .delete(self.table, &Query::by_id(&id.to_value()))
                .await
        })
        .await
    }

    /// Hide a row from public listings by clearing its `is_active` flag.
    pub async fn soft_delete(&self, id: &RecordId) -> FetchResult<()> {
        execute(self.table, "soft_delete", async {
            self.backend
                .update(self.table, &Query::by_id(&id.to_value()), json!({ "is_active": false }))
                .await
                .map(|_| ())
        })
        .await
    }
}

//! In-process backend holding tables and buckets in memory.
//!
//! Evaluates the same `Query` shape as the REST backend, assigns numeric ids
//! and `created_at` timestamps on insert, and counts `select` calls so
//! callers can assert how often the remote side was hit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use super::{Backend, BackendError, Query, StoredObject};

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, Vec<(StoredObject, Vec<u8>)>>,
    next_id: i64,
    failure: Option<String>,
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    selects: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a table's rows.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut inner = self.lock();
        let max_id = rows.iter().filter_map(|r| r.get("id").and_then(Value::as_i64)).max();
        if let Some(max_id) = max_id {
            inner.next_id = inner.next_id.max(max_id);
        }
        inner.tables.insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Make every subsequent call fail with a server error carrying `message`.
    pub fn fail_with(&self, message: &str) {
        self.lock().failure = Some(message.to_string());
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Number of `select` calls served so far.
    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(bucket)
            .and_then(|objs| objs.iter().find(|(o, _)| o.name == path))
            .map(|(_, bytes)| bytes.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_failure(inner: &Inner) -> Result<(), BackendError> {
        match &inner.failure {
            Some(message) => Err(BackendError::ServerError(message.clone())),
            None => Ok(()),
        }
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        let inner = self.lock();
        Self::check_failure(&inner)?;
        let rows = inner.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Vec<Value>, BackendError> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        if !row.is_object() {
            return Err(BackendError::Rejected("Row must be a JSON object".into()));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        if let Some(obj) = row.as_object_mut() {
            obj.entry("id").or_insert(json!(id));
            obj.entry("created_at").or_insert(json!(Utc::now().to_rfc3339()));
        }
        inner.tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(vec![row])
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        if !query.has_filters() {
            return Err(BackendError::Rejected("Refusing to update without a filter".into()));
        }
        let mut updated = Vec::new();
        if let Some(rows) = inner.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> Result<(), BackendError> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        let existing = inner.tables.entry(table.to_string()).or_default();
        for row in rows {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            match existing.iter_mut().find(|r| r.get("id") == Some(&id)) {
                Some(current) => merge(current, &row),
                None => existing.push(row),
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        if !query.has_filters() {
            return Err(BackendError::Rejected("Refusing to delete without a filter".into()));
        }
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|r| !query.matches(r));
        }
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, BackendError> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        let objects = inner.objects.entry(bucket.to_string()).or_default();
        if objects.iter().any(|(o, _)| o.name == path) {
            return Err(BackendError::Rejected(format!("The resource already exists: {}", path)));
        }
        let object = StoredObject {
            name: path.to_string(),
            created_at: Some(Utc::now().to_rfc3339()),
        };
        objects.push((object, bytes));
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://storage/v1/object/public/{}/{}", bucket, path)
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let mut inner = self.lock();
        Self::check_failure(&inner)?;
        if let Some(objects) = inner.objects.get_mut(bucket) {
            objects.retain(|(o, _)| !paths.contains(&o.name));
        }
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<StoredObject>, BackendError> {
        let inner = self.lock();
        Self::check_failure(&inner)?;
        let dir = format!("{}/", prefix.trim_end_matches('/'));
        let mut listed: Vec<StoredObject> = inner
            .objects
            .get(bucket)
            .map(|objs| {
                objs.iter()
                    .filter_map(|(o, _)| {
                        o.name.strip_prefix(&dir).map(|name| StoredObject {
                            name: name.to_string(),
                            created_at: o.created_at.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        // Names embed a millisecond timestamp, so they break created_at ties
        listed.sort_by(|a, b| (&b.created_at, &b.name).cmp(&(&a.created_at, &a.name)));
        listed.truncate(limit);
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_ids_after_seed() {
        let backend = MemoryBackend::new();
        backend.seed("projects", vec![json!({"id": 5, "title": "a"})]);
        let inserted = backend.insert("projects", json!({"title": "b"})).await.unwrap();
        assert_eq!(inserted[0]["id"], json!(6));
        assert!(inserted[0]["created_at"].is_string());
        assert_eq!(backend.rows("projects").len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let backend = MemoryBackend::new();
        backend.seed("contacts", vec![json!({"id": 1, "is_read": false})]);
        let updated = backend
            .update("contacts", &Query::by_id(&json!(1)), json!({"is_read": true}))
            .await
            .unwrap();
        assert_eq!(updated[0]["is_read"], json!(true));

        backend.delete("contacts", &Query::by_id(&json!(1))).await.unwrap();
        assert!(backend.rows("contacts").is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = MemoryBackend::new();
        backend.fail_with("connection reset");
        let err = backend.select("skills", &Query::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error: connection reset");
        assert_eq!(backend.select_count(), 1);

        backend.recover();
        assert!(backend.select("skills", &Query::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_strips_prefix() {
        let backend = MemoryBackend::new();
        backend
            .upload("documents", "resumes/resume-1.pdf", vec![1], "application/pdf")
            .await
            .unwrap();
        backend
            .upload("documents", "resumes/resume-2.pdf", vec![2], "application/pdf")
            .await
            .unwrap();
        let listed = backend.list("documents", "resumes", 1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "resume-2.pdf");
    }
}

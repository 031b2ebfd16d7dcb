//! HTTP client for the managed backend (PostgREST tables, object storage, auth).
//!
//! Table rows go through `/rest/v1/<table>`, files through
//! `/storage/v1/object/<bucket>/<path>`, and admin sign-in through
//! `/auth/v1/token`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::auth::SessionData;
use crate::config::Config;

use super::{Backend, BackendError, Query, StoredObject};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cache-Control max-age applied to uploaded objects.
const UPLOAD_CACHE_CONTROL: &str = "3600";

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: String,
}

/// Backend client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Option<String>,
    api_key: String,
    token: Option<Arc<String>>,
}

impl BackendClient {
    /// Create a client. With no base URL every call fails with `NotConfigured`.
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            api_key: api_key.unwrap_or_default(),
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.backend_url.clone(), config.backend_key.clone())
    }

    /// Create a client acting with an admin access token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<Arc<String>>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            token: Some(token.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    fn base(&self) -> Result<&str, BackendError> {
        self.base_url.as_deref().ok_or(BackendError::NotConfigured)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .token
            .as_deref()
            .map(String::as_str)
            .unwrap_or(self.api_key.as_str());
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    fn rest_url(&self, table: &str) -> Result<String, BackendError> {
        Ok(format!("{}/rest/v1/{}", self.base()?, table))
    }

    fn storage_url(&self, suffix: &str) -> Result<String, BackendError> {
        Ok(format!("{}/storage/v1/object/{}", self.base()?, suffix))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::from_status(status, &body))
        }
    }

    async fn send_rows(request: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        let response = Self::check_response(request.send().await?).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }

    /// Sign in an admin user with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionData> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base()?);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(header::ACCEPT, "application/json")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .context("Failed to send sign-in request")?;

        let response = Self::check_response(response).await?;
        let auth: AuthResponse = response.json().await.context("Failed to parse sign-in response")?;

        Ok(SessionData {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            user_id: auth.user.id,
            email: auth.user.email.unwrap_or_else(|| email.to_string()),
            created_at: Utc::now(),
            expires_in: auth.expires_in,
        })
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.rest_url(table)?;
        debug!(table, "GET rows");
        Self::send_rows(self.request(Method::GET, &url).query(&query.to_params())).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, BackendError> {
        let url = self.rest_url(table)?;
        debug!(table, "INSERT row");
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&json!([row]));
        Self::send_rows(request).await
    }

    async fn update(
        &self,
        table: &str,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        if !query.has_filters() {
            return Err(BackendError::Rejected("Refusing to update without a filter".into()));
        }
        let url = self.rest_url(table)?;
        debug!(table, "PATCH rows");
        let request = self
            .request(Method::PATCH, &url)
            .query(&query.to_params())
            .header("Prefer", "return=representation")
            .json(&patch);
        Self::send_rows(request).await
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> Result<(), BackendError> {
        let url = self.rest_url(table)?;
        debug!(table, count = rows.len(), "UPSERT rows");
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows);
        Self::check_response(request.send().await?).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), BackendError> {
        if !query.has_filters() {
            return Err(BackendError::Rejected("Refusing to delete without a filter".into()));
        }
        let url = self.rest_url(table)?;
        debug!(table, "DELETE rows");
        let request = self.request(Method::DELETE, &url).query(&query.to_params());
        Self::check_response(request.send().await?).await?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let url = self.storage_url(&format!("{}/{}", bucket, path))?;
        debug!(bucket, path, size = bytes.len(), "Uploading object");
        let request = self
            .request(Method::POST, &url)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, format!("max-age={}", UPLOAD_CACHE_CONTROL))
            .header("x-upsert", "false")
            .body(bytes);
        let response = Self::check_response(request.send().await?).await?;
        let uploaded: UploadResponse = response.json().await?;
        // Key comes back prefixed with the bucket name
        let prefix = format!("{}/", bucket);
        Ok(uploaded
            .key
            .strip_prefix(&prefix)
            .map(str::to_string)
            .unwrap_or(uploaded.key))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        match self.base_url.as_deref() {
            Some(base) => format!("{}/storage/v1/object/public/{}/{}", base, bucket, path),
            None => format!("/{}/{}", bucket, path),
        }
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let url = self.storage_url(bucket)?;
        debug!(bucket, count = paths.len(), "Removing objects");
        let request = self
            .request(Method::DELETE, &url)
            .json(&json!({ "prefixes": paths }));
        Self::check_response(request.send().await?).await?;
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<StoredObject>, BackendError> {
        let url = self.storage_url(&format!("list/{}", bucket))?;
        let body = json!({
            "prefix": prefix,
            "limit": limit,
            "offset": 0,
            "sortBy": { "column": "created_at", "order": "desc" },
        });
        let response = Self::check_response(self.request(Method::POST, &url).json(&body).send().await?).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_fails_without_network() {
        let client = BackendClient::new(None, None).unwrap();
        assert!(!client.is_configured());
        let err = client.select("projects", &Query::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured));
    }

    #[test]
    fn test_public_url() {
        let client =
            BackendClient::new(Some("https://abc.supabase.co/".into()), Some("key".into())).unwrap();
        assert_eq!(
            client.public_url("images", "projects/1-42.png"),
            "https://abc.supabase.co/storage/v1/object/public/images/projects/1-42.png"
        );
    }

    #[tokio::test]
    async fn test_delete_requires_filter() {
        let client =
            BackendClient::new(Some("http://127.0.0.1:9".into()), Some("key".into())).unwrap();
        let err = client.delete("projects", &Query::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected(_)));
    }
}

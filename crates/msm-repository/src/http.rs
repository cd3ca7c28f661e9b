//! Repository backed by the manager REST API
//!
//! - `GET    /<parent-collection>/<id>/<subresource>` → JSON array of ids
//! - `POST   /<parent-collection>/<id>/<subresource>` with id array body
//! - `DELETE /<parent-collection>/<id>/<subresource>` with id array body

use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, Result};
use crate::path::CollectionPath;
use crate::repository::CollectionRepository;
use async_trait::async_trait;
use msm_collection::{ItemId, ParentId};
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Longest raw body quoted back as a failure reason
const MAX_REASON_LEN: usize = 200;

/// HTTP implementation of [`CollectionRepository`]
#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: String,
    path: CollectionPath,
    id_field: String,
}

impl HttpRepository {
    /// Create repository with its own client
    ///
    /// # Errors
    /// - `RepositoryError::Config` if the configuration is invalid or the
    ///   client cannot be built
    pub fn new(config: &RepositoryConfig, path: CollectionPath) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| RepositoryError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, config, path))
    }

    /// Create repository sharing an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &RepositoryConfig, path: CollectionPath) -> Self {
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            path,
            id_field: config.id_field.clone(),
        }
    }

    /// Collection this repository addresses
    #[inline]
    #[must_use]
    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Full URL for a parent's collection
    #[must_use]
    pub fn url(&self, parent: &ParentId) -> String {
        format!("{}{}", self.base_url, self.path.for_parent(parent))
    }

    async fn send_ids(&self, method: Method, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        let url = self.url(parent);
        tracing::debug!(%method, %url, count = items.len(), "sending bulk request");

        let response = self
            .client
            .request(method.clone(), &url)
            .json(items)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, &body);
        tracing::warn!(%method, %url, status = status.as_u16(), "bulk request rejected: {}", err.reason());
        Err(err)
    }
}

#[async_trait]
impl CollectionRepository for HttpRepository {
    async fn load(&self, parent: &ParentId) -> Result<Vec<ItemId>> {
        let url = self.url(parent);
        tracing::debug!(%url, "loading collection");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = status_error(status, &body);
            tracing::warn!(%url, status = status.as_u16(), "load rejected: {}", err.reason());
            return Err(err);
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| RepositoryError::Decode(format!("invalid JSON from {url}: {e}")))?;
        decode_ids(value, &self.id_field)
    }

    async fn add(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        self.send_ids(Method::POST, parent, items).await
    }

    async fn remove(&self, parent: &ParentId, items: &[ItemId]) -> Result<()> {
        self.send_ids(Method::DELETE, parent, items).await
    }
}

/// Decode a JSON array of ids, or of objects carrying `id_field`
///
/// # Errors
/// - `RepositoryError::Decode` if the value is not an array or an element
///   has no usable id
pub fn decode_ids(value: Value, id_field: &str) -> Result<Vec<ItemId>> {
    let Value::Array(elements) = value else {
        return Err(RepositoryError::Decode(format!(
            "expected an array of ids, got {}",
            kind_of(&value)
        )));
    };

    elements
        .into_iter()
        .map(|element| match element {
            Value::String(s) => Ok(ItemId::new(s)),
            Value::Number(n) => Ok(ItemId::new(n.to_string())),
            Value::Object(mut fields) => match fields.remove(id_field) {
                Some(Value::String(s)) => Ok(ItemId::new(s)),
                Some(Value::Number(n)) => Ok(ItemId::new(n.to_string())),
                _ => Err(RepositoryError::Decode(format!(
                    "object without '{id_field}' field"
                ))),
            },
            other => Err(RepositoryError::Decode(format!(
                "unsupported id element: {}",
                kind_of(&other)
            ))),
        })
        .collect()
}

/// Build the error for a non-success response
fn status_error(status: StatusCode, body: &str) -> RepositoryError {
    RepositoryError::Status {
        status: status.as_u16(),
        reason: failure_reason(status, body),
    }
}

/// Pick the most useful reason string out of an error response
fn failure_reason(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "reason"] {
            if let Some(Value::String(reason)) = fields.get(key) {
                if !reason.is_empty() {
                    return reason.clone();
                }
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(MAX_REASON_LEN).collect();
    }

    status
        .canonical_reason()
        .map_or_else(|| status.as_u16().to_string(), str::to_string)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

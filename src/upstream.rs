// src/upstream.rs
//! Remote data gateway for the upstream webhook endpoints.
//!
//! Every request carries the configured bearer token; a missing token is a
//! startup configuration error, never a silent fallback credential. Non-2xx
//! responses surface as one generic fetch failure per resource and are not
//! retried here. Overlapping in-flight fetches for the same resource are
//! possible; the last response wins (no coalescing, no cancellation).

use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;
use tracing::{error, info};

use crate::config::UpstreamConfig;
use crate::records::RawRecord;

const AUTH_ENDPOINT: &str = "/webhook/auth-webhook";
const JOBS_ENDPOINT: &str = "/webhook/get-job";
const JOBS_CREATE_ENDPOINT: &str = "/webhook/add-update-job";
const JOBS_UPDATE_ENDPOINT: &str = "/webhook/update-job";
const APPLICATIONS_ENDPOINT: &str = "/webhook/get-applications";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Jobs,
    Applicants,
}

impl Resource {
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Jobs => "jobs",
            Resource::Applicants => "applicants",
        }
    }

    fn list_endpoint(&self) -> &'static str {
        match self {
            Resource::Jobs => JOBS_ENDPOINT,
            Resource::Applicants => APPLICATIONS_ENDPOINT,
        }
    }
}

pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            anyhow::bail!(
                "Upstream bearer token is not configured. Set upstream.token in config.yaml \
                 or the HIREFLOW_UPSTREAM_TOKEN environment variable."
            );
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Fetch the full raw list for a resource. An upstream body that is not a
    /// JSON array yields an empty list.
    pub async fn fetch_list(&self, resource: Resource) -> Result<Vec<RawRecord>> {
        let url = format!("{}{}", self.base_url, resource.list_endpoint());
        let body = self
            .request(Method::GET, &url, None)
            .await
            .with_context(|| format!("failed to fetch {}", resource.label()))?;

        Ok(list_from_value(body))
    }

    /// Fetch a single raw record by id, or `None` when upstream answers with
    /// an empty body.
    pub async fn fetch_one(&self, resource: Resource, id: i64) -> Result<Option<RawRecord>> {
        let url = format!("{}{}?id={}", self.base_url, resource.list_endpoint(), id);
        let body = self
            .request(Method::GET, &url, None)
            .await
            .with_context(|| format!("failed to fetch {} {}", resource.label(), id))?;

        Ok(single_from_value(body))
    }

    /// Create or update a record; the payload carries upstream field names.
    /// Only job postings are writable upstream.
    pub async fn mutate(
        &self,
        resource: Resource,
        id: Option<i64>,
        payload: &Value,
    ) -> Result<RawRecord> {
        if resource != Resource::Jobs {
            anyhow::bail!("{} are read-only upstream", resource.label());
        }

        let (method, url) = match id {
            None => (
                Method::POST,
                format!("{}{}", self.base_url, JOBS_CREATE_ENDPOINT),
            ),
            Some(id) => (
                Method::PUT,
                format!("{}{}?id={}", self.base_url, JOBS_UPDATE_ENDPOINT, id),
            ),
        };

        let body = self
            .request(method, &url, Some(payload))
            .await
            .with_context(|| format!("failed to save {}", resource.label()))?;

        Ok(single_from_value(body).unwrap_or_default())
    }

    /// Forward an auth action (login, register, forgot-password,
    /// change-password) to the upstream auth webhook.
    pub async fn auth_action(&self, payload: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, AUTH_ENDPOINT);
        self.request(Method::POST, &url, Some(payload))
            .await
            .context("auth request failed")
    }

    async fn request(&self, method: Method, url: &str, payload: Option<&Value>) -> Result<Value> {
        info!("Upstream {} {}", method, url);

        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(&self.token);

        if let Some(payload) = payload {
            builder = builder.json(payload);
        }

        let response = builder.send().await.context("HTTP request failed")?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Upstream error response ({}): {}", status, error_text);
            anyhow::bail!("upstream returned status {}: {}", status, error_text);
        }

        // Some webhook endpoints answer 200 with an empty body.
        let text = response.text().await.context("Failed to read response body")?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse upstream response: {}", text))
    }
}

/// A list endpoint is expected to answer with a JSON array of objects;
/// anything else degrades to the empty list.
pub fn list_from_value(value: Value) -> Vec<RawRecord> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// A detail endpoint may answer with an object, a one-element array, or an
/// empty body.
pub fn single_from_value(value: Value) -> Option<RawRecord> {
    match value {
        Value::Object(record) => Some(record),
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_array_list_body_degrades_to_empty() {
        assert!(list_from_value(json!({"message": "no results"})).is_empty());
        assert!(list_from_value(json!(null)).is_empty());
        assert!(list_from_value(json!("oops")).is_empty());
    }

    #[test]
    fn list_body_keeps_only_objects() {
        let records = list_from_value(json!([{"ID": 1}, "stray", {"ID": 2}]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("ID"), Some(&json!(1)));
    }

    #[test]
    fn single_body_accepts_object_or_wrapped_array() {
        assert!(single_from_value(json!({"ID": 1})).is_some());
        assert!(single_from_value(json!([{"ID": 1}])).is_some());
        assert!(single_from_value(json!([])).is_none());
        assert!(single_from_value(json!(null)).is_none());
    }

    #[test]
    fn missing_token_is_an_explicit_error() {
        let config = UpstreamConfig {
            base_url: "https://upstream.example".to_string(),
            token: "  ".to_string(),
            timeout_seconds: 30,
        };
        assert!(UpstreamClient::new(&config).is_err());
    }
}

//! Network transport for the conversation API
//!
//! The client speaks to the server through [`Transport`] so the session can
//! be driven by an in-memory server in tests.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// One request against the API, relative to the base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments; a trailing empty segment gives a trailing slash
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::Get, segments)
    }

    pub fn post(segments: &[&str]) -> Self {
        Self::new(Method::Post, segments)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::Delete, segments)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The unencoded path, e.g. `/conversations/new/`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange. Only failure to get any response is an error;
    /// non-success statuses come back as responses.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("Invalid API base URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL '{}' cannot carry a path", base_url));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Network(format!("Cannot build a path on {}", self.base_url)))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request)?;
        tracing::debug!(method = ?request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_preserved() {
        let transport = HttpTransport::new("http://127.0.0.1:8000").unwrap();
        let url = transport
            .url_for(&ApiRequest::post(&["conversations", "new", ""]))
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/conversations/new/");
    }

    #[test]
    fn test_base_path_prefix_kept() {
        let transport = HttpTransport::new("http://example.com/api/").unwrap();
        let url = transport.url_for(&ApiRequest::post(&["chat", ""])).unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/chat/");
    }

    #[test]
    fn test_id_segment_is_encoded() {
        let transport = HttpTransport::new("http://127.0.0.1:8000").unwrap();
        let url = transport
            .url_for(&ApiRequest::delete(&["conversations", "my notes/1.json"]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/conversations/my%20notes%2F1.json"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpTransport::new("not a url").is_err());
    }

    #[test]
    fn test_request_helpers() {
        let request = ApiRequest::get(&["conversations", "history", ""])
            .query("conversation_file", "a.json");
        assert_eq!(request.path(), "/conversations/history/");
        assert_eq!(request.query_value("conversation_file"), Some("a.json"));
        assert_eq!(request.query_value("page"), None);
    }

    #[test]
    fn test_response_status() {
        assert!(ApiResponse::new(200, "{}").is_success());
        assert!(!ApiResponse::new(404, "{}").is_success());
    }
}

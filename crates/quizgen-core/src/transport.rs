use std::fmt;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::QuizResult;

/// A JSON POST about to be sent.
#[derive(Clone)]
pub struct JsonPost {
    pub url: String,
    pub bearer_token: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl JsonPost {
    pub fn new(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Hand-written so the bearer token never ends up in logs.
impl fmt::Debug for JsonPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPost")
            .field("url", &self.url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Status and raw body of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The one network operation both pipelines need.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request. No retries; transport-level failures map to
    /// `QuizError::Network`.
    async fn post_json(&self, request: JsonPost) -> QuizResult<HttpReply>;
}

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: JsonPost) -> QuizResult<HttpReply> {
        let mut builder = self.client.post(&request.url);

        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        // Headers go first: `json` only sets Content-Type when none is present.
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.json(&request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpReply { status, body })
    }
}

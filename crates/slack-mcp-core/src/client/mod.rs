//! Slack Web API client.
//!
//! Every method tags its call as idempotent or side-effecting and routes it
//! through [`crate::retry::execute`]; nothing here retries on its own.

mod canvases;
mod channels;
pub mod http;
mod messages;
mod search;
pub mod types;
mod users;

pub use messages::HistoryQuery;

use crate::config::{SlackConfig, TokenType};
use crate::retry::{self, Failure, FailureContext, Idempotency, RetryConfig, RetryOverrides};
use http::{HttpRequest, Timeouts};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// Page-size ceiling for listings, history, replies and users.
pub const LIST_LIMIT_MAX: u32 = 200;
/// Page-size ceiling for `search.messages` and `files.list`.
pub const SEARCH_LIMIT_MAX: u32 = 100;

pub struct SlackClient {
    config: SlackConfig,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Self {
        Self { config }
    }

    pub fn token_type(&self) -> TokenType {
        self.config.token_type
    }

    /// Messages appear as the user rather than the bot app.
    pub fn is_user_mode(&self) -> bool {
        self.config.token_type == TokenType::User
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: self.config.connect_timeout,
            total: self.config.request_timeout,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.token)
    }

    /// `{api_base_url}/{method}?{query}`.
    fn method_url(&self, method: &str, query: &[(&str, String)]) -> String {
        let base = format!("{}/{}", self.config.api_base_url, method);
        if query.is_empty() {
            return base;
        }
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{base}?{encoded}")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, Failure> {
        let req = HttpRequest::get(self.method_url(method, query));
        self.request_json(req, Idempotency::Idempotent, &self.config.retry)
            .await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, Failure> {
        let url = self.method_url(method, &[]);
        let payload = serde_json::to_vec(body).map_err(|e| {
            Failure::transport(
                format!("failed to encode {method} request: {e}"),
                None,
                FailureContext::for_url(&url),
            )
        })?;
        let req = HttpRequest::post_json(url, payload);
        self.request_json(req, Idempotency::SideEffecting, &self.config.retry)
            .await
    }

    /// One logical API call: send, classify, parse JSON, retry per `config`.
    async fn request_json<T: DeserializeOwned>(
        &self,
        req: HttpRequest,
        idempotency: Idempotency,
        config: &RetryConfig,
    ) -> Result<T, Failure> {
        let req = req.header("Authorization", self.bearer());
        let timeouts = self.timeouts();
        retry::execute(
            |_| {
                let req = req.clone();
                async move {
                    let url = req.url.clone();
                    let resp = http::send(req, timeouts).await?;
                    if let Some(failure) = resp.failure(&url, "Slack API") {
                        return Err(failure);
                    }
                    serde_json::from_slice(&resp.body).map_err(|e| {
                        Failure::transport(
                            format!("invalid JSON from Slack API: {e}"),
                            Some(resp.status),
                            FailureContext::for_url(&url)
                                .with_details(json!({ "url": url, "status": resp.status })),
                        )
                    })
                }
            },
            idempotency,
            config,
        )
        .await
    }

    /// Authenticated GET of a raw body (canvas HTML), retried per `config`.
    async fn download_text(&self, url: &str, config: &RetryConfig) -> Result<String, Failure> {
        let req = HttpRequest::get(url)
            .header("Authorization", self.bearer())
            .follow_redirects();
        let timeouts = self.timeouts();
        retry::execute(
            |_| {
                let req = req.clone();
                async move {
                    let url = req.url.clone();
                    let resp = http::send(req, timeouts).await?;
                    if let Some(failure) = resp.failure(&url, "Slack file download") {
                        return Err(failure);
                    }
                    Ok(String::from_utf8_lossy(&resp.body).into_owned())
                }
            },
            Idempotency::Idempotent,
            config,
        )
        .await
    }

    /// Retry config for one call: client defaults with `overrides` on top.
    pub fn retry_config(&self, overrides: &RetryOverrides) -> RetryConfig {
        self.config.retry.merged(overrides)
    }
}

/// Clamp a caller-supplied page size to what the Slack method accepts.
fn clamp_limit(limit: u32, max: u32) -> String {
    limit.min(max).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SlackClient {
        let mut cfg = SlackConfig::new("xoxb-t", TokenType::Bot, "T1");
        cfg.api_base_url = "http://127.0.0.1:1/api".to_string();
        SlackClient::new(cfg)
    }

    #[test]
    fn method_url_encodes_query() {
        let url = client().method_url(
            "search.messages",
            &[("query", "a b&c".to_string()), ("count", "5".to_string())],
        );
        assert_eq!(url, "http://127.0.0.1:1/api/search.messages?query=a+b%26c&count=5");
    }

    #[test]
    fn method_url_without_query() {
        assert_eq!(
            client().method_url("chat.postMessage", &[]),
            "http://127.0.0.1:1/api/chat.postMessage"
        );
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(500, 200), "200");
        assert_eq!(clamp_limit(10, 200), "10");
    }

    #[test]
    fn overrides_merge_over_client_defaults() {
        let c = client();
        let cfg = c.retry_config(&RetryOverrides {
            max_retries: Some(0),
            ..RetryOverrides::default()
        });
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.base_delay, c.config().retry.base_delay);
    }
}

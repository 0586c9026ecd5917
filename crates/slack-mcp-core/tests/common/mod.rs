#![allow(dead_code)]

pub mod slack_stub;

use slack_mcp_core::client::SlackClient;
use slack_mcp_core::config::{SlackConfig, TokenType};
use slack_mcp_core::retry::RetryConfig;
use std::time::Duration;

/// Bot-token client pointed at `api_url` with millisecond backoff.
pub fn client_for(api_url: &str) -> SlackClient {
    SlackClient::new(config_for(api_url))
}

pub fn config_for(api_url: &str) -> SlackConfig {
    let mut cfg = SlackConfig::new("xoxb-test", TokenType::Bot, "T123");
    cfg.api_base_url = api_url.to_string();
    cfg.connect_timeout = Duration::from_secs(2);
    cfg.request_timeout = Duration::from_secs(5);
    cfg.retry = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(5));
    cfg
}

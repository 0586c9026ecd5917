use crate::retry::RetryConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default Slack Web API endpoint.
pub const SLACK_API_BASE_URL: &str = "https://slack.com/api";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 250,
            max_delay_ms: 5_000,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.max_retries,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// Which kind of Slack token the client authenticates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// `xoxb-`: messages appear from the bot app.
    #[default]
    Bot,
    /// `xoxp-`: messages appear as the user; required for search.
    User,
}

/// Settings loaded from `~/.config/slack-mcp/config.toml`.
///
/// Tokens are deliberately not part of the file; they come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Slack Web API base URL.
    pub api_base_url: String,
    /// Connect timeout in seconds for each HTTP request.
    pub connect_timeout_secs: u64,
    /// Total timeout in seconds for each HTTP request.
    pub request_timeout_secs: u64,
    /// Workspace/team ID; `SLACK_TEAM_ID` overrides it.
    #[serde(default)]
    pub team_id: Option<String>,
    /// Restrict channel listing to these IDs; `SLACK_CHANNEL_IDS` overrides it.
    #[serde(default)]
    pub channel_ids: Vec<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: SLACK_API_BASE_URL.to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            team_id: None,
            channel_ids: Vec::new(),
            retry: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please set SLACK_TEAM_ID environment variable")]
    MissingTeamId,
    #[error("Please set either SLACK_BOT_TOKEN or SLACK_USER_TOKEN environment variable")]
    MissingToken,
}

/// Fully resolved client configuration, passed to `SlackClient::new`.
#[derive(Clone)]
pub struct SlackConfig {
    pub token: String,
    pub token_type: TokenType,
    pub team_id: String,
    /// Empty means "list every accessible channel".
    pub channel_ids: Vec<String>,
    pub api_base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("team_id", &self.team_id)
            .field("channel_ids", &self.channel_ids)
            .field("api_base_url", &self.api_base_url)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl SlackConfig {
    /// Minimal config for a token and team; everything else at defaults.
    pub fn new(token: impl Into<String>, token_type: TokenType, team_id: impl Into<String>) -> Self {
        let app = AppConfig::default();
        Self {
            token: token.into(),
            token_type,
            team_id: team_id.into(),
            channel_ids: Vec::new(),
            api_base_url: app.api_base_url,
            connect_timeout: Duration::from_secs(app.connect_timeout_secs),
            request_timeout: Duration::from_secs(app.request_timeout_secs),
            retry: RetryConfig::default(),
        }
    }

    /// Overlay environment variables on the file config.
    ///
    /// `SLACK_USER_TOKEN` takes precedence over `SLACK_BOT_TOKEN`. `env` is
    /// injected so resolution does not read process state directly.
    pub fn resolve<E>(app: &AppConfig, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let team_id = non_empty("SLACK_TEAM_ID")
            .or_else(|| app.team_id.clone())
            .ok_or(ConfigError::MissingTeamId)?;

        let user_token = non_empty("SLACK_USER_TOKEN");
        let bot_token = non_empty("SLACK_BOT_TOKEN");
        let (token, token_type) = match (user_token, bot_token) {
            (Some(user), bot) => {
                if bot.is_some() {
                    tracing::info!("Both SLACK_USER_TOKEN and SLACK_BOT_TOKEN are set; using user token");
                }
                (user, TokenType::User)
            }
            (None, Some(bot)) => (bot, TokenType::Bot),
            (None, None) => return Err(ConfigError::MissingToken),
        };

        let channel_ids = match non_empty("SLACK_CHANNEL_IDS") {
            Some(raw) => parse_channel_ids(&raw),
            None => app.channel_ids.clone(),
        };

        Ok(Self {
            token,
            token_type,
            team_id,
            channel_ids,
            api_base_url: app.api_base_url.trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(app.connect_timeout_secs),
            request_timeout: Duration::from_secs(app.request_timeout_secs),
            retry: app.retry.clone().unwrap_or_default().to_retry_config(),
        })
    }

    /// `resolve` against the real process environment.
    pub fn from_env(app: &AppConfig) -> Result<Self, ConfigError> {
        Self::resolve(app, |key| std::env::var(key).ok())
    }
}

/// Split a comma-separated channel list, dropping blanks.
pub fn parse_channel_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("slack-mcp")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AppConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &std::path::Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_base_url, SLACK_API_BASE_URL);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(cfg.retry.is_none());
        let retry = RetrySettings::default().to_retry_config();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.base_delay, Duration::from_millis(250));
        assert_eq!(retry.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            api_base_url = "http://127.0.0.1:9000/api"
            connect_timeout_secs = 2
            request_timeout_secs = 5
            team_id = "T123"
            channel_ids = ["C1", "C2"]

            [retry]
            max_retries = 5
            base_delay_ms = 100
            max_delay_ms = 2000
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.team_id.as_deref(), Some("T123"));
        assert_eq!(cfg.channel_ids, vec!["C1", "C2"]);
        let retry = cfg.retry.unwrap();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.base_delay_ms, 100);
    }

    #[test]
    fn load_or_init_writes_defaults_then_reads_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.api_base_url, created.api_base_url);
    }

    #[test]
    fn resolve_requires_team_id() {
        let err = SlackConfig::resolve(&AppConfig::default(), env_of(&[("SLACK_BOT_TOKEN", "xoxb")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingTeamId);
    }

    #[test]
    fn resolve_requires_a_token() {
        let err = SlackConfig::resolve(&AppConfig::default(), env_of(&[("SLACK_TEAM_ID", "T1")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);
    }

    #[test]
    fn user_token_wins_over_bot_token() {
        let cfg = SlackConfig::resolve(
            &AppConfig::default(),
            env_of(&[
                ("SLACK_TEAM_ID", "T1"),
                ("SLACK_BOT_TOKEN", "xoxb-1"),
                ("SLACK_USER_TOKEN", "xoxp-1"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.token, "xoxp-1");
        assert_eq!(cfg.token_type, TokenType::User);
    }

    #[test]
    fn env_channel_ids_override_file() {
        let app = AppConfig {
            team_id: Some("TFILE".into()),
            channel_ids: vec!["CFILE".into()],
            ..AppConfig::default()
        };
        let cfg = SlackConfig::resolve(
            &app,
            env_of(&[("SLACK_BOT_TOKEN", "xoxb-1"), ("SLACK_CHANNEL_IDS", " C1, ,C2 ")]),
        )
        .unwrap();
        assert_eq!(cfg.team_id, "TFILE");
        assert_eq!(cfg.channel_ids, vec!["C1", "C2"]);
        assert_eq!(cfg.token_type, TokenType::Bot);
    }

    #[test]
    fn debug_output_hides_token() {
        let cfg = SlackConfig::new("xoxb-secret", TokenType::Bot, "T1");
        assert!(!format!("{cfg:?}").contains("xoxb-secret"));
    }
}

use super::Transport;
use anyhow::Result;
use slack_mcp_core::client::SlackClient;
use slack_mcp_core::config::{AppConfig, SlackConfig, TokenType};
use slack_mcp_core::mcp::McpServer;
use slack_mcp_core::transport::{run_http, run_stdio};
use std::sync::Arc;

/// Use the given token, or generate one and log it so the operator can connect.
pub fn resolve_auth_token(provided: Option<String>) -> String {
    match provided.filter(|t| !t.is_empty()) {
        Some(token) => {
            tracing::info!("using provided auth token for authorization");
            token
        }
        None => {
            let token = uuid::Uuid::new_v4().to_string();
            tracing::warn!(auth_token = %token, "generated auth token");
            tracing::warn!(header = %format!("Bearer {token}"), "use this token in the Authorization header");
            eprintln!("slack-mcp: generated auth token {token}");
            token
        }
    }
}

/// Resolves once SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("ctrl-c handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "shutting down gracefully"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "shutting down gracefully"),
    }
}

pub async fn run_serve(
    cfg: &AppConfig,
    transport: Transport,
    port: u16,
    auth_token: Option<String>,
) -> Result<()> {
    let slack = SlackConfig::from_env(cfg)?;
    match slack.token_type {
        TokenType::User => tracing::info!("running in USER mode: messages will appear as you"),
        TokenType::Bot => tracing::info!("running in BOT mode: messages will appear as the bot app"),
    }
    let server = McpServer::new(Arc::new(SlackClient::new(slack)));

    match transport {
        Transport::Stdio => {
            tokio::select! {
                res = run_stdio(server) => res?,
                _ = shutdown_signal() => {}
            }
        }
        Transport::Http => run_http(server, port, auth_token, shutdown_signal()).await?,
    }
    Ok(())
}

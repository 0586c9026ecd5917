//! CLI for the Slack MCP server.

mod serve;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use slack_mcp_core::config;

use serve::{resolve_auth_token, run_serve};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    Stdio,
    /// Streamable HTTP on `/mcp`.
    Http,
}

/// Slack MCP server.
#[derive(Debug, Parser)]
#[command(name = "slack-mcp", version)]
#[command(about = "Expose a Slack workspace to MCP clients", long_about = None)]
#[command(after_help = "\
Environment:
  SLACK_BOT_TOKEN     Bot token (xoxb-...); messages appear as the bot app
  SLACK_USER_TOKEN    User token (xoxp-...); messages appear as you, takes precedence
  SLACK_TEAM_ID       Workspace/team ID (required)
  SLACK_CHANNEL_IDS   Optional comma-separated channel IDs to restrict listing
  AUTH_TOKEN          Bearer token for the HTTP transport")]
pub struct Cli {
    /// Transport to serve MCP on.
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Port for the HTTP transport.
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Bearer token required by the HTTP transport. Generated when unset.
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let auth_token = match cli.transport {
            Transport::Http => Some(resolve_auth_token(cli.token)),
            Transport::Stdio => None,
        };
        run_serve(&cfg, cli.transport, cli.port, auth_token).await
    }
}

#[cfg(test)]
mod tests;

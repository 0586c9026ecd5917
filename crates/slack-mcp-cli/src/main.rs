use slack_mcp_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Logs go to a file, or stderr if that fails; stdout belongs to the stdio transport.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    if let Err(err) = Cli::run_from_args().await {
        tracing::error!("{:#}", err);
        eprintln!("slack-mcp error: {:#}", err);
        std::process::exit(1);
    }
}

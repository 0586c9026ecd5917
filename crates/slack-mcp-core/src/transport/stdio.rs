//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Each line is one message. Requests are handled concurrently; responses
//! are funnelled through one writer task so lines never interleave. Stdout
//! carries protocol traffic only.

use crate::mcp::McpServer;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// Serve until `reader` reaches EOF and every in-flight request has answered.
pub async fn serve_lines<R, W>(server: McpServer, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(64);

    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = write_line(&mut writer, &line).await {
                tracing::warn!("stdio write failed: {}", e);
                break;
            }
        }
    });

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let Some(response) = server.handle_message(&line).await else {
                return;
            };
            match serde_json::to_string(&response) {
                Ok(encoded) => {
                    let _ = tx.send(encoded).await;
                }
                Err(e) => tracing::error!("failed to encode response: {}", e),
            }
        });
    }
    tracing::info!("stdin closed");

    // The writer ends once every handler has dropped its sender.
    drop(tx);
    writer_task.await?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Serve MCP on the process's stdin and stdout.
pub async fn run_stdio(server: McpServer) -> Result<()> {
    tracing::info!("serving MCP over stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(server, stdin, tokio::io::stdout()).await
}

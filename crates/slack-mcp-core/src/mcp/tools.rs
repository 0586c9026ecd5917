//! Tool arguments, dispatch to [`SlackClient`], and result enrichment.

use crate::client::types::{CanvasChange, CanvasOperation, Message, SlackFile};
use crate::client::{HistoryQuery, SlackClient};
use crate::retry::Failure;
use chrono::{DateTime, SecondsFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

/// Problems with the call itself, reported as JSON-RPC errors.
/// Slack failures are not in here: they come back as tool payloads.
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

fn default_list_limit() -> u32 {
    100
}

fn default_history_limit() -> u32 {
    50
}

fn default_search_count() -> u32 {
    20
}

fn default_sort() -> String {
    "timestamp".to_string()
}

fn default_sort_dir() -> String {
    "desc".to_string()
}

#[derive(Debug, Deserialize)]
struct PageArgs {
    #[serde(default = "default_list_limit")]
    limit: u32,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageArgs {
    channel_id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ReplyArgs {
    channel_id: String,
    thread_ts: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ReactionArgs {
    channel_id: String,
    timestamp: String,
    reaction: String,
}

#[derive(Debug, Deserialize)]
struct HistoryArgs {
    channel_id: String,
    #[serde(default = "default_history_limit")]
    limit: u32,
    #[serde(default)]
    oldest: Option<String>,
    #[serde(default)]
    latest: Option<String>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    inclusive: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RepliesArgs {
    channel_id: String,
    thread_ts: String,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default = "default_list_limit")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_search_count")]
    count: u32,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default = "default_sort")]
    sort: String,
    #[serde(default = "default_sort_dir")]
    sort_dir: String,
}

#[derive(Debug, Deserialize)]
struct UserProfileArgs {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct CanvasIdArgs {
    canvas_id: String,
}

#[derive(Debug, Deserialize)]
struct EditCanvasArgs {
    canvas_id: String,
    operation: CanvasOperation,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    section_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateCanvasArgs {
    title: String,
    #[serde(default)]
    markdown: Option<String>,
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolCallError> {
    serde_json::from_value(args).map_err(|source| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

/// Slack timestamp (`"1700000000.123456"`) to ISO-8601 UTC with milliseconds.
pub fn ts_to_iso(ts: &str) -> Option<String> {
    let secs: f64 = ts.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    let millis = (secs * 1000.0).floor() as i64;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn unix_to_iso(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Serialize a Slack response and add enrichment keys at the top level.
fn enrich<T: Serialize>(response: &T, extra: Vec<(&str, Value)>) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(response)?;
    if let Value::Object(map) = &mut value {
        for (key, v) in extra {
            map.insert(key.to_string(), v);
        }
    }
    Ok(value)
}

fn message_ts(message: Option<&Message>) -> Option<String> {
    message.and_then(|m| m.ts.clone())
}

fn iso_of(ts: &Option<String>) -> Value {
    ts.as_deref().and_then(ts_to_iso).map_or(Value::Null, Value::from)
}

/// Newest first, as Slack returns history.
fn time_range(messages: &[Message]) -> Value {
    let oldest = message_ts(messages.last());
    let newest = message_ts(messages.first());
    json!({
        "oldest_message_ts": oldest,
        "newest_message_ts": newest,
        "oldest_message_time": iso_of(&oldest),
        "newest_message_time": iso_of(&newest),
    })
}

/// Parent first, then replies oldest to newest.
fn thread_info(messages: &[Message]) -> Value {
    let latest = message_ts(messages.last());
    json!({
        "reply_count": messages.len().saturating_sub(1),
        "parent_ts": message_ts(messages.first()),
        "latest_reply_ts": latest,
        "latest_reply_time": iso_of(&latest),
    })
}

fn canvas_summary(files: &[SlackFile]) -> Value {
    let canvases: Vec<Value> = files
        .iter()
        .map(|f| {
            json!({
                "canvas_id": f.id,
                "title": f.title.as_ref().or(f.name.as_ref()),
                "created": f.created.filter(|c| *c != 0).and_then(unix_to_iso),
                "updated": f.updated.filter(|u| *u != 0).and_then(unix_to_iso),
                "permalink": f.permalink,
            })
        })
        .collect();
    json!({
        "returned_count": files.len(),
        "canvases": canvases,
    })
}

/// Payload returned in place of a result when a tool fails.
pub fn failure_payload(tool: &str, message: &str) -> Value {
    json!({
        "ok": false,
        "error": "tool_execution_failed",
        "message": message,
        "_tool": tool,
    })
}

/// Run one tool. `Err` only for an unknown tool or malformed arguments;
/// anything that goes wrong talking to Slack becomes a failure payload.
pub async fn call_tool(client: &SlackClient, name: &str, arguments: Option<Value>) -> Result<Value, ToolCallError> {
    let args = arguments.unwrap_or_else(|| Value::Object(Map::new()));
    let outcome = match name {
        "slack_list_channels" => {
            let a: PageArgs = parse_args(name, args)?;
            list_channels(client, a).await
        }
        "slack_post_message" => {
            let a: PostMessageArgs = parse_args(name, args)?;
            to_payload(client.post_message(&a.channel_id, &a.text).await)
        }
        "slack_reply_to_thread" => {
            let a: ReplyArgs = parse_args(name, args)?;
            to_payload(client.post_reply(&a.channel_id, &a.thread_ts, &a.text).await)
        }
        "slack_add_reaction" => {
            let a: ReactionArgs = parse_args(name, args)?;
            to_payload(client.add_reaction(&a.channel_id, &a.timestamp, &a.reaction).await)
        }
        "slack_get_channel_history" => {
            let a: HistoryArgs = parse_args(name, args)?;
            channel_history(client, a).await
        }
        "slack_get_thread_replies" => {
            let a: RepliesArgs = parse_args(name, args)?;
            thread_replies(client, a).await
        }
        "slack_search_messages" => {
            let a: SearchArgs = parse_args(name, args)?;
            search_messages(client, a).await
        }
        "slack_get_users" => {
            let a: PageArgs = parse_args(name, args)?;
            to_payload(client.get_users(a.limit, a.cursor.as_deref()).await)
        }
        "slack_get_user_profile" => {
            let a: UserProfileArgs = parse_args(name, args)?;
            to_payload(client.get_user_profile(&a.user_id).await)
        }
        "slack_list_canvases" => {
            let a: PageArgs = parse_args(name, args)?;
            list_canvases(client, a).await
        }
        "slack_read_canvas" => {
            let a: CanvasIdArgs = parse_args(name, args)?;
            to_payload(client.read_canvas(&a.canvas_id).await)
        }
        "slack_edit_canvas" => {
            let a: EditCanvasArgs = parse_args(name, args)?;
            let change = CanvasChange::new(a.operation, a.markdown, a.section_id);
            to_payload(client.edit_canvas(&a.canvas_id, &[change]).await)
        }
        "slack_create_canvas" => {
            let a: CreateCanvasArgs = parse_args(name, args)?;
            to_payload(client.create_canvas(&a.title, a.markdown.as_deref()).await)
        }
        other => return Err(ToolCallError::UnknownTool(other.to_string())),
    };

    Ok(outcome.unwrap_or_else(|err| {
        let kind = err.downcast_ref::<Failure>().map_or("internal", Failure::kind);
        tracing::error!(tool = name, kind, "tool execution failed: {:#}", err);
        failure_payload(name, &err.to_string())
    }))
}

fn to_payload<T: Serialize>(result: Result<T, Failure>) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(result?)?)
}

async fn list_channels(client: &SlackClient, a: PageArgs) -> anyhow::Result<Value> {
    to_payload(client.get_channels(a.limit, a.cursor.as_deref()).await)
}

async fn channel_history(client: &SlackClient, a: HistoryArgs) -> anyhow::Result<Value> {
    let query = HistoryQuery {
        oldest: a.oldest.clone(),
        latest: a.latest.clone(),
        cursor: a.cursor.clone(),
        inclusive: a.inclusive,
    };
    let response = client.get_channel_history(&a.channel_id, a.limit, &query).await?;
    let messages = &response.data.messages;
    let mut extra = vec![(
        "_request_context",
        json!({
            "channel_id": a.channel_id,
            "oldest": a.oldest,
            "latest": a.latest,
            "limit": a.limit,
            "cursor_used": a.cursor,
        }),
    )];
    if !messages.is_empty() {
        extra.push(("_time_range", time_range(messages)));
    }
    Ok(enrich(&response, extra)?)
}

async fn thread_replies(client: &SlackClient, a: RepliesArgs) -> anyhow::Result<Value> {
    let response = client
        .get_thread_replies(&a.channel_id, &a.thread_ts, a.cursor.as_deref(), a.limit)
        .await?;
    let messages = &response.data.messages;
    let mut extra = vec![(
        "_request_context",
        json!({
            "channel_id": a.channel_id,
            "thread_ts": a.thread_ts,
            "thread_time": ts_to_iso(&a.thread_ts),
            "limit": a.limit,
            "cursor_used": a.cursor,
        }),
    )];
    if !messages.is_empty() {
        extra.push(("_thread_info", thread_info(messages)));
    }
    Ok(enrich(&response, extra)?)
}

async fn search_messages(client: &SlackClient, a: SearchArgs) -> anyhow::Result<Value> {
    let response = client
        .search_messages(&a.query, a.count, a.cursor.as_deref(), &a.sort, &a.sort_dir)
        .await?;
    let (total, matches) = match &response.data.messages {
        Some(m) => (m.total.unwrap_or(0), m.matches.as_slice()),
        None => (0, &[][..]),
    };
    let channels: BTreeSet<&str> = matches
        .iter()
        .filter_map(|m| m.channel.as_ref()?.name.as_deref())
        .filter(|n| !n.is_empty())
        .collect();

    let mut summary = json!({
        "total_matches": total,
        "returned_count": matches.len(),
        "channels_in_results": channels,
    });
    if !matches.is_empty() {
        summary["oldest_result_time"] = iso_of(&matches[matches.len() - 1].ts);
        summary["newest_result_time"] = iso_of(&matches[0].ts);
    }

    Ok(enrich(
        &response,
        vec![
            (
                "_request_context",
                json!({
                    "query": a.query,
                    "count": a.count,
                    "sort": a.sort,
                    "sort_dir": a.sort_dir,
                    "cursor_used": a.cursor,
                }),
            ),
            ("_search_summary", summary),
        ],
    )?)
}

async fn list_canvases(client: &SlackClient, a: PageArgs) -> anyhow::Result<Value> {
    let response = client.list_canvases(a.limit, a.cursor.as_deref()).await?;
    let summary = canvas_summary(&response.data.files);
    Ok(enrich(&response, vec![("_summary", summary)])?)
}

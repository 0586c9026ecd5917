//! Declared tools and their input schemas.

use super::protocol::ToolDescriptor;
use serde_json::{json, Value};

const THREAD_TS_HELP: &str = "The timestamp of the parent message in the format '1234567890.123456'. Timestamps in the format without the period can be converted by adding the period such that 6 numbers come after it.";
const CURSOR_HELP: &str = "Pagination cursor from previous response's response_metadata.next_cursor";

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// Every tool the server exposes, in registration order.
pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "slack_list_channels",
            title: "List Slack Channels",
            description: "List public and private channels accessible to the authenticated token, or pre-defined channels in the workspace with pagination. Use this to discover channel IDs before calling slack_get_channel_history. Returns channel id, name, and metadata.",
            input_schema: object(
                json!({
                    "limit": {"type": "number", "default": 100, "description": "Maximum number of channels to return (default 100, max 200)"},
                    "cursor": {"type": "string", "description": "Pagination cursor for next page of results"},
                }),
                &[],
            ),
        },
        ToolDescriptor {
            name: "slack_post_message",
            title: "Post Slack Message",
            description: "Post a new message to a Slack channel or direct message to user. For DMs, use the user's ID (U0123ABC) as the channel_id.",
            input_schema: object(
                json!({
                    "channel_id": {"type": "string", "description": "The ID of the channel or user to post to"},
                    "text": {"type": "string", "description": "The message text to post"},
                }),
                &["channel_id", "text"],
            ),
        },
        ToolDescriptor {
            name: "slack_reply_to_thread",
            title: "Reply to Slack Thread",
            description: "Reply to a specific message thread in Slack",
            input_schema: object(
                json!({
                    "channel_id": {"type": "string", "description": "The ID of the channel containing the thread"},
                    "thread_ts": {"type": "string", "description": THREAD_TS_HELP},
                    "text": {"type": "string", "description": "The reply text"},
                }),
                &["channel_id", "thread_ts", "text"],
            ),
        },
        ToolDescriptor {
            name: "slack_add_reaction",
            title: "Add Slack Reaction",
            description: "Add a reaction emoji to a message",
            input_schema: object(
                json!({
                    "channel_id": {"type": "string", "description": "The ID of the channel containing the message"},
                    "timestamp": {"type": "string", "description": "The timestamp of the message to react to"},
                    "reaction": {"type": "string", "description": "The name of the emoji reaction (without ::)"},
                }),
                &["channel_id", "timestamp", "reaction"],
            ),
        },
        ToolDescriptor {
            name: "slack_get_channel_history",
            title: "Get Slack Channel History",
            description: "Get messages from a channel with optional time range and pagination. Use oldest/latest to jump to specific dates, cursor to paginate through results. Messages with 'reply_count > 0' or 'thread_ts' are thread parents - use slack_get_thread_replies to fetch their replies. User IDs in messages can be resolved via slack_get_users.",
            input_schema: object(
                json!({
                    "channel_id": {"type": "string", "description": "The ID of the channel"},
                    "limit": {"type": "number", "default": 50, "description": "Number of messages to retrieve (default 50, max 200)"},
                    "oldest": {"type": "string", "description": "Unix timestamp (seconds, can be fractional) - only fetch messages AFTER this time"},
                    "latest": {"type": "string", "description": "Unix timestamp (seconds, can be fractional) - only fetch messages BEFORE this time"},
                    "cursor": {"type": "string", "description": CURSOR_HELP},
                    "inclusive": {"type": "boolean", "description": "Include messages with oldest/latest timestamps (default false)"},
                }),
                &["channel_id"],
            ),
        },
        ToolDescriptor {
            name: "slack_get_thread_replies",
            title: "Get Slack Thread Replies",
            description: "Get replies in a message thread with pagination support for long threads. Use this after finding a thread parent in channel history (messages with 'reply_count > 0'). The thread_ts is the 'ts' of the parent message.",
            input_schema: object(
                json!({
                    "channel_id": {"type": "string", "description": "The ID of the channel containing the thread"},
                    "thread_ts": {"type": "string", "description": THREAD_TS_HELP},
                    "cursor": {"type": "string", "description": CURSOR_HELP},
                    "limit": {"type": "number", "default": 100, "description": "Number of replies to retrieve (default 100, max 200)"},
                }),
                &["channel_id", "thread_ts"],
            ),
        },
        ToolDescriptor {
            name: "slack_search_messages",
            title: "Search Slack Messages",
            description: "Search for messages across the workspace using Slack's search syntax. Supports modifiers like 'in:#channel', 'from:@user', 'before:YYYY-MM-DD', 'after:YYYY-MM-DD', 'on:YYYY-MM-DD', 'has:reaction', 'has:pin', 'is:thread'. Example: '\"database migration\" in:#backend after:2026-01-01'. NOTE: This tool ONLY works with user tokens (xoxp-), not bot tokens. If search returns an error or empty results unexpectedly, check the token type.",
            input_schema: object(
                json!({
                    "query": {"type": "string", "description": "Search query with optional Slack search modifiers"},
                    "count": {"type": "number", "default": 20, "description": "Number of results to return (default 20, max 100)"},
                    "cursor": {"type": "string", "description": "Pagination cursor for next page of results (use next_cursor from previous response)"},
                    "sort": {"type": "string", "enum": ["score", "timestamp"], "default": "timestamp", "description": "Sort order: 'score' for relevance, 'timestamp' for recency (default: timestamp)"},
                    "sort_dir": {"type": "string", "enum": ["asc", "desc"], "default": "desc", "description": "Sort direction: 'asc' or 'desc' (default: desc)"},
                }),
                &["query"],
            ),
        },
        ToolDescriptor {
            name: "slack_get_users",
            title: "Get Slack Users",
            description: "Get a list of all users in the workspace with their basic profile information. Use this to resolve user IDs (like 'U0123ABC') from messages to names. Returns id, name, real_name, and basic profile for each user.",
            input_schema: object(
                json!({
                    "cursor": {"type": "string", "description": "Pagination cursor for next page of results"},
                    "limit": {"type": "number", "default": 100, "description": "Maximum number of users to return (default 100, max 200)"},
                }),
                &[],
            ),
        },
        ToolDescriptor {
            name: "slack_get_user_profile",
            title: "Get Slack User Profile",
            description: "Get detailed profile information for a specific user",
            input_schema: object(
                json!({
                    "user_id": {"type": "string", "description": "The ID of the user"},
                }),
                &["user_id"],
            ),
        },
        ToolDescriptor {
            name: "slack_list_canvases",
            title: "List Slack Canvases",
            description: "List canvases accessible to the authenticated token. Returns canvas files with their IDs, titles, and metadata. Use the canvas_id (file ID starting with 'F') with other canvas tools.",
            input_schema: object(
                json!({
                    "limit": {"type": "number", "default": 100, "description": "Maximum number of canvases to return (default 100, max 100)"},
                    "cursor": {"type": "string", "description": "Pagination cursor for next page of results"},
                }),
                &[],
            ),
        },
        ToolDescriptor {
            name: "slack_read_canvas",
            title: "Read Slack Canvas",
            description: "Read the full content of a canvas. Returns the canvas as HTML. The canvas_id is a file ID starting with 'F' (get it from slack_list_canvases or from channel info).",
            input_schema: object(
                json!({
                    "canvas_id": {"type": "string", "description": "The canvas/file ID (starts with 'F', e.g., 'F0123CANVAS')"},
                }),
                &["canvas_id"],
            ),
        },
        ToolDescriptor {
            name: "slack_edit_canvas",
            title: "Edit Slack Canvas",
            description: "Edit a canvas by inserting, replacing, or deleting content. Content uses Slack's markdown format. Mentions use special syntax: channel mention '![](#C123ABC)', user mention '![](@U123ABC)'. Note: Standalone canvases require a paid Slack plan.",
            input_schema: object(
                json!({
                    "canvas_id": {"type": "string", "description": "The canvas/file ID (starts with 'F')"},
                    "operation": {"type": "string", "enum": ["insert_at_start", "insert_at_end", "replace", "delete"], "description": "The edit operation to perform"},
                    "markdown": {"type": "string", "description": "Markdown content for insert/replace operations. Supports headers, lists, checkboxes, etc."},
                    "section_id": {"type": "string", "description": "Target section ID for replace/delete operations. Get section IDs from the canvas structure."},
                }),
                &["canvas_id", "operation"],
            ),
        },
        ToolDescriptor {
            name: "slack_create_canvas",
            title: "Create Slack Canvas",
            description: "Create a new standalone canvas. Note: Standalone canvases require a paid Slack plan. For free plans, use channel canvases instead.",
            input_schema: object(
                json!({
                    "title": {"type": "string", "description": "Title of the new canvas"},
                    "markdown": {"type": "string", "description": "Initial content in Slack markdown format"},
                }),
                &["title"],
            ),
        },
    ]
}

//! Slack Web API response shapes.
//!
//! Only the fields this crate reads are typed; everything else is kept in
//! `extra` so tool output passes Slack's payload through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_private: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchChannel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<SearchChannel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope common to every Web API method: `ok`, optional `error`, then the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelList {
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostedMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `conversations.history` and `conversations.replies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<SearchMessages>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub members: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<ResponseMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<SlackFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SlackFile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type ChannelsListResponse = ApiResponse<ChannelList>;
pub type ChannelInfoResponse = ApiResponse<ChannelInfo>;
pub type PostMessageResponse = ApiResponse<PostedMessage>;
pub type MessagesResponse = ApiResponse<MessageList>;
pub type SearchMessagesResponse = ApiResponse<SearchResults>;
pub type UsersListResponse = ApiResponse<UserList>;
pub type UserProfileResponse = ApiResponse<ProfileInfo>;
pub type FilesListResponse = ApiResponse<FileList>;
pub type FilesInfoResponse = ApiResponse<FileInfo>;
/// Write-style methods (`reactions.add`, `canvases.*`): only the envelope is typed.
pub type WriteResponse = ApiResponse<Map<String, Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasOperation {
    InsertAtStart,
    InsertAtEnd,
    InsertBefore,
    InsertAfter,
    Replace,
    Delete,
}

impl CanvasOperation {
    /// Operations that carry document content.
    pub fn takes_content(self) -> bool {
        matches!(
            self,
            CanvasOperation::InsertAtStart | CanvasOperation::InsertAtEnd | CanvasOperation::Replace
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub markdown: String,
}

impl DocumentContent {
    pub fn markdown(markdown: impl Into<String>) -> Self {
        Self {
            kind: "markdown".to_string(),
            markdown: markdown.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasChange {
    pub operation: CanvasOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_content: Option<DocumentContent>,
}

impl CanvasChange {
    /// Build a change, attaching markdown only to operations that take content.
    pub fn new(operation: CanvasOperation, markdown: Option<String>, section_id: Option<String>) -> Self {
        let document_content = markdown
            .filter(|m| !m.is_empty() && operation.takes_content())
            .map(DocumentContent::markdown);
        Self {
            operation,
            section_id: section_id.filter(|s| !s.is_empty()),
            document_content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasFileSummary {
    pub id: Option<String>,
    pub name: Option<String>,
    pub filetype: Option<String>,
    pub size: Option<u64>,
}

/// Downloaded canvas body plus the metadata it came with.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasContent {
    pub ok: bool,
    pub canvas_id: String,
    pub title: Option<String>,
    pub created: Option<i64>,
    pub updated: Option<i64>,
    pub user: Option<String>,
    pub permalink: Option<String>,
    pub content_html: String,
    #[serde(rename = "_file_info")]
    pub file_info: CanvasFileSummary,
}

/// Outcome of `read_canvas`. Lookup and download problems are reported in-band.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CanvasRead {
    Content(Box<CanvasContent>),
    /// `files.info` itself answered `ok: false`.
    Lookup(FilesInfoResponse),
    Unavailable {
        ok: bool,
        error: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_info: Option<SlackFile>,
    },
}

impl CanvasRead {
    pub fn unavailable(error: &str, message: impl Into<String>, file_info: Option<SlackFile>) -> Self {
        CanvasRead::Unavailable {
            ok: false,
            error: error.to_string(),
            message: message.into(),
            file_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "ok": true,
            "channels": [{"id": "C1", "name": "general", "is_member": true}],
            "response_metadata": {"next_cursor": "abc"},
            "warning": "superfluous_charset"
        });
        let parsed: ChannelsListResponse = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed.data.channels[0].name.as_deref(), Some("general"));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }

    #[test]
    fn search_pagination_and_channel_fields_survive_round_trip() {
        let raw = json!({
            "ok": true,
            "query": "deploy",
            "messages": {
                "matches": [{
                    "ts": "1700000000.000100",
                    "text": "deployed",
                    "channel": {"id": "C1", "name": "backend", "is_private": true, "is_channel": true}
                }],
                "pagination": {"page": 1, "page_count": 3, "total_count": 1},
                "total": 1
            }
        });
        let parsed: SearchMessagesResponse = serde_json::from_value(raw.clone()).unwrap();
        let messages = parsed.data.messages.as_ref().unwrap();
        assert_eq!(messages.extra["pagination"]["page_count"], 3);
        assert_eq!(messages.matches[0].channel.as_ref().unwrap().extra["is_private"], true);
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);
    }

    #[test]
    fn error_envelope_parses_without_payload() {
        let parsed: MessagesResponse =
            serde_json::from_value(json!({"ok": false, "error": "channel_not_found"})).unwrap();
        assert!(!parsed.ok);
        assert_eq!(parsed.error.as_deref(), Some("channel_not_found"));
        assert!(parsed.data.messages.is_empty());
    }

    #[test]
    fn delete_change_drops_markdown() {
        let change = CanvasChange::new(
            CanvasOperation::Delete,
            Some("ignored".into()),
            Some("temp:C:abc".into()),
        );
        assert!(change.document_content.is_none());
        assert_eq!(change.section_id.as_deref(), Some("temp:C:abc"));
    }

    #[test]
    fn canvas_change_serializes_like_slack_expects() {
        let change = CanvasChange {
            operation: CanvasOperation::InsertAtEnd,
            section_id: None,
            document_content: Some(DocumentContent::markdown("# hi")),
        };
        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({"operation": "insert_at_end", "document_content": {"type": "markdown", "markdown": "# hi"}})
        );
    }
}

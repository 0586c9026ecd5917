use super::types::{MessagesResponse, PostMessageResponse, WriteResponse};
use super::{clamp_limit, SlackClient, LIST_LIMIT_MAX};
use crate::retry::Failure;
use serde_json::json;

/// Optional filters for `conversations.history`.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub oldest: Option<String>,
    pub latest: Option<String>,
    pub cursor: Option<String>,
    pub inclusive: Option<bool>,
}

impl SlackClient {
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<PostMessageResponse, Failure> {
        self.post_json("chat.postMessage", &json!({ "channel": channel_id, "text": text }))
            .await
    }

    pub async fn post_reply(
        &self,
        channel_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<PostMessageResponse, Failure> {
        self.post_json(
            "chat.postMessage",
            &json!({ "channel": channel_id, "thread_ts": thread_ts, "text": text }),
        )
        .await
    }

    pub async fn add_reaction(
        &self,
        channel_id: &str,
        timestamp: &str,
        reaction: &str,
    ) -> Result<WriteResponse, Failure> {
        self.post_json(
            "reactions.add",
            &json!({ "channel": channel_id, "timestamp": timestamp, "name": reaction }),
        )
        .await
    }

    pub async fn get_channel_history(
        &self,
        channel_id: &str,
        limit: u32,
        filter: &HistoryQuery,
    ) -> Result<MessagesResponse, Failure> {
        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("limit", clamp_limit(limit, LIST_LIMIT_MAX)),
        ];
        if let Some(oldest) = &filter.oldest {
            query.push(("oldest", oldest.clone()));
        }
        if let Some(latest) = &filter.latest {
            query.push(("latest", latest.clone()));
        }
        if let Some(cursor) = &filter.cursor {
            query.push(("cursor", cursor.clone()));
        }
        if let Some(inclusive) = filter.inclusive {
            query.push(("inclusive", inclusive.to_string()));
        }
        self.get_json("conversations.history", &query).await
    }

    pub async fn get_thread_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<MessagesResponse, Failure> {
        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("ts", thread_ts.to_string()),
            ("limit", clamp_limit(limit, LIST_LIMIT_MAX)),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get_json("conversations.replies", &query).await
    }
}

use super::types::SearchMessagesResponse;
use super::{clamp_limit, SlackClient, SEARCH_LIMIT_MAX};
use crate::retry::Failure;

impl SlackClient {
    /// `search.messages`. Only works with user tokens; bot tokens get `ok: false`.
    pub async fn search_messages(
        &self,
        query: &str,
        count: u32,
        cursor: Option<&str>,
        sort: &str,
        sort_dir: &str,
    ) -> Result<SearchMessagesResponse, Failure> {
        let mut params = vec![
            ("query", query.to_string()),
            ("count", clamp_limit(count, SEARCH_LIMIT_MAX)),
            ("sort", sort.to_string()),
            ("sort_dir", sort_dir.to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        self.get_json("search.messages", &params).await
    }
}

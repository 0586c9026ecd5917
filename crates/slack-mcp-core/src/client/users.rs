use super::types::{UserProfileResponse, UsersListResponse};
use super::{clamp_limit, SlackClient, LIST_LIMIT_MAX};
use crate::retry::Failure;

impl SlackClient {
    pub async fn get_users(&self, limit: u32, cursor: Option<&str>) -> Result<UsersListResponse, Failure> {
        let mut query = vec![
            ("limit", clamp_limit(limit, LIST_LIMIT_MAX)),
            ("team_id", self.config.team_id.clone()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get_json("users.list", &query).await
    }

    pub async fn get_user_profile(&self, user_id: &str) -> Result<UserProfileResponse, Failure> {
        self.get_json(
            "users.profile.get",
            &[("user", user_id.to_string()), ("include_labels", "true".to_string())],
        )
        .await
    }
}

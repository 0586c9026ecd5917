use super::types::{
    CanvasChange, CanvasContent, CanvasFileSummary, CanvasRead, FilesInfoResponse,
    FilesListResponse, WriteResponse,
};
use super::{clamp_limit, SlackClient, SEARCH_LIMIT_MAX};
use crate::retry::{Failure, RetryConfig, RetryOverrides};
use serde_json::{json, Map, Value};

impl SlackClient {
    pub async fn list_canvases(&self, limit: u32, cursor: Option<&str>) -> Result<FilesListResponse, Failure> {
        let mut query = vec![
            ("types", "canvas".to_string()),
            ("count", clamp_limit(limit, SEARCH_LIMIT_MAX)),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.get_json("files.list", &query).await
    }

    pub async fn get_canvas_info(&self, canvas_id: &str) -> Result<FilesInfoResponse, Failure> {
        self.get_json("files.info", &[("file", canvas_id.to_string())])
            .await
    }

    /// Metadata lookup followed by a download of the canvas HTML.
    ///
    /// The download only retries rate limits. Download failures and missing
    /// URLs are reported as `ok: false` payloads rather than errors.
    pub async fn read_canvas(&self, canvas_id: &str) -> Result<CanvasRead, Failure> {
        let info = self.get_canvas_info(canvas_id).await?;
        if !info.ok {
            return Ok(CanvasRead::Lookup(info));
        }

        let Some(file) = info.data.file else {
            return Ok(CanvasRead::unavailable(
                "no_url_private",
                "Canvas file does not have a downloadable URL",
                None,
            ));
        };
        let Some(url) = file.url_private.clone() else {
            return Ok(CanvasRead::unavailable(
                "no_url_private",
                "Canvas file does not have a downloadable URL",
                Some(file),
            ));
        };

        match self.download_text(&url, &self.canvas_download_retry()).await {
            Ok(content_html) => Ok(CanvasRead::Content(Box::new(CanvasContent {
                ok: true,
                canvas_id: canvas_id.to_string(),
                title: file.title.clone(),
                created: file.created,
                updated: file.updated,
                user: file.user.clone(),
                permalink: file.permalink.clone(),
                content_html,
                file_info: CanvasFileSummary {
                    id: file.id.clone(),
                    name: file.name.clone(),
                    filetype: file.filetype.clone(),
                    size: file.size,
                },
            }))),
            Err(failure) => {
                tracing::warn!(canvas_id, url = %url, "canvas download failed: {}", failure);
                Ok(CanvasRead::unavailable(
                    "download_failed",
                    failure.message(),
                    Some(file),
                ))
            }
        }
    }

    fn canvas_download_retry(&self) -> RetryConfig {
        self.retry_config(&RetryOverrides::default())
            .with_should_retry(|failure, _| failure.is_rate_limited())
    }

    pub async fn edit_canvas(&self, canvas_id: &str, changes: &[CanvasChange]) -> Result<WriteResponse, Failure> {
        self.post_json(
            "canvases.edit",
            &json!({ "canvas_id": canvas_id, "changes": changes }),
        )
        .await
    }

    pub async fn create_canvas(&self, title: &str, markdown: Option<&str>) -> Result<WriteResponse, Failure> {
        let mut body = Map::new();
        body.insert("title".to_string(), Value::from(title));
        if let Some(markdown) = markdown.filter(|m| !m.is_empty()) {
            body.insert(
                "document_content".to_string(),
                json!({ "type": "markdown", "markdown": markdown }),
            );
        }
        self.post_json("canvases.create", &body).await
    }
}

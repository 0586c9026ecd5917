//! Blocking HTTP exchange over libcurl, bridged into async via `spawn_blocking`.

use crate::retry::{classify_curl_error, classify_response, Failure, FailureContext};
use std::str;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outbound request. Cloned per attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// `Name: value` pairs.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub follow_redirects: bool,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            follow_redirects: false,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![(
                "Content-Type".to_string(),
                "application/json; charset=utf-8".to_string(),
            )],
            body: Some(body),
            follow_redirects: false,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn follow_redirects(mut self) -> Self {
        self.follow_redirects = true;
        self
    }
}

/// What came back from the server, whatever the status.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    /// Headers of the final response (after redirects).
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `None` on 2xx, otherwise the classified failure.
    pub fn failure(&self, url: &str, what: &str) -> Option<Failure> {
        classify_response(self.status, &self.reason, self.header("retry-after"), url, what)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub total: Duration,
}

/// Performs the request on the current thread.
pub fn perform(req: &HttpRequest, timeouts: Timeouts) -> Result<HttpResponse, curl::Error> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(&req.url)?;
    easy.follow_location(req.follow_redirects)?;
    easy.connect_timeout(timeouts.connect)?;
    easy.timeout(timeouts.total)?;
    if req.method == Method::Post {
        easy.post(true)?;
        easy.post_fields_copy(req.body.as_deref().unwrap_or_default())?;
    }

    let mut list = curl::easy::List::new();
    for (k, v) in &req.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    let (reason, headers) = parse_header_lines(&header_lines);
    Ok(HttpResponse {
        status: u16::try_from(code).unwrap_or(0),
        reason,
        headers,
        body,
    })
}

/// Async wrapper: runs `perform` on the blocking pool and maps curl errors to network failures.
pub async fn send(req: HttpRequest, timeouts: Timeouts) -> Result<HttpResponse, Failure> {
    let url = req.url.clone();
    match tokio::task::spawn_blocking(move || perform(&req, timeouts)).await {
        Ok(Ok(resp)) => Ok(resp),
        Ok(Err(e)) => Err(classify_curl_error(&e, &url)),
        Err(join) => Err(Failure::network(
            format!("request to {url} aborted: {join}"),
            FailureContext::for_url(url),
        )),
    }
}

/// Split raw header lines into the final status reason phrase and header pairs.
///
/// curl reports every response in a redirect chain; each `HTTP/` status line
/// starts a new block and only the last block is kept.
pub(crate) fn parse_header_lines(lines: &[String]) -> (String, Vec<(String, String)>) {
    let mut reason = String::new();
    let mut headers = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            reason = line.splitn(3, ' ').nth(2).unwrap_or_default().trim().to_string();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    (reason, headers)
}

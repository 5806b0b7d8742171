//! Web tools: Serper search and page scraping.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::tools::{string_arg, string_schema, Tool, ToolError, SCRAPE_TOOL, SEARCH_TOOL};

const SERPER_SEARCH_URL: &str = "https://google.serper.dev/search";
const MAX_SEARCH_RESULTS: usize = 5;
/// Scraped pages are cut to this many characters.
pub const MAX_SCRAPE_CHARS: usize = 8_000;
/// At most this much of a page body is read off the wire.
pub const MAX_SCRAPE_BYTES: usize = 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

/// One organic web result.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

pub struct SerperSearchTool {
    http: reqwest::Client,
    api_key: String,
}

impl SerperSearchTool {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Tool for SerperSearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Searches the web and returns the top results with title, link and snippet."
    }

    fn input_schema(&self) -> Value {
        string_schema("search_query", "The web search query")
    }

    async fn invoke(&self, input: &Value) -> Result<String, ToolError> {
        let query = string_arg(input, "search_query")?;
        debug!(query, "web search");

        let response = self
            .http
            .post(SERPER_SEARCH_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: MAX_SEARCH_RESULTS,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Serper returned {}", status);
            return Err(ToolError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: SerperResponse = response.json().await?;
        Ok(format_results(&body.organic))
    }
}

pub fn format_results(results: &[OrganicResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }
    results
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|r| {
            format!(
                "Title: {}\nLink: {}\nSnippet: {}",
                r.title,
                r.link,
                r.snippet.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Scrape
// ────────────────────────────────────────────────────────────────────────────

pub struct ScrapeTool {
    http: reqwest::Client,
}

impl ScrapeTool {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for ScrapeTool {
    fn name(&self) -> &str {
        SCRAPE_TOOL
    }

    fn description(&self) -> &str {
        "Fetches a web page (for example a job posting) and returns its readable text."
    }

    fn input_schema(&self) -> Value {
        string_schema("website_url", "Absolute URL of the page to read")
    }

    async fn invoke(&self, input: &Value) -> Result<String, ToolError> {
        let url = string_arg(input, "website_url")?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::InvalidInput(format!("not an http(s) URL: {url}")));
        }
        debug!(url, "scraping page");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = read_capped(response, MAX_SCRAPE_BYTES).await?;
        let text = html_to_text(&String::from_utf8_lossy(&body));
        Ok(truncate_chars(&text, MAX_SCRAPE_CHARS).to_string())
    }
}

async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!(limit, "page body cut at read limit");
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

static BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|svg)\b.*?</(script|style|noscript|svg)>")
        .expect("block regex should be valid")
});

static COMMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex should be valid"));

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex should be valid"));

static SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("space regex should be valid"));

/// Drops scripts, styles and tags, decodes the common entities and collapses
/// whitespace.
pub fn html_to_text(html: &str) -> String {
    let text = BLOCK_REGEX.replace_all(html, " ");
    let text = COMMENT_REGEX.replace_all(&text, " ");
    let text = TAG_REGEX.replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    SPACE_REGEX.replace_all(&text, " ").trim().to_string()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serves a single HTTP response with `body` and returns its URL.
    async fn serve_once(body: Vec<u8>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
        });
        format!("http://{addr}/")
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn test_read_capped_stops_at_limit() {
        let url = serve_once(vec![b'x'; 64 * 1024]).await;
        let response = local_client().get(url).send().await.unwrap();
        let body = read_capped(response, 1_000).await.unwrap();
        assert_eq!(body.len(), 1_000);
    }

    #[tokio::test]
    async fn test_read_capped_keeps_short_bodies_whole() {
        let url = serve_once(b"<p>short</p>".to_vec()).await;
        let response = local_client().get(url).send().await.unwrap();
        let body = read_capped(response, 1_000).await.unwrap();
        assert_eq!(body, b"<p>short</p>");
    }

    #[tokio::test]
    async fn test_scrape_returns_page_text() {
        let url = serve_once(b"<html><body><h1>Rust Engineer</h1><p>Remote</p></body></html>".to_vec()).await;
        let tool = ScrapeTool::new(local_client());
        let text = tool.invoke(&json!({ "website_url": url })).await.unwrap();
        assert_eq!(text, "Rust Engineer Remote");
    }

    #[test]
    fn test_html_to_text_strips_markup() {
        let html = r#"<html><head><style>p { color: red; }</style>
            <script type="text/javascript">var x = "<p>";</script></head>
            <body><!-- nav --><h1>Senior  Engineer</h1>
            <p>Acme &amp; Co &mdash; <b>Rust</b>&nbsp;team</p></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Senior Engineer Acme & Co &mdash; Rust team");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_format_results() {
        let results: Vec<OrganicResult> = serde_json::from_value(json!([
            {"title": "Acme careers", "link": "https://acme.dev/jobs", "snippet": "Join us"},
            {"title": "Acme blog", "link": "https://acme.dev/blog"}
        ]))
        .unwrap();
        let out = format_results(&results);
        assert!(out.starts_with("Title: Acme careers\nLink: https://acme.dev/jobs\nSnippet: Join us"));
        assert!(out.contains("\n---\nTitle: Acme blog"));
        assert_eq!(format_results(&[]), "No results found.");
    }

    #[tokio::test]
    async fn test_scrape_rejects_non_http_urls() {
        let tool = ScrapeTool::new(reqwest::Client::new());
        let err = tool
            .invoke(&json!({"website_url": "file:///etc/passwd"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}

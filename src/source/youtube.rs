//! YouTube Data API v3 comment source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{is_substantive, CommentSource};
use crate::config::YouTubeConfig;
use crate::error::{Result, XeniaError};
use crate::models::VideoInfo;

/// The API caps `maxResults` for comment threads at 100.
const MAX_PAGE_SIZE: usize = 100;

/// Upper bound on pages walked for one video, however short its comments.
const MAX_PAGES: usize = 20;

/// Client for the YouTube Data API.
#[derive(Clone)]
pub struct YouTubeClient {
    api_key: String,
    http: Client,
    base_url: String,
    min_comment_chars: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadList {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

impl YouTubeClient {
    /// Create a client from the `[youtube]` config section.
    pub fn new(api_key: impl Into<String>, config: &YouTubeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| XeniaError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            min_comment_chars: config.min_comment_chars,
        })
    }

    async fn fetch_page(
        &self,
        video_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<CommentThreadList> {
        let url = format!("{}/commentThreads", self.base_url);
        let page_size = page_size.to_string();

        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("textFormat", "plainText"),
            ("order", "relevance"),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| XeniaError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| XeniaError::Upstream(format!("malformed comment page: {}", e)))
    }

    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoInfo>> {
        let url = format!("{}/videos", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| XeniaError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(status, &body));
        }

        let list: VideoList = response
            .json()
            .await
            .map_err(|e| XeniaError::Upstream(e.to_string()))?;

        Ok(list.items.into_iter().next().map(|video| {
            let na = || "N/A".to_string();
            VideoInfo {
                title: video.snippet.title,
                channel: video.snippet.channel_title,
                views: video.statistics.view_count.unwrap_or_else(na),
                likes: video.statistics.like_count.unwrap_or_else(na),
                comments: video.statistics.comment_count.unwrap_or_else(na),
            }
        }))
    }
}

/// Map a non-2xx Data API reply onto the error taxonomy.
fn map_api_error(status: u16, body: &str) -> XeniaError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let reasons: Vec<&str> = parsed
        .as_ref()
        .map(|env| env.error.errors.iter().map(|d| d.reason.as_str()).collect())
        .unwrap_or_default();

    match status {
        404 => XeniaError::NotFound("Video not found".to_string()),
        403 if reasons.contains(&"commentsDisabled") => {
            XeniaError::NotFound("Comments are disabled for this video".to_string())
        }
        403 => XeniaError::QuotaExceeded,
        _ if reasons.contains(&"videoNotFound") => {
            XeniaError::NotFound("Video not found".to_string())
        }
        _ => {
            let message = parsed
                .as_ref()
                .map(|env| env.error.message.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "unexpected response".to_string());
            XeniaError::Upstream(format!("{} {}", status, message))
        }
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn fetch_comments(&self, video_id: &str, limit: usize) -> Result<Vec<String>> {
        let mut comments: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;
        if limit == 0 {
            return Ok(comments);
        }

        for page_number in 1..=MAX_PAGES {
            let page_size = (limit - comments.len()).min(MAX_PAGE_SIZE);
            let page = self
                .fetch_page(video_id, page_size, page_token.as_deref())
                .await?;
            debug!(
                "Fetched page of {} threads for {} (have {})",
                page.items.len(),
                video_id,
                comments.len()
            );

            if page.items.is_empty() {
                debug!("Empty page for {}, stopping", video_id);
                break;
            }

            for thread in page.items {
                let text = thread.snippet.top_level_comment.snippet.text_display;
                if is_substantive(&text, self.min_comment_chars) {
                    comments.push(text);
                    if comments.len() >= limit {
                        break;
                    }
                }
            }

            if comments.len() >= limit {
                break;
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
            if page_number == MAX_PAGES {
                warn!(
                    "Stopped after {} pages for {} with {} comments",
                    MAX_PAGES,
                    video_id,
                    comments.len()
                );
            }
        }

        comments.truncate(limit);
        info!("Collected {} comments for {}", comments.len(), video_id);
        Ok(comments)
    }

    async fn video_info(&self, video_id: &str) -> Option<VideoInfo> {
        match self.fetch_video(video_id).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Video info lookup failed for {}: {}", video_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VIDEO: &str = "dQw4w9WgXcQ";

    fn client_for(server: &MockServer) -> YouTubeClient {
        let config = YouTubeConfig {
            api_base_url: server.uri(),
            ..YouTubeConfig::default()
        };
        YouTubeClient::new("yt_key", &config).unwrap()
    }

    fn thread(text: &str) -> serde_json::Value {
        serde_json::json!({
            "snippet": {"topLevelComment": {"snippet": {"textDisplay": text}}}
        })
    }

    fn api_error(code: u16, reason: &str) -> serde_json::Value {
        serde_json::json!({
            "error": {"code": code, "message": "denied", "errors": [{"reason": reason}]}
        })
    }

    #[tokio::test]
    async fn test_fetch_filters_short_comments() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", VIDEO))
            .and(query_param("key", "yt_key"))
            .and(query_param("maxResults", "100"))
            .and(query_param("order", "relevance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    thread("great video!!"),
                    thread("this was terrible and boring"),
                    thread("ok")
                ]
            })))
            .mount(&server)
            .await;

        let comments = client_for(&server).fetch_comments(VIDEO, 100).await.unwrap();
        assert_eq!(
            comments,
            vec!["great video!!", "this was terrible and boring"]
        );
    }

    #[tokio::test]
    async fn test_fetch_follows_pages_until_limit() {
        let server = MockServer::start().await;

        let first: Vec<_> = (0..8)
            .map(|i| thread(&format!("first page comment {}", i)))
            .collect();
        let second: Vec<_> = (0..8)
            .map(|i| thread(&format!("second page comment {}", i)))
            .collect();

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("pageToken", "p2"))
            .and(query_param("maxResults", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": second,
                "nextPageToken": "p3"
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": first,
                "nextPageToken": "p2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let comments = client_for(&server).fetch_comments(VIDEO, 10).await.unwrap();
        assert_eq!(comments.len(), 10);
        assert_eq!(comments[0], "first page comment 0");
        assert_eq!(comments[8], "second page comment 0");
        assert_eq!(comments[9], "second page comment 1");
    }

    #[tokio::test]
    async fn test_fetch_stops_without_next_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [thread("only one comment here")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let comments = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap();
        assert_eq!(comments.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_stops_on_empty_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [],
                "nextPageToken": "again"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let comments = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_caps_pages_of_short_comments() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [thread("ok"), thread("lol")],
                "nextPageToken": "again"
            })))
            .expect(MAX_PAGES as u64)
            .mount(&server)
            .await;

        let comments = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap();
        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_comments_disabled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(api_error(403, "commentsDisabled")),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap_err();
        assert!(matches!(err, XeniaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_quota_exceeded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(403).set_body_json(api_error(403, "quotaExceeded")))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap_err();
        assert!(matches!(err, XeniaError::QuotaExceeded));
    }

    #[tokio::test]
    async fn test_fetch_video_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(404).set_body_json(api_error(404, "videoNotFound")))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap_err();
        assert!(matches!(err, XeniaError::NotFound(ref m) if m == "Video not found"));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_upstream() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_comments(VIDEO, 50).await.unwrap_err();
        assert!(matches!(err, XeniaError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_video_info() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", VIDEO))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "snippet": {"title": "Never Gonna Give You Up", "channelTitle": "Rick Astley"},
                    "statistics": {"viewCount": "1500000000", "commentCount": "2300000"}
                }]
            })))
            .mount(&server)
            .await;

        let info = client_for(&server).video_info(VIDEO).await.unwrap();
        assert_eq!(info.title, "Never Gonna Give You Up");
        assert_eq!(info.channel, "Rick Astley");
        assert_eq!(info.views, "1500000000");
        assert_eq!(info.likes, "N/A");
    }

    #[tokio::test]
    async fn test_video_info_failure_is_swallowed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client_for(&server).video_info(VIDEO).await.is_none());
    }

    #[test]
    fn test_map_api_error_without_body() {
        assert!(matches!(map_api_error(403, ""), XeniaError::QuotaExceeded));
        assert!(matches!(map_api_error(502, ""), XeniaError::Upstream(_)));
    }
}

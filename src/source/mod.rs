//! Comment sources.
//!
//! A [`CommentSource`] turns a video identifier into an ordered list of
//! comment texts, with trivially short comments already removed.

pub mod youtube;

pub use youtube::YouTubeClient;

use crate::error::{Result, XeniaError};
use crate::models::VideoInfo;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Provider of video comments.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch up to `limit` comments, most relevant first.
    ///
    /// Comments whose trimmed length is under the configured minimum are
    /// never returned.
    async fn fetch_comments(&self, video_id: &str, limit: usize) -> Result<Vec<String>>;

    /// Best-effort video metadata; `None` on any failure.
    async fn video_info(&self, video_id: &str) -> Option<VideoInfo>;
}

fn video_id_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(
                r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
            )
            .expect("valid video URL pattern"),
            Regex::new(r"v=([a-zA-Z0-9_-]{11})").expect("valid query pattern"),
        ]
    })
}

/// Extract the 11-character video ID from a YouTube URL.
///
/// Supports:
/// - `https://www.youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://www.youtube.com/embed/VIDEO_ID`
/// - any URL carrying a `v=VIDEO_ID` parameter
pub fn extract_video_id(url: &str) -> Result<String> {
    video_id_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| XeniaError::InvalidInput(format!("Invalid YouTube URL: {}", url)))
}

/// Whether a comment is long enough to be worth scoring.
pub fn is_substantive(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() >= min_chars
}

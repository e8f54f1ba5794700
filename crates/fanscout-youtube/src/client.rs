//! HTTP client for the `YouTube` Data API v3.
//!
//! Harvests the comments (and replies) on a channel's most recent uploads and
//! attaches each commenter's channel description as bio text. Transient
//! failures are retried with back-off; quota rejections abort the harvest.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fanscout_core::{parse_timestamp, AuthorIdentity, CommentRecord};
use fanscout_ranker::filter_by_age;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::channel::{parse_channel_url, ChannelRef};
use crate::error::YoutubeError;
use crate::retry::retry_with_backoff;
use crate::types::{
    Channel, Comment, CommentThread, ErrorEnvelope, ListResponse, PlaylistItem, SearchResult,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// API page-size ceilings.
const COMMENT_PAGE_MAX: usize = 100;
const PLAYLIST_PAGE_MAX: usize = 50;
const CHANNEL_BATCH_MAX: usize = 50;

/// Channel descriptions are cut to this many characters before use as bio text.
const BIO_MAX_CHARS: usize = 500;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
const DEFAULT_COMMENTS_PER_VIDEO: usize = 100;

/// One upload from a channel's uploads playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Client for the `YouTube` Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    comments_per_video: usize,
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`YoutubeError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Endpoints are joined onto the base, which needs exactly one trailing
        // slash or `Url::join` replaces the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            comments_per_video: DEFAULT_COMMENTS_PER_VIDEO,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Caps how many comments are collected per video. Whole threads are
    /// kept, so a video can overshoot by the replies of its last thread.
    #[must_use]
    pub fn with_comments_per_video(mut self, comments_per_video: usize) -> Self {
        self.comments_per_video = comments_per_video;
        self
    }

    /// Harvest comments from the `video_count` most recent uploads of a channel.
    ///
    /// Comments older than `days_back` days are dropped (`0` keeps all).
    /// A video whose comments cannot be fetched (comments disabled, deleted)
    /// is logged and skipped. Commenter bio text is fetched once per distinct
    /// author channel.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::InvalidChannelUrl`] if the URL form is unsupported.
    /// - [`YoutubeError::ChannelNotFound`] if the channel cannot be resolved.
    /// - [`YoutubeError::QuotaExceeded`] as soon as the API reports it.
    /// - Any other error from the channel or playlist lookups.
    pub async fn fetch_channel_comments(
        &self,
        channel_url: &str,
        video_count: usize,
        days_back: u32,
    ) -> Result<Vec<CommentRecord>, YoutubeError> {
        let channel = parse_channel_url(channel_url)?;
        let channel_id = self.resolve_channel_id(&channel).await?;
        let uploads = self.uploads_playlist_id(&channel_id).await?;
        let videos = self.recent_videos(&uploads, video_count).await?;
        tracing::info!(channel_id = %channel_id, videos = videos.len(), "found recent uploads");

        let mut harvested: Vec<(String, Comment)> = Vec::new();
        for (i, video) in videos.iter().enumerate() {
            match self.video_comments(&video.video_id).await {
                Ok(comments) => {
                    tracing::info!(
                        position = i + 1,
                        total = videos.len(),
                        video_id = %video.video_id,
                        title = %video.title,
                        comments = comments.len(),
                        "harvested video comments"
                    );
                    harvested.extend(comments.into_iter().map(|c| (video.video_id.clone(), c)));
                }
                Err(e @ YoutubeError::QuotaExceeded(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(video_id = %video.video_id, error = %e, "skipping video");
                }
            }
        }

        let records: Vec<CommentRecord> = harvested
            .into_iter()
            .filter_map(|(video_id, comment)| to_record(comment, &video_id))
            .collect();
        let records = filter_by_age(records, days_back, Utc::now());

        // Bios are looked up only for authors whose comments survived the age filter.
        let author_ids = distinct_author_ids(&records);
        let bios = self.author_bios(&author_ids).await;
        let records: Vec<CommentRecord> = records
            .into_iter()
            .map(|record| {
                let bio = bios.get(&record.author().channel_id).cloned();
                record.with_author_bio_text(bio)
            })
            .collect();
        tracing::info!(comments = records.len(), authors = author_ids.len(), "harvest complete");

        Ok(records)
    }

    /// Resolve a [`ChannelRef`] to a `UC...` channel id.
    ///
    /// Handles and custom names go through the search endpoint and take the
    /// top channel hit; legacy usernames use `forUsername`.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::ChannelNotFound`] when the lookup is empty.
    pub async fn resolve_channel_id(&self, channel: &ChannelRef) -> Result<String, YoutubeError> {
        match channel {
            ChannelRef::Id(id) => Ok(id.clone()),
            ChannelRef::Username(name) => {
                let page: ListResponse<Channel> = self
                    .get(
                        "channels",
                        &[("part", "id"), ("forUsername", name.as_str())],
                        &format!("channels(forUsername={name})"),
                    )
                    .await?;
                page.items
                    .into_iter()
                    .next()
                    .map(|c| c.id)
                    .ok_or_else(|| YoutubeError::ChannelNotFound(name.clone()))
            }
            ChannelRef::Handle(name) | ChannelRef::CustomName(name) => {
                let page: ListResponse<SearchResult> = self
                    .get(
                        "search",
                        &[
                            ("part", "id"),
                            ("q", name.as_str()),
                            ("type", "channel"),
                            ("maxResults", "1"),
                        ],
                        &format!("search(q={name})"),
                    )
                    .await?;
                page.items
                    .into_iter()
                    .find_map(|r| r.id.channel_id)
                    .ok_or_else(|| YoutubeError::ChannelNotFound(channel.lookup_name().to_string()))
            }
        }
    }

    /// The id of a channel's uploads playlist.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::ChannelNotFound`] if the channel does not
    /// exist or exposes no uploads playlist.
    pub async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, YoutubeError> {
        let page: ListResponse<Channel> = self
            .get(
                "channels",
                &[("part", "contentDetails"), ("id", channel_id)],
                &format!("channels(id={channel_id})"),
            )
            .await?;
        page.items
            .into_iter()
            .next()
            .and_then(|c| c.content_details)
            .and_then(|d| d.related_playlists.uploads)
            .ok_or_else(|| YoutubeError::ChannelNotFound(channel_id.to_string()))
    }

    /// The `count` most recent uploads, newest first.
    ///
    /// # Errors
    ///
    /// Propagates API and deserialization errors.
    pub async fn recent_videos(
        &self,
        playlist_id: &str,
        count: usize,
    ) -> Result<Vec<Video>, YoutubeError> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        while videos.len() < count {
            let max = (count - videos.len()).min(PLAYLIST_PAGE_MAX).to_string();
            let mut params = vec![
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", max.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }
            let page: ListResponse<PlaylistItem> = self
                .get(
                    "playlistItems",
                    &params,
                    &format!("playlistItems(playlistId={playlist_id})"),
                )
                .await?;

            videos.extend(page.items.into_iter().filter_map(|item| {
                let snippet = item.snippet;
                Some(Video {
                    video_id: snippet.resource_id.video_id?,
                    title: snippet.title,
                    published_at: snippet.published_at.as_deref().and_then(parse_timestamp),
                })
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        videos.truncate(count);
        Ok(videos)
    }

    /// Top-level comments and their inline replies for one video.
    async fn video_comments(&self, video_id: &str) -> Result<Vec<Comment>, YoutubeError> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < self.comments_per_video {
            let max = (self.comments_per_video - comments.len())
                .min(COMMENT_PAGE_MAX)
                .to_string();
            let mut params = vec![
                ("part", "snippet,replies"),
                ("videoId", video_id),
                ("maxResults", max.as_str()),
                ("order", "relevance"),
                ("textFormat", "plainText"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }
            let page: ListResponse<CommentThread> = self
                .get(
                    "commentThreads",
                    &params,
                    &format!("commentThreads(videoId={video_id})"),
                )
                .await?;

            for thread in page.items {
                comments.push(thread.snippet.top_level_comment);
                if let Some(replies) = thread.replies {
                    comments.extend(replies.comments);
                }
                if comments.len() >= self.comments_per_video {
                    break;
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(comments)
    }

    /// Channel descriptions for the given author channels, keyed by channel id.
    ///
    /// Best effort: a failed batch is logged and its authors get no bio. A
    /// quota rejection stops further lookups but keeps what was fetched.
    async fn author_bios(&self, channel_ids: &[String]) -> HashMap<String, String> {
        let mut bios = HashMap::new();

        for batch in channel_ids.chunks(CHANNEL_BATCH_MAX) {
            let ids = batch.join(",");
            let max = batch.len().to_string();
            let result: Result<ListResponse<Channel>, _> = self
                .get(
                    "channels",
                    &[("part", "snippet"), ("id", ids.as_str()), ("maxResults", max.as_str())],
                    "channels(part=snippet)",
                )
                .await;

            match result {
                Ok(page) => {
                    for channel in page.items {
                        let Some(snippet) = channel.snippet else { continue };
                        let bio: String = snippet.description.chars().take(BIO_MAX_CHARS).collect();
                        if !bio.trim().is_empty() {
                            bios.insert(channel.id, bio);
                        }
                    }
                }
                Err(e @ YoutubeError::QuotaExceeded(_)) => {
                    tracing::warn!(error = %e, "quota reached while fetching commenter bios; continuing without them");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, batch = batch.len(), "failed to fetch commenter bios");
                }
            }
        }

        tracing::debug!(requested = channel_ids.len(), with_bio = bios.len(), "fetched commenter bios");
        bios
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, YoutubeError> {
        let url = self.build_url(endpoint, params)?;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(&url)
        })
        .await?;
        serde_json::from_value(body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Joins `endpoint` onto the base URL and appends `key` plus `params`,
    /// percent-encoded.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| YoutubeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// One GET. Non-2xx bodies are classified by [`classify_failure`].
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        // The query string carries the API key; report the path only.
        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

/// Map an error response to [`YoutubeError::QuotaExceeded`] when the API
/// says so, and to [`YoutubeError::ApiError`] otherwise.
fn classify_failure(status: u16, body: &str) -> YoutubeError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let is_quota = parsed.as_ref().is_some_and(|env| {
        env.error
            .errors
            .iter()
            .any(|d| d.reason == "quotaExceeded" || d.reason == "dailyLimitExceeded")
    });
    let message = parsed
        .map(|env| env.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());

    if status == 403 && is_quota {
        YoutubeError::QuotaExceeded(message)
    } else {
        YoutubeError::ApiError { status, message }
    }
}

fn distinct_author_ids(records: &[CommentRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.author().channel_id.as_str())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Builds a record without bio text; bios are attached after the age filter.
fn to_record(comment: Comment, video_id: &str) -> Option<CommentRecord> {
    let Comment { id, snippet } = comment;
    let channel_id = snippet
        .author_channel_id
        .map(|a| a.value)
        .unwrap_or_default();
    let channel_url = if channel_id.is_empty() {
        String::new()
    } else {
        format!("https://youtube.com/channel/{channel_id}")
    };
    let author = AuthorIdentity::new(snippet.author_display_name, channel_id, channel_url);

    match CommentRecord::new(id, author, video_id) {
        Ok(record) => Some(
            record
                .with_text(snippet.text_display)
                .with_like_count(snippet.like_count)
                .with_published_at(snippet.published_at.as_deref().and_then(parse_timestamp)),
        ),
        Err(e) => {
            tracing::debug!(video_id, error = %e, "skipping comment with missing fields");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> YoutubeClient {
        YoutubeClient::with_base_url("test-key", 30, "fanscout-test", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_joins_endpoint_and_appends_key_first() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client
            .build_url("channels", &[("part", "id"), ("forUsername", "surf")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/channels?key=test-key&part=id&forUsername=surf"
        );
    }

    #[test]
    fn build_url_encodes_comma_lists() {
        let client = test_client("https://www.googleapis.com/youtube/v3/");
        let url = client
            .build_url("channels", &[("id", "UC1,UC2")])
            .unwrap();
        assert!(url.as_str().ends_with("id=UC1%2CUC2"), "{url}");
    }

    #[test]
    fn quota_body_is_classified_as_quota() {
        let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded"}]}}"#;
        assert!(matches!(
            classify_failure(403, body),
            YoutubeError::QuotaExceeded(m) if m.contains("exceeded your quota")
        ));
    }

    #[test]
    fn comments_disabled_is_plain_api_error() {
        let body = r#"{"error":{"code":403,"message":"disabled comments","errors":[{"reason":"commentsDisabled"}]}}"#;
        assert!(matches!(
            classify_failure(403, body),
            YoutubeError::ApiError { status: 403, .. }
        ));
    }

    #[test]
    fn non_json_error_body_is_kept_as_message() {
        match classify_failure(502, "Bad Gateway") {
            YoutubeError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn record_without_author_channel_has_empty_identity_fields() {
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "snippet": {
                "authorDisplayName": "ghost",
                "textDisplay": "boo",
                "likeCount": 2,
                "publishedAt": "not a date"
            }
        }))
        .unwrap();
        let record = to_record(comment, "v1").unwrap();
        assert_eq!(record.author().channel_id, "");
        assert_eq!(record.author().channel_url, "");
        assert_eq!(record.like_count(), 2);
        assert!(record.published_at().is_none());
    }

    #[test]
    fn record_without_author_name_is_skipped() {
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "snippet": { "textDisplay": "anonymous" }
        }))
        .unwrap();
        assert!(to_record(comment, "v1").is_none());
    }
}

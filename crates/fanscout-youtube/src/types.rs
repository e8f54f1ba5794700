//! `YouTube` Data API v3 response types.
//!
//! Only the fields the comment harvester reads are modelled. Every list
//! endpoint shares the [`ListResponse`] envelope.

use serde::Deserialize;

/// `{ "items": [...], "nextPageToken": "..." }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ---------------------------------------------------------------------------
// search (channel lookup by handle or custom name)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResultId {
    #[serde(default)]
    pub channel_id: Option<String>,
}

// ---------------------------------------------------------------------------
// channels
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Channel {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<ChannelSnippet>,
    #[serde(default)]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelSnippet {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelatedPlaylists {
    #[serde(default)]
    pub uploads: Option<String>,
}

// ---------------------------------------------------------------------------
// playlistItems
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: Option<String>,
    pub resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId {
    #[serde(default)]
    pub video_id: Option<String>,
}

// ---------------------------------------------------------------------------
// commentThreads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThread {
    pub snippet: CommentThreadSnippet,
    #[serde(default)]
    pub replies: Option<CommentReplies>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadSnippet {
    pub top_level_comment: Comment,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentReplies {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Comment {
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentSnippet {
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_channel_id: Option<AuthorChannelId>,
    #[serde(default)]
    pub text_display: String,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorChannelId {
    pub value: String,
}

// ---------------------------------------------------------------------------
// error envelope
// ---------------------------------------------------------------------------

/// `{ "error": { "code": 403, "message": "...", "errors": [{ "reason": "..." }] } }`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub reason: String,
}

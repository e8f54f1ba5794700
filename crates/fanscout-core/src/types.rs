use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The identity triple that keys a commenter.
///
/// All three fields take part in equality and hashing, case-sensitively.
/// `channel_id` and `channel_url` may be empty for authors whose channel is
/// hidden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorIdentity {
    pub name: String,
    pub channel_id: String,
    pub channel_url: String,
}

impl AuthorIdentity {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        channel_id: impl Into<String>,
        channel_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            channel_id: channel_id.into(),
            channel_url: channel_url.into(),
        }
    }
}

/// One comment or reply as produced by a comment source.
///
/// Fields are private so a record cannot change after construction; use
/// [`CommentRecord::new`] and the `with_*` methods to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    comment_id: String,
    author: AuthorIdentity,
    text: String,
    like_count: u64,
    video_id: String,
    published_at: Option<DateTime<Utc>>,
    author_bio_text: Option<String>,
}

impl CommentRecord {
    /// Creates a record with empty text, zero likes and no timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if the author name or video id is blank.
    pub fn new(
        comment_id: impl Into<String>,
        author: AuthorIdentity,
        video_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let video_id = video_id.into();
        if author.name.trim().is_empty() {
            return Err(CoreError::MissingField("author_name"));
        }
        if video_id.trim().is_empty() {
            return Err(CoreError::MissingField("video_id"));
        }
        Ok(Self {
            comment_id: comment_id.into(),
            author,
            text: String::new(),
            like_count: 0,
            video_id,
            published_at: None,
            author_bio_text: None,
        })
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_like_count(mut self, like_count: u64) -> Self {
        self.like_count = like_count;
        self
    }

    #[must_use]
    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Attaches the author's bio text. Blank text is stored as `None`.
    #[must_use]
    pub fn with_author_bio_text(mut self, bio: Option<String>) -> Self {
        self.author_bio_text = bio.filter(|b| !b.trim().is_empty());
        self
    }

    #[must_use]
    pub fn comment_id(&self) -> &str {
        &self.comment_id
    }

    #[must_use]
    pub fn author(&self) -> &AuthorIdentity {
        &self.author
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    #[must_use]
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    #[must_use]
    pub fn author_bio_text(&self) -> Option<&str> {
        self.author_bio_text.as_deref()
    }
}

/// Per-commenter statistics produced by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommenterAggregate {
    pub author: AuthorIdentity,
    pub total_comments: u64,
    pub total_likes: u64,
    pub avg_likes_per_comment: f64,
    pub distinct_videos: u64,
    /// First three comment texts, in order of appearance, joined by `" | "`.
    pub sample_comments: String,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub engagement_score: f64,
    /// 1-based position after sorting. Zero until ranked.
    pub rank: usize,
    /// First non-empty bio text seen for this author, if any.
    pub bio_text: Option<String>,
}

/// Match strength for a resolved profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    None,
}

impl Confidence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::None => "none",
        }
    }

    #[must_use]
    pub fn is_match(self) -> bool {
        self != Confidence::None
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a candidate profile hint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    BioText,
    SearchResult,
}

/// A single cross-platform profile hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCandidate {
    pub url: String,
    pub handle: String,
    pub origin: CandidateOrigin,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

/// Which resolution step produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    BioText,
    Search,
    None,
}

impl ResolutionSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionSource::BioText => "bio_text",
            ResolutionSource::Search => "search",
            ResolutionSource::None => "none",
        }
    }
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one commenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProfile {
    pub url: Option<String>,
    pub handle: Option<String>,
    pub confidence: Confidence,
    pub source: ResolutionSource,
    pub query_used: Option<String>,
    /// `true` when the commenter consumed search budget, whether or not a
    /// match was found.
    pub search_attempted: bool,
}

impl ResolvedProfile {
    #[must_use]
    pub fn from_bio(candidate: &ProfileCandidate) -> Self {
        Self {
            url: Some(candidate.url.clone()),
            handle: Some(candidate.handle.clone()),
            confidence: Confidence::High,
            source: ResolutionSource::BioText,
            query_used: None,
            search_attempted: false,
        }
    }

    #[must_use]
    pub fn from_search(candidate: &ProfileCandidate, confidence: Confidence, query: &str) -> Self {
        Self {
            url: Some(candidate.url.clone()),
            handle: Some(candidate.handle.clone()),
            confidence,
            source: ResolutionSource::Search,
            query_used: Some(query.to_string()),
            search_attempted: true,
        }
    }

    #[must_use]
    pub fn not_found(search_attempted: bool) -> Self {
        Self {
            url: None,
            handle: None,
            confidence: Confidence::None,
            source: ResolutionSource::None,
            query_used: None,
            search_attempted,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.confidence.is_match()
    }
}

/// A ranked commenter with its resolution attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommenter {
    pub commenter: CommenterAggregate,
    pub profile: ResolvedProfile,
}

/// Parses an RFC 3339 timestamp as emitted by the `YouTube` Data API.
///
/// Returns `None` for blank or malformed input rather than failing, so a
/// bad timestamp never drops the record that carries it.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

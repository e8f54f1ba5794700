//! CSV row shapes for the three pipeline files and the reader/writer helpers.
//!
//! Every file is written with an explicit header row, so an empty result
//! still produces a valid header-only CSV. Rows that fail to deserialize on
//! read are logged and skipped.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use fanscout_core::{
    parse_timestamp, AuthorIdentity, CommentRecord, CommenterAggregate, CoreError,
    ResolvedCommenter,
};
use fanscout_resolver::extract_profile_links;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub(crate) const NOT_FOUND: &str = "Not Found";
pub(crate) const NOT_CONFIGURED: &str = "API Not Configured";

pub(crate) const COMMENT_COLUMNS: &[&str] = &[
    "comment_id",
    "video_id",
    "author_name",
    "author_channel_id",
    "author_channel_url",
    "comment_text",
    "like_count",
    "published_at",
    "channel_description",
    "instagram_from_description",
];

pub(crate) const RANKED_COLUMNS: &[&str] = &[
    "rank",
    "author_name",
    "author_channel_id",
    "author_channel_url",
    "total_comments",
    "total_likes",
    "avg_likes_per_comment",
    "videos_commented_on",
    "engagement_score",
    "first_comment",
    "last_comment",
    "sample_comments",
    "channel_description",
];

pub(crate) const PROFILE_COLUMNS: &[&str] = &[
    "rank",
    "youtube_display_name",
    "youtube_channel_id",
    "youtube_channel_url",
    "total_comments",
    "total_likes",
    "avg_likes_per_comment",
    "videos_commented_on",
    "engagement_score",
    "first_comment",
    "last_comment",
    "sample_comments",
    "instagram_profile",
    "instagram_username",
    "match_confidence",
    "source",
    "search_query_used",
];

/// One line of `comments.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CommentRow {
    pub comment_id: String,
    pub video_id: String,
    pub author_name: String,
    #[serde(default)]
    pub author_channel_id: String,
    #[serde(default)]
    pub author_channel_url: String,
    #[serde(default)]
    pub comment_text: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub channel_description: String,
    /// Profile URLs found in the description, comma separated. Informational.
    #[serde(default)]
    pub instagram_from_description: String,
}

impl CommentRow {
    pub(crate) fn from_record(record: &CommentRecord) -> Self {
        let author = record.author();
        let bio = record.author_bio_text().unwrap_or_default();
        let links: Vec<String> = extract_profile_links(bio)
            .into_iter()
            .map(|c| c.url)
            .collect();
        Self {
            comment_id: record.comment_id().to_string(),
            video_id: record.video_id().to_string(),
            author_name: author.name.clone(),
            author_channel_id: author.channel_id.clone(),
            author_channel_url: author.channel_url.clone(),
            comment_text: record.text().to_string(),
            like_count: record.like_count(),
            published_at: format_timestamp(record.published_at()),
            channel_description: bio.to_string(),
            instagram_from_description: links.join(", "),
        }
    }

    /// Rebuild the record. A blank description falls back to the extracted
    /// link list so files edited by hand still carry bio hints.
    pub(crate) fn into_record(self) -> Result<CommentRecord, CoreError> {
        let published_at = parse_timestamp(&self.published_at);
        let bio = if self.channel_description.trim().is_empty() {
            self.instagram_from_description
        } else {
            self.channel_description
        };
        let author = AuthorIdentity::new(
            self.author_name,
            self.author_channel_id,
            self.author_channel_url,
        );
        Ok(CommentRecord::new(self.comment_id, author, self.video_id)?
            .with_text(self.comment_text)
            .with_like_count(self.like_count)
            .with_published_at(published_at)
            .with_author_bio_text(Some(bio)))
    }
}

/// One line of `ranked_commenters.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RankedRow {
    pub rank: usize,
    pub author_name: String,
    #[serde(default)]
    pub author_channel_id: String,
    #[serde(default)]
    pub author_channel_url: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_comments: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_likes: u64,
    #[serde(default)]
    pub avg_likes_per_comment: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub videos_commented_on: u64,
    #[serde(default)]
    pub engagement_score: f64,
    #[serde(default)]
    pub first_comment: String,
    #[serde(default)]
    pub last_comment: String,
    #[serde(default)]
    pub sample_comments: String,
    #[serde(default)]
    pub channel_description: String,
}

impl From<&CommenterAggregate> for RankedRow {
    fn from(c: &CommenterAggregate) -> Self {
        Self {
            rank: c.rank,
            author_name: c.author.name.clone(),
            author_channel_id: c.author.channel_id.clone(),
            author_channel_url: c.author.channel_url.clone(),
            total_comments: c.total_comments,
            total_likes: c.total_likes,
            avg_likes_per_comment: c.avg_likes_per_comment,
            videos_commented_on: c.distinct_videos,
            engagement_score: c.engagement_score,
            first_comment: format_timestamp(c.first_seen),
            last_comment: format_timestamp(c.last_seen),
            sample_comments: c.sample_comments.clone(),
            channel_description: c.bio_text.clone().unwrap_or_default(),
        }
    }
}

impl RankedRow {
    pub(crate) fn into_aggregate(self) -> CommenterAggregate {
        let bio_text = Some(self.channel_description).filter(|b| !b.trim().is_empty());
        CommenterAggregate {
            author: AuthorIdentity::new(
                self.author_name,
                self.author_channel_id,
                self.author_channel_url,
            ),
            total_comments: self.total_comments,
            total_likes: self.total_likes,
            avg_likes_per_comment: self.avg_likes_per_comment,
            distinct_videos: self.videos_commented_on,
            sample_comments: self.sample_comments,
            first_seen: parse_timestamp(&self.first_comment),
            last_seen: parse_timestamp(&self.last_comment),
            engagement_score: self.engagement_score,
            rank: self.rank,
            bio_text,
        }
    }
}

/// One line of `instagram_profiles.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ProfileRow {
    pub rank: usize,
    pub youtube_display_name: String,
    pub youtube_channel_id: String,
    pub youtube_channel_url: String,
    pub total_comments: u64,
    pub total_likes: u64,
    pub avg_likes_per_comment: f64,
    pub videos_commented_on: u64,
    pub engagement_score: f64,
    pub first_comment: String,
    pub last_comment: String,
    pub sample_comments: String,
    pub instagram_profile: String,
    pub instagram_username: String,
    pub match_confidence: String,
    pub source: String,
    pub search_query_used: String,
}

impl ProfileRow {
    /// Unresolved commenters get a sentinel in `instagram_profile` and empty
    /// strings elsewhere; which sentinel depends on whether search was
    /// available for the run.
    pub(crate) fn new(resolved: &ResolvedCommenter, search_configured: bool) -> Self {
        let c = &resolved.commenter;
        let p = &resolved.profile;

        let (instagram_profile, instagram_username, match_confidence, source, search_query_used) =
            if p.is_found() {
                (
                    p.url.clone().unwrap_or_default(),
                    p.handle.clone().unwrap_or_default(),
                    p.confidence.to_string(),
                    p.source.to_string(),
                    p.query_used.clone().unwrap_or_default(),
                )
            } else {
                let sentinel = if search_configured {
                    NOT_FOUND
                } else {
                    NOT_CONFIGURED
                };
                (
                    sentinel.to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                )
            };

        Self {
            rank: c.rank,
            youtube_display_name: c.author.name.clone(),
            youtube_channel_id: c.author.channel_id.clone(),
            youtube_channel_url: c.author.channel_url.clone(),
            total_comments: c.total_comments,
            total_likes: c.total_likes,
            avg_likes_per_comment: c.avg_likes_per_comment,
            videos_commented_on: c.distinct_videos,
            engagement_score: c.engagement_score,
            first_comment: format_timestamp(c.first_seen),
            last_comment: format_timestamp(c.last_seen),
            sample_comments: c.sample_comments.clone(),
            instagram_profile,
            instagram_username,
            match_confidence,
            source,
            search_query_used,
        }
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(String::new, |t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Counts that are blank, negative, or not numbers read as zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let value = raw.trim().parse::<f64>().unwrap_or(0.0);
    if !value.is_finite() || value <= 0.0 {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value as u64;
    Ok(count)
}

/// Write `header` followed by one line per row.
pub(crate) fn write_csv<W: Write, T: Serialize>(
    writer: W,
    header: &[&str],
    rows: &[T],
) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// [`write_csv`] to a file, creating parent directories as needed.
pub(crate) fn write_csv_file<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: &[T],
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(BufWriter::new(file), header, rows)
        .with_context(|| format!("writing {}", path.display()))
}

/// Read every row that deserializes; log and skip the rest.
pub(crate) fn read_csv<R: Read, T: DeserializeOwned>(reader: R) -> Vec<T> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(row = i + 1, error = %e, "skipping malformed CSV row"),
        }
    }
    rows
}

pub(crate) fn read_csv_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(read_csv(BufReader::new(file)))
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;

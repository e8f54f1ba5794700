//! Per-commenter aggregation and engagement scoring.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use fanscout_core::{AuthorIdentity, CommentRecord, CommenterAggregate};

/// Number of comment texts kept in `sample_comments`.
pub const SAMPLE_COMMENT_COUNT: usize = 3;

/// Separator between sample comment texts.
pub const SAMPLE_SEPARATOR: &str = " | ";

const WEIGHT_COMMENTS: f64 = 0.4;
const WEIGHT_LIKES: f64 = 0.3;
const WEIGHT_VIDEOS: f64 = 0.2;
const WEIGHT_AVG_LIKES: f64 = 0.1;

/// Running totals for one identity triple while scanning the input.
struct Group<'a> {
    author: &'a AuthorIdentity,
    comments: u64,
    likes: u64,
    videos: HashSet<&'a str>,
    samples: Vec<&'a str>,
    first_seen: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
    bio_text: Option<&'a str>,
}

impl<'a> Group<'a> {
    fn new(author: &'a AuthorIdentity) -> Self {
        Self {
            author,
            comments: 0,
            likes: 0,
            videos: HashSet::new(),
            samples: Vec::with_capacity(SAMPLE_COMMENT_COUNT),
            first_seen: None,
            last_seen: None,
            bio_text: None,
        }
    }

    fn push(&mut self, record: &'a CommentRecord) {
        self.comments += 1;
        self.likes = self.likes.saturating_add(record.like_count());
        self.videos.insert(record.video_id());
        if self.samples.len() < SAMPLE_COMMENT_COUNT {
            self.samples.push(record.text());
        }
        if let Some(ts) = record.published_at() {
            self.first_seen = Some(self.first_seen.map_or(ts, |cur| cur.min(ts)));
            self.last_seen = Some(self.last_seen.map_or(ts, |cur| cur.max(ts)));
        }
        if self.bio_text.is_none() {
            self.bio_text = record.author_bio_text();
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_aggregate(self) -> CommenterAggregate {
        let avg_likes_per_comment = if self.comments == 0 {
            0.0
        } else {
            self.likes as f64 / self.comments as f64
        };
        let distinct_videos = self.videos.len() as u64;
        CommenterAggregate {
            author: self.author.clone(),
            total_comments: self.comments,
            total_likes: self.likes,
            avg_likes_per_comment,
            distinct_videos,
            sample_comments: self.samples.join(SAMPLE_SEPARATOR),
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            engagement_score: engagement_score(
                self.comments,
                self.likes,
                distinct_videos,
                avg_likes_per_comment,
            ),
            rank: 0,
            bio_text: self.bio_text.map(str::to_string),
        }
    }
}

/// Weighted engagement heuristic.
///
/// `0.4 * comments + 0.3 * likes + 0.2 * videos + 0.1 * avg_likes`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn engagement_score(
    total_comments: u64,
    total_likes: u64,
    distinct_videos: u64,
    avg_likes_per_comment: f64,
) -> f64 {
    WEIGHT_COMMENTS * total_comments as f64
        + WEIGHT_LIKES * total_likes as f64
        + WEIGHT_VIDEOS * distinct_videos as f64
        + WEIGHT_AVG_LIKES * avg_likes_per_comment
}

/// Aggregate `comments` per commenter and return the top `limit` by score.
///
/// Commenters are keyed by the full identity triple. Ties on score keep the
/// order in which each commenter first appeared in the input. Ranks are
/// assigned 1..K over all commenters before truncation, so the result of a
/// smaller `limit` is always a prefix of a larger one.
#[must_use]
pub fn rank(comments: &[CommentRecord], limit: usize) -> Vec<CommenterAggregate> {
    let mut index: HashMap<&AuthorIdentity, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for record in comments {
        let slot = *index.entry(record.author()).or_insert_with(|| {
            groups.push(Group::new(record.author()));
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    let mut aggregates: Vec<CommenterAggregate> =
        groups.into_iter().map(Group::into_aggregate).collect();

    // `sort_by` is stable: equal scores keep first-encountered order.
    aggregates.sort_by(|a, b| b.engagement_score.total_cmp(&a.engagement_score));

    for (position, aggregate) in aggregates.iter_mut().enumerate() {
        aggregate.rank = position + 1;
    }
    aggregates.truncate(limit);

    tracing::debug!(
        comments = comments.len(),
        returned = aggregates.len(),
        limit,
        "ranked commenters"
    );

    aggregates
}

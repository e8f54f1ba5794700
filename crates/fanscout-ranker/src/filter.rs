use chrono::{DateTime, Duration, Utc};
use fanscout_core::CommentRecord;

/// Keep only comments published within the last `days_back` days of `now`.
///
/// `days_back == 0` disables the filter. Records without a timestamp are
/// kept: a timestamp that failed to parse upstream should not cost the
/// commenter their engagement.
#[must_use]
pub fn filter_by_age(
    comments: Vec<CommentRecord>,
    days_back: u32,
    now: DateTime<Utc>,
) -> Vec<CommentRecord> {
    if days_back == 0 {
        return comments;
    }
    let cutoff = now - Duration::days(i64::from(days_back));
    let before = comments.len();
    let kept: Vec<CommentRecord> = comments
        .into_iter()
        .filter(|c| c.published_at().is_none_or(|ts| ts >= cutoff))
        .collect();
    tracing::debug!(
        days_back,
        before,
        after = kept.len(),
        "filtered comments by age"
    );
    kept
}

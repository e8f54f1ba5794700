//! Engagement ranking: groups raw comments per commenter, scores each
//! commenter, and returns them in rank order.

pub mod filter;
pub mod rank;

pub use filter::filter_by_age;
pub use rank::{engagement_score, rank, SAMPLE_COMMENT_COUNT, SAMPLE_SEPARATOR};

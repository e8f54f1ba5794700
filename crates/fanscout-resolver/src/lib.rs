//! Cross-platform profile resolution for ranked commenters.
//!
//! Each commenter goes through the same state machine: bio text first, then
//! a budgeted, paced search fallback scored by [`similarity::score`], and
//! finally a "not found" outcome. [`run::resolve_all`] drives a whole ranked
//! list and keeps the counts for the end-of-run summary.

pub mod bio;
pub mod budget;
pub mod error;
pub mod pacing;
pub mod resolver;
pub mod run;
pub mod search;
pub mod similarity;

pub use bio::extract_profile_links;
pub use budget::{SearchBudget, DEFAULT_SEARCH_BUDGET};
pub use error::SearchError;
pub use pacing::Pacer;
pub use resolver::{resolve_profile, search_queries, Resolution};
pub use run::{resolve_all, ResolutionReport, ResolutionSummary};
pub use search::{GoogleSearchClient, SearchCollaborator};
pub use similarity::score;

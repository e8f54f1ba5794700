//! Sequential resolution of a ranked commenter list.

use std::sync::atomic::{AtomicBool, Ordering};

use fanscout_core::{CommenterAggregate, ResolutionSource, ResolvedCommenter};

use crate::budget::SearchBudget;
use crate::pacing::Pacer;
use crate::resolver::resolve_profile;
use crate::search::SearchCollaborator;

/// Counts reported at the end of a resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub total: usize,
    pub found_via_bio: usize,
    pub found_via_search: usize,
    /// Commenters that consumed a unit of search budget.
    pub searched: usize,
    /// Commenters that wanted a search after the budget ran out.
    pub budget_skipped: usize,
    /// Individual queries sent. Up to three per searched commenter.
    pub queries_sent: usize,
    /// Individual queries that failed.
    pub search_errors: usize,
    /// `false` when no search collaborator was available.
    pub search_configured: bool,
}

impl ResolutionSummary {
    #[must_use]
    pub fn total_found(&self) -> usize {
        self.found_via_bio + self.found_via_search
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionReport {
    /// Resolved commenters in rank order. On cancellation this is the
    /// prefix that finished.
    pub resolved: Vec<ResolvedCommenter>,
    pub summary: ResolutionSummary,
    pub cancelled: bool,
}

/// Resolve every commenter in order, one at a time.
///
/// `cancel` is checked before each commenter; once set, the commenters
/// already resolved are returned and the rest are dropped. Pass `None` for
/// `search` to run bio-text resolution only.
pub async fn resolve_all<S>(
    commenters: Vec<CommenterAggregate>,
    search: Option<&S>,
    budget: &SearchBudget,
    pacer: &Pacer,
    cancel: &AtomicBool,
) -> ResolutionReport
where
    S: SearchCollaborator,
{
    let total = commenters.len();
    let mut summary = ResolutionSummary {
        search_configured: search.is_some(),
        ..ResolutionSummary::default()
    };
    let mut resolved = Vec::with_capacity(total);
    let mut cancelled = false;

    for (i, commenter) in commenters.into_iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            tracing::warn!(done = i, total, "resolution cancelled; keeping finished commenters");
            cancelled = true;
            break;
        }

        let bio_text = commenter.bio_text.clone();
        let resolution =
            resolve_profile(&commenter, bio_text.as_deref(), search, budget, pacer).await;
        let profile = resolution.profile;

        match profile.source {
            ResolutionSource::BioText => summary.found_via_bio += 1,
            ResolutionSource::Search => summary.found_via_search += 1,
            ResolutionSource::None => {}
        }
        if profile.search_attempted {
            summary.searched += 1;
        }
        if resolution.budget_exhausted {
            summary.budget_skipped += 1;
        }
        summary.queries_sent += resolution.queries_sent;
        summary.search_errors += resolution.failed_queries;

        tracing::info!(
            position = i + 1,
            total,
            commenter = %commenter.author.name,
            rank = commenter.rank,
            confidence = %profile.confidence,
            source = %profile.source,
            url = profile.url.as_deref().unwrap_or(""),
            "resolved commenter"
        );

        resolved.push(ResolvedCommenter { commenter, profile });
    }

    summary.total = resolved.len();
    ResolutionReport {
        resolved,
        summary,
        cancelled,
    }
}

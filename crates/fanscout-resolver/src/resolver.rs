//! Per-commenter resolution state machine.
//!
//! ```text
//! BioCheck ──found──▶ ResolvedProfile { high, bio_text }
//!    │ nothing
//!    ▼
//! SearchFallback ──match──▶ ResolvedProfile { high|medium, search }
//!    │ no budget / no match / every query failed
//!    ▼
//! Exhausted ──▶ ResolvedProfile { none, none }
//! ```

use fanscout_core::{CommenterAggregate, Confidence, ResolvedProfile};

use crate::bio::extract_profile_links;
use crate::budget::SearchBudget;
use crate::pacing::Pacer;
use crate::search::SearchCollaborator;
use crate::similarity::score;

/// Result of resolving one commenter, with the bookkeeping the run summary needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub profile: ResolvedProfile,
    /// Queries sent to the search collaborator, successful or not.
    pub queries_sent: usize,
    /// Queries that returned an error.
    pub failed_queries: usize,
    /// Search was configured and wanted but the budget had run out.
    pub budget_exhausted: bool,
}

impl Resolution {
    fn done(profile: ResolvedProfile) -> Self {
        Self {
            profile,
            queries_sent: 0,
            failed_queries: 0,
            budget_exhausted: false,
        }
    }
}

/// Build the search queries for a display name.
///
/// The name is cleaned of whitespace and `@` for the primary queries. When
/// the raw name differs (it had spaces or an `@`), it is tried last as a
/// quoted phrase.
#[must_use]
pub fn search_queries(display_name: &str) -> Vec<String> {
    let clean: String = display_name
        .chars()
        .filter(|c| *c != '@' && !c.is_whitespace())
        .collect();
    if clean.is_empty() {
        return Vec::new();
    }

    let mut queries = vec![
        format!("site:instagram.com \"{clean}\""),
        format!("site:instagram.com \"{clean}\" bio"),
    ];
    let phrase = display_name.trim().trim_start_matches('@').trim();
    if !phrase.is_empty() && phrase != clean {
        queries.push(format!("site:instagram.com \"{phrase}\""));
    }
    queries
}

/// Resolve one commenter to an Instagram profile.
///
/// Bio text is always consulted first and never costs budget. Search runs
/// only when the bio yields nothing, a collaborator is configured, and the
/// budget grants a unit. Collaborator errors are logged and treated as a
/// non-match for that query; they never escape this function.
pub async fn resolve_profile<S>(
    commenter: &CommenterAggregate,
    bio_text: Option<&str>,
    search: Option<&S>,
    budget: &SearchBudget,
    pacer: &Pacer,
) -> Resolution
where
    S: SearchCollaborator,
{
    let name = commenter.author.name.as_str();

    if let Some(bio) = bio_text.filter(|b| !b.trim().is_empty()) {
        if let Some(first) = extract_profile_links(bio).first() {
            tracing::debug!(commenter = %name, handle = %first.handle, "profile found in bio text");
            return Resolution::done(ResolvedProfile::from_bio(first));
        }
    }

    let Some(search) = search else {
        return Resolution::done(ResolvedProfile::not_found(false));
    };

    let queries = search_queries(name);
    if queries.is_empty() {
        tracing::debug!(commenter = %name, "display name is empty after cleaning; skipping search");
        return Resolution::done(ResolvedProfile::not_found(false));
    }

    if !budget.try_acquire() {
        tracing::debug!(commenter = %name, "search budget exhausted");
        return Resolution {
            profile: ResolvedProfile::not_found(false),
            queries_sent: 0,
            failed_queries: 0,
            budget_exhausted: true,
        };
    }

    let mut queries_sent = 0;
    let mut failed_queries = 0;
    for query in &queries {
        pacer.wait().await;
        queries_sent += 1;
        let candidates = match search.query(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(commenter = %name, query = %query, error = %e, "search query failed");
                failed_queries += 1;
                continue;
            }
        };

        for candidate in &candidates {
            let confidence = score(name, &candidate.handle);
            tracing::debug!(
                commenter = %name,
                handle = %candidate.handle,
                confidence = %confidence,
                "scored search candidate"
            );
            if confidence != Confidence::None {
                return Resolution {
                    profile: ResolvedProfile::from_search(candidate, confidence, query),
                    queries_sent,
                    failed_queries,
                    budget_exhausted: false,
                };
            }
        }
    }

    Resolution {
        profile: ResolvedProfile::not_found(true),
        queries_sent,
        failed_queries,
        budget_exhausted: false,
    }
}

//! Instagram handle extraction from channel descriptions.

use std::collections::HashSet;
use std::sync::LazyLock;

use fanscout_core::{CandidateOrigin, ProfileCandidate};
use regex::Regex;

/// Profile URL, `@mention`, `ig:` label, or `insta:` label, in one pass so
/// matches come out in text order.
static HANDLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:instagram\.com/|@|ig:\s*|insta:\s*)([a-z0-9_.]+)").expect("valid regex")
});

/// Canonical profile URL for a handle.
#[must_use]
pub fn canonical_profile_url(handle: &str) -> String {
    format!("https://instagram.com/{handle}")
}

/// Scan free-form bio text for Instagram handles.
///
/// Returns candidates in order of first appearance, de-duplicated by handle
/// (case-insensitively, keeping the first spelling). Every hit is rewritten
/// to `https://instagram.com/<handle>` whichever pattern matched.
///
/// This over-matches on purpose: an `@mention` of somebody else or an email
/// address will show up as a candidate too.
#[must_use]
pub fn extract_profile_links(bio_text: &str) -> Vec<ProfileCandidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for cap in HANDLE_PATTERN.captures_iter(bio_text) {
        let Some(m) = cap.get(1) else { continue };
        // Sentence punctuation: "follow @jane." should yield "jane".
        let handle = m.as_str().trim_end_matches('.');
        if handle.is_empty() {
            continue;
        }
        if !seen.insert(handle.to_lowercase()) {
            continue;
        }
        candidates.push(ProfileCandidate {
            url: canonical_profile_url(handle),
            handle: handle.to_string(),
            origin: CandidateOrigin::BioText,
            title: None,
            snippet: None,
        });
    }

    candidates
}

//! Handle similarity tiers.

use std::collections::HashSet;

use fanscout_core::Confidence;

/// Share of the target's characters that must also appear in the candidate
/// for a [`Confidence::Medium`] match.
const CHAR_OVERLAP_THRESHOLD: f64 = 0.5;

/// Lowercase and drop `@` and whitespace.
fn clean(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '@' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '.' | '_' | '-')).collect()
}

/// Compare a commenter's display name against a candidate handle.
///
/// Rules, first match wins:
///
/// 1. cleaned strings equal → `High`
/// 2. one cleaned string contains the other → `High`
/// 3. equal once `.`, `_` and `-` are removed → `High`
/// 4. more than half of the target's length is covered by characters the
///    candidate also uses (set overlap, ignoring order and repeats) → `Medium`
/// 5. otherwise → `None`
///
/// Rule 4 is crude and produces false positives for short or common-letter
/// names. Two inputs that both clean to an empty string are equal under
/// rule 1; if only one side cleans to empty, the result is `None`.
#[must_use]
pub fn score(target_identity: &str, candidate_handle: &str) -> Confidence {
    let target = clean(target_identity);
    let candidate = clean(candidate_handle);

    if target == candidate {
        return Confidence::High;
    }
    // An empty side would be a substring of anything under rule 2.
    if target.is_empty() || candidate.is_empty() {
        return Confidence::None;
    }
    if target.contains(&candidate) || candidate.contains(&target) {
        return Confidence::High;
    }
    if strip_separators(&target) == strip_separators(&candidate) {
        return Confidence::High;
    }

    let target_chars: HashSet<char> = target.chars().collect();
    let candidate_chars: HashSet<char> = candidate.chars().collect();
    #[allow(clippy::cast_precision_loss)]
    let (shared, needed) = (
        target_chars.intersection(&candidate_chars).count() as f64,
        target.chars().count() as f64 * CHAR_OVERLAP_THRESHOLD,
    );
    if shared > needed {
        return Confidence::Medium;
    }

    Confidence::None
}

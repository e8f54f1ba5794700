use reqwest::Url;

/// First path segments that are Instagram pages, not user profiles.
const NON_PROFILE_SEGMENTS: &[&str] = &[
    "p", "reel", "reels", "tv", "explore", "stories", "accounts", "direct", "about", "legal",
];

/// Extract the profile handle from an Instagram URL.
///
/// Accepts `instagram.com` and its subdomains. Post, reel, and TV permalinks
/// and other non-profile pages return `None`, as do handles with characters
/// Instagram does not allow.
#[must_use]
pub fn profile_handle_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    if host != "instagram.com" && !host.ends_with(".instagram.com") {
        return None;
    }

    let first = parsed.path_segments()?.find(|s| !s.is_empty())?;
    if NON_PROFILE_SEGMENTS
        .iter()
        .any(|reserved| first.eq_ignore_ascii_case(reserved))
    {
        return None;
    }

    let valid = first
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    valid.then(|| first.to_string())
}

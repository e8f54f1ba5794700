//! Channel URL parsing.

use percent_encoding::percent_decode_str;
use reqwest::Url;

use crate::error::YoutubeError;

/// The ways a channel can be addressed in a `YouTube` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// `/channel/<UC...>`; usable as-is.
    Id(String),
    /// `/@handle`, stored without the `@`.
    Handle(String),
    /// Legacy `/c/<name>` custom URL.
    CustomName(String),
    /// Legacy `/user/<name>` URL.
    Username(String),
}

impl ChannelRef {
    /// Text to use when looking the channel up by name.
    #[must_use]
    pub fn lookup_name(&self) -> &str {
        match self {
            ChannelRef::Id(s)
            | ChannelRef::Handle(s)
            | ChannelRef::CustomName(s)
            | ChannelRef::Username(s) => s,
        }
    }
}

/// Parse a channel URL into a [`ChannelRef`].
///
/// A missing scheme is tolerated (`youtube.com/@name`). Trailing path
/// segments such as `/videos` or `/featured` are ignored. Segments are
/// percent-decoded, so `/@caf%C3%A9` yields the handle `café`.
///
/// # Errors
///
/// Returns [`YoutubeError::InvalidChannelUrl`] when the host is not
/// `youtube.com` or the path matches none of the supported forms.
pub fn parse_channel_url(raw: &str) -> Result<ChannelRef, YoutubeError> {
    let invalid = || YoutubeError::InvalidChannelUrl(raw.to_string());
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return Err(invalid());
    }

    let decoded = url
        .path_segments()
        .map(|s| {
            s.filter(|seg| !seg.is_empty())
                .map(|seg| percent_decode_str(seg).decode_utf8())
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map_err(|_| invalid())?
        .unwrap_or_default();
    let segments: Vec<&str> = decoded.iter().map(|seg| &**seg).collect();

    let parsed = match segments.as_slice() {
        [first, ..] if first.starts_with('@') && first.len() > 1 => {
            ChannelRef::Handle(first.trim_start_matches('@').to_string())
        }
        ["channel", id, ..] => ChannelRef::Id((*id).to_string()),
        ["c", name, ..] => ChannelRef::CustomName((*name).to_string()),
        ["user", name, ..] => ChannelRef::Username((*name).to_string()),
        _ => return Err(invalid()),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_url() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/channel/UCabc123").unwrap(),
            ChannelRef::Id("UCabc123".to_string())
        );
    }

    #[test]
    fn handle_url_with_trailing_tab() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/@SurfDaily/videos").unwrap(),
            ChannelRef::Handle("SurfDaily".to_string())
        );
    }

    #[test]
    fn legacy_forms() {
        assert_eq!(
            parse_channel_url("https://youtube.com/c/SurfDaily").unwrap(),
            ChannelRef::CustomName("SurfDaily".to_string())
        );
        assert_eq!(
            parse_channel_url("https://youtube.com/user/surfdaily").unwrap(),
            ChannelRef::Username("surfdaily".to_string())
        );
    }

    #[test]
    fn non_ascii_handle_is_decoded() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/@café").unwrap(),
            ChannelRef::Handle("café".to_string())
        );
        assert_eq!(
            parse_channel_url("https://www.youtube.com/@caf%C3%A9/videos").unwrap(),
            ChannelRef::Handle("café".to_string())
        );
    }

    #[test]
    fn non_ascii_custom_name_is_decoded() {
        assert_eq!(
            parse_channel_url("https://youtube.com/c/%E3%82%B5%E3%83%BC%E3%83%95").unwrap(),
            ChannelRef::CustomName("サーフ".to_string())
        );
    }

    #[test]
    fn invalid_utf8_segment_is_rejected() {
        assert!(matches!(
            parse_channel_url("https://youtube.com/@%FF%FE"),
            Err(YoutubeError::InvalidChannelUrl(_))
        ));
    }

    #[test]
    fn scheme_is_optional() {
        assert_eq!(
            parse_channel_url("youtube.com/@kai").unwrap(),
            ChannelRef::Handle("kai".to_string())
        );
    }

    #[test]
    fn mobile_host_is_accepted() {
        assert!(parse_channel_url("https://m.youtube.com/@kai").is_ok());
    }

    #[test]
    fn rejects_other_hosts_and_paths() {
        for url in [
            "https://vimeo.com/@kai",
            "https://www.youtube.com/watch?v=abc",
            "https://www.youtube.com/",
            "https://www.youtube.com/@",
            "not a url at all",
        ] {
            assert!(
                matches!(parse_channel_url(url), Err(YoutubeError::InvalidChannelUrl(_))),
                "{url} should be rejected"
            );
        }
    }
}

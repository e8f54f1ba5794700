use thiserror::Error;

/// Errors from a search collaborator.
///
/// The resolver never propagates these; a failed query counts as a non-match
/// for the commenter being resolved.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("rate limited by search provider")]
    RateLimited,

    #[error("unexpected HTTP status {status} from search provider")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid search base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

use thiserror::Error;

/// Errors returned by the `YouTube` Data API client.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response that is not a quota rejection.
    #[error("YouTube API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Daily quota spent. Never retried.
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported channel URL \"{0}\"; expected /channel/<id>, /@handle, /c/<name> or /user/<name>")]
    InvalidChannelUrl(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    #[error("invalid YouTube base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

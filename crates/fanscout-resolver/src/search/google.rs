//! Google Custom Search JSON API client.

use std::time::Duration;

use fanscout_core::{CandidateOrigin, ProfileCandidate, SearchCredentials};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::instagram::profile_handle_from_url;
use super::SearchCollaborator;
use crate::error::SearchError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
    title: Option<String>,
    snippet: Option<String>,
}

/// Client for the Custom Search JSON API, scoped to Instagram profiles.
///
/// One HTTP request per [`SearchCollaborator::query`] call and no retries:
/// every request spends daily quota, and pacing is the caller's job.
pub struct GoogleSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: Url,
    results_per_query: u32,
}

impl GoogleSearchClient {
    /// Creates a client pointed at the production Custom Search endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credentials: &SearchCredentials,
        timeout_secs: u64,
        user_agent: &str,
        results_per_query: u32,
    ) -> Result<Self, SearchError> {
        Self::with_base_url(
            credentials,
            timeout_secs,
            user_agent,
            results_per_query,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`SearchError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        credentials: &SearchCredentials,
        timeout_secs: u64,
        user_agent: &str,
        results_per_query: u32,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let base_url = Url::parse(base_url).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            api_key: credentials.api_key.clone(),
            engine_id: credentials.engine_id.clone(),
            base_url,
            results_per_query,
        })
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id)
            .append_pair("q", query)
            .append_pair("num", &self.results_per_query.to_string());
        url
    }

    async fn search(&self, query: &str) -> Result<Vec<ProfileCandidate>, SearchError> {
        let url = self.build_url(query);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        let body = response.text().await?;
        if status == StatusCode::FORBIDDEN && is_quota_error(&body) {
            return Err(SearchError::QuotaExceeded(quota_message(&body)));
        }
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: format!("customsearch(q={query})"),
                source: e,
            })?;

        let candidates = to_candidates(parsed.items);
        tracing::debug!(query, candidates = candidates.len(), "search returned");
        Ok(candidates)
    }
}

impl SearchCollaborator for GoogleSearchClient {
    async fn query(&self, text: &str) -> Result<Vec<ProfileCandidate>, SearchError> {
        self.search(text).await
    }
}

/// Keep only items that link to an Instagram profile page.
fn to_candidates(items: Vec<SearchItem>) -> Vec<ProfileCandidate> {
    items
        .into_iter()
        .filter_map(|item| {
            let handle = profile_handle_from_url(&item.link)?;
            Some(ProfileCandidate {
                url: item.link,
                handle,
                origin: CandidateOrigin::SearchResult,
                title: item.title,
                snippet: item.snippet,
            })
        })
        .collect()
}

fn is_quota_error(body: &str) -> bool {
    body.contains("dailyLimitExceeded")
        || body.contains("quotaExceeded")
        || body.contains("rateLimitExceeded")
}

fn quota_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "daily limit reached".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GoogleSearchClient {
        let creds = SearchCredentials {
            api_key: "test-key".to_string(),
            engine_id: "cx-1".to_string(),
        };
        GoogleSearchClient::with_base_url(&creds, 30, "test-agent", 5, "https://example.test/cs")
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_includes_all_parameters() {
        let url = test_client().build_url("site:instagram.com \"jane\"");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), "test-key".to_string()),
                ("cx".to_string(), "cx-1".to_string()),
                ("q".to_string(), "site:instagram.com \"jane\"".to_string()),
                ("num".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn to_candidates_drops_non_profile_links() {
        let items = vec![
            SearchItem {
                link: "https://www.instagram.com/p/abc/".to_string(),
                title: None,
                snippet: None,
            },
            SearchItem {
                link: "https://www.instagram.com/jane/".to_string(),
                title: Some("Jane (@jane)".to_string()),
                snippet: None,
            },
            SearchItem {
                link: "https://example.com/jane".to_string(),
                title: None,
                snippet: None,
            },
        ];
        let out = to_candidates(items);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].handle, "jane");
        assert_eq!(out[0].origin, CandidateOrigin::SearchResult);
        assert_eq!(out[0].title.as_deref(), Some("Jane (@jane)"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let creds = SearchCredentials {
            api_key: "k".to_string(),
            engine_id: "c".to_string(),
        };
        let result = GoogleSearchClient::with_base_url(&creds, 30, "ua", 5, "not a url");
        assert!(matches!(result, Err(SearchError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn quota_message_reads_error_message() {
        let body = r#"{"error":{"code":403,"message":"Daily Limit Exceeded","errors":[{"reason":"dailyLimitExceeded"}]}}"#;
        assert!(is_quota_error(body));
        assert_eq!(quota_message(body), "Daily Limit Exceeded");
    }
}

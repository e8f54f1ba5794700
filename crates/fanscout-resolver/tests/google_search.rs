//! Integration tests for `GoogleSearchClient` using wiremock HTTP mocks.

use fanscout_core::{CandidateOrigin, SearchCredentials};
use fanscout_resolver::{GoogleSearchClient, SearchCollaborator, SearchError};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GoogleSearchClient {
    let credentials = SearchCredentials {
        api_key: "test-key".to_string(),
        engine_id: "test-cx".to_string(),
    };
    GoogleSearchClient::with_base_url(&credentials, 30, "fanscout-test", 5, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn query_returns_profile_candidates() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "kind": "customsearch#search",
        "items": [
            {
                "link": "https://www.instagram.com/p/C1a2b3/",
                "title": "Post by jane",
                "snippet": "a post"
            },
            {
                "link": "https://www.instagram.com/jane_doe/",
                "title": "Jane Doe (@jane_doe) • Instagram photos and videos",
                "snippet": "1,204 Followers"
            },
            {
                "link": "https://www.instagram.com/janedoe.art/"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(query_param("key", "test-key"))
        .and(query_param("cx", "test-cx"))
        .and(query_param("q", "site:instagram.com \"jane_doe\""))
        .and(query_param("num", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client
        .query("site:instagram.com \"jane_doe\"")
        .await
        .expect("should parse results");

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].handle, "jane_doe");
    assert_eq!(candidates[0].url, "https://www.instagram.com/jane_doe/");
    assert_eq!(candidates[0].origin, CandidateOrigin::SearchResult);
    assert_eq!(candidates[0].snippet.as_deref(), Some("1,204 Followers"));
    assert_eq!(candidates[1].handle, "janedoe.art");
    assert!(candidates[1].title.is_none());
}

#[tokio::test]
async fn response_without_items_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "kind": "customsearch#search" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client.query("nobody").await.expect("should parse");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn daily_limit_maps_to_quota_exceeded() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": 403,
            "message": "Quota exceeded for quota metric 'Queries' and limit 'Queries per day'",
            "errors": [{ "reason": "quotaExceeded", "domain": "usageLimits" }]
        }
    });

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.query("jane").await.expect_err("quota should fail");
    match err {
        SearchError::QuotaExceeded(message) => assert!(message.contains("Queries per day")),
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_without_quota_reason_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.query("jane").await.expect_err("403 should fail");
    assert!(matches!(err, SearchError::UnexpectedStatus { status: 403 }));
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.query("jane").await.expect_err("429 should fail");
    assert!(matches!(err, SearchError::RateLimited));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.query("jane").await.expect_err("500 should fail");
    assert!(matches!(err, SearchError::UnexpectedStatus { status: 500 }));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.query("jane").await.expect_err("html should fail");
    assert!(matches!(err, SearchError::Deserialize { .. }));
}

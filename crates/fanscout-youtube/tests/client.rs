//! Integration tests for `YoutubeClient` using wiremock HTTP mocks.

use fanscout_youtube::{ChannelRef, YoutubeClient, YoutubeError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 30, "fanscout-test", base_url)
        .expect("client construction should not fail")
        .with_retry(0, 0)
}

fn comment(id: &str, author: &str, channel: Option<&str>, text: &str, likes: u64) -> serde_json::Value {
    let mut snippet = json!({
        "authorDisplayName": author,
        "textDisplay": text,
        "likeCount": likes,
        "publishedAt": "2024-05-01T10:00:00Z"
    });
    if let Some(channel) = channel {
        snippet["authorChannelId"] = json!({ "value": channel });
    }
    json!({ "id": id, "snippet": snippet })
}

async fn mount_channel(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "surfdaily"))
        .and(query_param("type", "channel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": { "kind": "youtube#channel", "channelId": "UCsurf" } }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("part", "contentDetails"))
        .and(query_param("id", "UCsurf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UCsurf",
                "contentDetails": { "relatedPlaylists": { "uploads": "UUsurf" } }
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UUsurf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "snippet": { "title": "Big swell", "publishedAt": "2024-05-01T00:00:00Z",
                               "resourceId": { "videoId": "vid1" } } },
                { "snippet": { "title": "Flat day", "publishedAt": "2024-04-20T00:00:00Z",
                               "resourceId": { "videoId": "vid2" } } }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_channel_comments_harvests_threads_replies_and_bios() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "vid1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "snippet": { "topLevelComment": comment("c1", "Jane", Some("UCjane"), "great wave", 4) },
                "replies": { "comments": [comment("c1.r1", "Kai", Some("UCkai"), "agreed", 1)] }
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "vid2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "snippet": { "topLevelComment": comment("c2", "Jane", Some("UCjane"), "again!", 0) } },
                { "snippet": { "topLevelComment": comment("c3", "Ghost", None, "boo", 0) } }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("part", "snippet"))
        .and(query_param("id", "UCjane,UCkai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "UCjane", "snippet": { "description": "surf photos | ig: jane.surfs" } },
                { "id": "UCkai", "snippet": { "description": "" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .fetch_channel_comments("https://www.youtube.com/@surfdaily", 10, 0)
        .await
        .expect("harvest should succeed");

    let ids: Vec<&str> = records.iter().map(|r| r.comment_id()).collect();
    assert_eq!(ids, vec!["c1", "c1.r1", "c2", "c3"]);

    let jane = &records[0];
    assert_eq!(jane.author().name, "Jane");
    assert_eq!(jane.author().channel_id, "UCjane");
    assert_eq!(jane.author().channel_url, "https://youtube.com/channel/UCjane");
    assert_eq!(jane.like_count(), 4);
    assert_eq!(jane.video_id(), "vid1");
    assert_eq!(jane.author_bio_text(), Some("surf photos | ig: jane.surfs"));
    assert!(jane.published_at().is_some());

    assert!(records[1].author_bio_text().is_none(), "blank description is no bio");
    assert_eq!(records[3].author().channel_url, "");
}

#[tokio::test]
async fn bios_are_fetched_only_for_authors_inside_the_age_window() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    let recent = (chrono::Utc::now() - chrono::Duration::days(2)).to_rfc3339();
    let mut fresh = comment("c1", "Jane", Some("UCjane"), "fresh", 0);
    fresh["snippet"]["publishedAt"] = json!(recent);
    let mut stale = comment("c2", "Old", Some("UCold"), "stale", 0);
    stale["snippet"]["publishedAt"] = json!("2020-01-01T00:00:00Z");

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "snippet": { "topLevelComment": fresh } },
                { "snippet": { "topLevelComment": stale } }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("part", "snippet"))
        .and(query_param("id", "UCjane"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "UCjane", "snippet": { "description": "ig: jane.surfs" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .fetch_channel_comments("https://www.youtube.com/@surfdaily", 1, 30)
        .await
        .expect("harvest should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].comment_id(), "c1");
    assert_eq!(records[0].author_bio_text(), Some("ig: jane.surfs"));

    let bio_lookups: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| {
            r.url.path() == "/channels"
                && r.url.query_pairs().any(|(k, v)| k == "part" && v == "snippet")
        })
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "id")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(bio_lookups, vec!["UCjane".to_string()]);
}

#[tokio::test]
async fn video_with_comments_disabled_is_skipped() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "vid1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The video identified by the videoId parameter has disabled comments.",
                "errors": [{ "reason": "commentsDisabled" }]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "vid2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "snippet": { "topLevelComment": comment("c9", "Kai", None, "first", 0) } }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .fetch_channel_comments("https://www.youtube.com/@surfdaily", 2, 0)
        .await
        .expect("one bad video should not fail the harvest");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].video_id(), "vid2");
}

#[tokio::test]
async fn quota_exceeded_aborts_harvest() {
    let server = MockServer::start().await;
    mount_channel(&server).await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "quota spent",
                "errors": [{ "reason": "quotaExceeded" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_channel_comments("https://www.youtube.com/@surfdaily", 2, 0)
        .await
        .expect_err("quota should abort");
    assert!(matches!(err, YoutubeError::QuotaExceeded(ref m) if m == "quota spent"));
}

#[tokio::test]
async fn comment_pages_follow_next_page_token_until_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "snippet": { "topLevelComment": comment("b", "Kai", None, "two", 0) } }],
            "nextPageToken": "p3"
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "snippet": { "topLevelComment": comment("a", "Jane", None, "one", 0) } }],
            "nextPageToken": "p2"
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("part", "contentDetails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "UCx", "contentDetails": { "relatedPlaylists": { "uploads": "UUx" } } }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "snippet": { "title": "t", "resourceId": { "videoId": "v" } } }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_comments_per_video(2);
    let records = client
        .fetch_channel_comments("https://www.youtube.com/channel/UCx", 1, 0)
        .await
        .expect("harvest should succeed");

    let ids: Vec<&str> = records.iter().map(|r| r.comment_id()).collect();
    assert_eq!(ids, vec!["a", "b"], "stops at the cap even with a next page");
}

#[tokio::test]
async fn unknown_username_is_channel_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("forUsername", "nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pageInfo": {} })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .resolve_channel_id(&ChannelRef::Username("nobody".to_string()))
        .await
        .expect_err("empty lookup should fail");
    assert!(matches!(err, YoutubeError::ChannelNotFound(ref n) if n == "nobody"));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "UCx", "contentDetails": { "relatedPlaylists": { "uploads": "UUx" } } }]
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = YoutubeClient::with_base_url("test-key", 30, "fanscout-test", &server.uri())
        .expect("client construction should not fail")
        .with_retry(2, 0);
    let uploads = client
        .uploads_playlist_id("UCx")
        .await
        .expect("should succeed after one retry");
    assert_eq!(uploads, "UUx");
}

#[tokio::test]
async fn invalid_channel_url_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    let err = client
        .fetch_channel_comments("https://example.com/@surfdaily", 1, 0)
        .await
        .expect_err("bad url");
    assert!(matches!(err, YoutubeError::InvalidChannelUrl(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

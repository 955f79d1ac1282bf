//! Reddit client tests
//!
//! Exercises the client against a mock Reddit API.

use episode_finder::source::{RedditClient, RedditError, SubmissionSource};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn child(i: usize, title: &str) -> serde_json::Value {
    json!({
        "kind": "t3",
        "data": {
            "title": title,
            "created_utc": 1_619_856_000.0 + i as f64 * 604_800.0,
            "num_comments": 100 + i,
            "url": format!("https://www.reddit.com/r/testshow/comments/{}/", i)
        }
    })
}

fn listing(titles: &[&str]) -> serde_json::Value {
    let children: Vec<serde_json::Value> =
        titles.iter().enumerate().map(|(i, title)| child(i, title)).collect();

    json!({"kind": "Listing", "data": {"after": null, "children": children}})
}

/// A page of `count` generated episode threads starting at `offset`
fn page(offset: usize, count: usize, after: Option<&str>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = (offset..offset + count)
        .map(|i| child(i, &format!("Episode {} Discussion", i + 1)))
        .collect();

    json!({"kind": "Listing", "data": {"after": after, "children": children}})
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(basic_auth("client-id", "client-secret"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> RedditClient {
    RedditClient::new("client-id", "client-secret", "episode-finder/test")
        .with_base_urls(server.uri(), server.uri())
        .with_retry_policy(Duration::from_secs(5), 0)
}

// =============================================================================
// Successful Searches
// =============================================================================

#[tokio::test]
async fn test_search_returns_submissions() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .and(query_param("q", "episode discussion"))
        .and(query_param("restrict_sr", "1"))
        .and(query_param("limit", "100"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("user-agent", "episode-finder/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(&["S01E01 Discussion", "S01E02 Discussion"])),
        )
        .mount(&server)
        .await;

    let submissions = client(&server).search("testshow", 200).await.unwrap();

    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].title, "S01E01 Discussion");
    assert_eq!(submissions[0].created_utc.timestamp(), 1_619_856_000);
    assert_eq!(submissions[1].comment_count, 101);
    assert!(submissions[1].url.ends_with("/1/"));
}

#[tokio::test]
async fn test_search_follows_cursor_across_pages() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .and(query_param("limit", "50"))
        .and(query_param("after", "t3_page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(100, 50, Some("t3_page3"))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 100, Some("t3_page2"))))
        .expect(1)
        .mount(&server)
        .await;

    let submissions = client(&server).search("testshow", 150).await.unwrap();

    assert_eq!(submissions.len(), 150);
    assert_eq!(submissions[0].title, "Episode 1 Discussion");
    assert_eq!(submissions[149].title, "Episode 150 Discussion");
}

#[tokio::test]
async fn test_search_stops_when_listing_ends() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 30, None)))
        .expect(1)
        .mount(&server)
        .await;

    let submissions = client(&server).search("testshow", 200).await.unwrap();
    assert_eq!(submissions.len(), 30);
}

#[tokio::test]
async fn test_limit_is_clamped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "test-token"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0, 100, Some("t3_more"))))
        .expect(10)
        .mount(&server)
        .await;

    let submissions = client(&server).search("testshow", 5000).await.unwrap();
    assert_eq!(submissions.len(), 1000);
}

#[tokio::test]
async fn test_custom_search_query() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .and(query_param("q", "discussion thread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["Episode 1"])))
        .mount(&server)
        .await;

    let submissions = client(&server)
        .with_search_query("discussion thread")
        .fetch("testshow", 10)
        .await
        .unwrap();
    assert_eq!(submissions.len(), 1);
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_rejected_credentials_are_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).search("testshow", 10).await.unwrap_err();
    assert!(matches!(err, RedditError::Unauthorized));
}

#[tokio::test]
async fn test_error_body_on_token_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let err = client(&server).search("testshow", 10).await.unwrap_err();
    assert!(matches!(err, RedditError::Unauthorized));
}

#[tokio::test]
async fn test_unknown_community_is_not_found() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/nosuchshow/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).search("nosuchshow", 10).await.unwrap_err();
    match err {
        RedditError::NotFound(community) => assert_eq!(community, "nosuchshow"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client(&server).search("testshow", 10).await.unwrap_err();
    match err {
        RedditError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_listing_is_parse_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client(&server).search("testshow", 10).await.unwrap_err();
    assert!(matches!(err, RedditError::Parse(_)));
}

#[tokio::test]
async fn test_invalid_community_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server).search("../api/v1/me", 10).await.unwrap_err();
    assert!(matches!(err, RedditError::InvalidCommunity(_)));
}

#[tokio::test]
async fn test_rate_limit_on_last_attempt_returns_without_waiting() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // No Retry-After header: the hint defaults to 60 seconds
    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        client(&server).search("testshow", 10),
    )
    .await
    .expect("rate limit on the final attempt should not sleep");

    assert!(matches!(result, Err(RedditError::RateLimit { retry_after_secs: 60 })));
}

#[tokio::test]
async fn test_rate_limit_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["S01E01 Discussion"])))
        .expect(1)
        .mount(&server)
        .await;

    let submissions = RedditClient::new("client-id", "client-secret", "episode-finder/test")
        .with_base_urls(server.uri(), server.uri())
        .with_retry_policy(Duration::from_secs(5), 1)
        .search("testshow", 10)
        .await
        .unwrap();
    assert_eq!(submissions.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_surfaces_after_retries() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/testshow/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .mount(&server)
        .await;

    let err = client(&server).search("testshow", 10).await.unwrap_err();
    assert!(matches!(err, RedditError::RateLimit { retry_after_secs: 0 }));
}

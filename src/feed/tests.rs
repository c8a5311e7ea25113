use std::collections::HashMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::ArcStr;
use crate::feed::{Feed, Project, normalize_projects};
use crate::log::Log;
use crate::net::{Net, Response, mock::Mock};

const URL: &str = "http://localhost:8000/projects.json";
const TTL: Duration = Duration::from_secs(300);

fn project(label: &str, url: &str) -> Project {
    Project {
        label: ArcStr::from(label),
        url: ArcStr::from(url),
    }
}

fn response(status: u16, body: &str) -> Response {
    Response {
        status,
        body: ArcStr::from(body),
        last_modified: None,
    }
}

fn feed_with(mock: Mock) -> Feed {
    Feed::spawn(Net::Mock(mock), Log::mock(), ArcStr::from(URL), TTL)
}

fn mock_serving(body: &str) -> Mock {
    Mock::new(HashMap::from([(ArcStr::from(URL), response(200, body))]))
}

#[test]
fn array_entries_follow_fallback_precedence() {
    let json = json!([
        { "label": "Explicit", "url": "https://a", "href": "https://ignored" },
        { "url": "https://b" },
        { "href": "https://c" },
        { "label": "Label only" },
    ]);

    assert_eq!(
        normalize_projects(&json),
        vec![
            project("Explicit", "https://a"),
            project("https://b", "https://b"),
            project("https://c", "https://c"),
            project("Label only", "#"),
        ]
    );
}

#[test]
fn entries_without_any_usable_field_are_dropped() {
    let json = json!([
        { "description": "no link here" },
        { "label": "", "url": "", "href": "" },
        42,
        null,
        { "label": "kept", "url": "https://kept" },
    ]);

    assert_eq!(normalize_projects(&json), vec![project("kept", "https://kept")]);
}

#[test]
fn mapping_input_keeps_iteration_order() {
    let json = serde_json::from_str(r#"{ "zeta": "u1", "alpha": "u2" }"#).unwrap();

    assert_eq!(
        normalize_projects(&json),
        vec![project("zeta", "u1"), project("alpha", "u2")]
    );
}

#[test]
fn non_list_inputs_normalize_to_empty() {
    assert!(normalize_projects(&json!(null)).is_empty());
    assert!(normalize_projects(&json!("a string")).is_empty());
    assert!(normalize_projects(&json!(7)).is_empty());
    assert!(normalize_projects(&json!(true)).is_empty());
}

#[tokio::test]
async fn valid_cache_skips_the_network() {
    let mock = mock_serving(r#"[{ "label": "a", "url": "https://a" }]"#);
    let feed = feed_with(mock.clone());

    let first = feed.fetch().await;
    let second = feed.fetch().await;

    assert_eq!(mock.request_count(), 1);
    assert_eq!(first, second);
    assert_eq!(first.list, Some(vec![project("a", "https://a")]));
}

#[tokio::test(start_paused = true)]
async fn expired_cache_refetches() {
    let mock = mock_serving(r#"[{ "label": "a", "url": "https://a" }]"#);
    let feed = feed_with(mock.clone());

    feed.fetch().await;
    tokio::time::advance(TTL + Duration::from_secs(1)).await;
    feed.fetch().await;

    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn invalidate_forces_a_fresh_request() {
    let mock = mock_serving(r#"[{ "label": "a", "url": "https://a" }]"#);
    let feed = feed_with(mock.clone());

    feed.fetch().await;
    feed.invalidate().await;
    feed.fetch().await;

    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn empty_lists_are_never_cached() {
    let mock = mock_serving("[]");
    let feed = feed_with(mock.clone());

    let first = feed.fetch().await;
    feed.fetch().await;

    assert_eq!(first.list, Some(Vec::new()));
    assert!(first.error.is_none());
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn transport_failure_yields_error_result_and_leaves_cache_empty() {
    let mock = Mock::empty();
    let feed = feed_with(mock.clone());

    let failed = feed.fetch().await;
    assert!(failed.list.is_none());
    assert!(failed.error.is_some());

    // A later successful fetch is not shadowed by the failed attempt.
    mock.set_response(
        ArcStr::from(URL),
        response(200, r#"[{ "label": "a", "url": "https://a" }]"#),
    );
    let recovered = feed.fetch().await;
    assert_eq!(recovered.list, Some(vec![project("a", "https://a")]));
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let mock = mock_serving("irrelevant");
    mock.set_response(ArcStr::from(URL), response(503, "oops"));
    let feed = feed_with(mock.clone());

    let result = feed.fetch().await;
    assert!(result.list.is_none());
    assert_eq!(result.error.as_deref(), Some("HTTP 503"));
    // Failures are not cached.
    feed.fetch().await;
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn malformed_json_is_a_failure() {
    let mock = mock_serving("][ not json");
    let feed = feed_with(mock);

    let result = feed.fetch().await;
    assert!(result.list.is_none());
    assert!(result.error.unwrap().starts_with("invalid JSON"));
}

#[tokio::test]
async fn timestamp_prefers_the_last_modified_header() {
    let modified = Utc.with_ymd_and_hms(2026, 8, 29, 18, 30, 0).unwrap();
    let mock = Mock::new(HashMap::from([(
        ArcStr::from(URL),
        Response {
            status: 200,
            body: ArcStr::from(r#"[{ "label": "a", "url": "https://a" }]"#),
            last_modified: Some(modified),
        },
    )]));
    let feed = feed_with(mock);

    assert_eq!(feed.fetch().await.ts, modified);
}

//! Integration tests for single-request fetching.
//!
//! These tests drive the public `Client` API against mock HTTP servers.

mod support;

use std::time::Duration;

use httpfetch::{Client, FetchError};
use serde::{Deserialize, Serialize};
use support::socket_guard::start_mock_server_or_skip;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Feed {
    title: String,
    entries: Vec<Entry>,
    updated: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Entry {
    id: u32,
    link: String,
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bytes_and_string_return_exact_body() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let body = "Grüße aus dem Testserver.\nLine 2.\n";
    mount(&server, "/page", ResponseTemplate::new(200).set_body_string(body)).await;

    let client = Client::new();
    let url = format!("{}/page", server.uri());

    let bytes = client.bytes(&url).await.expect("bytes should succeed");
    assert_eq!(bytes, body.as_bytes());

    let text = client.string(&url).await.expect("string should succeed");
    assert_eq!(text, body);
}

#[tokio::test]
async fn test_every_read_operation_reports_status_and_url() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(&server, "/missing", ResponseTemplate::new(404)).await;

    let client = Client::new();
    let url = format!("{}/missing", server.uri());

    let errors = vec![
        client.bytes(&url).await.unwrap_err(),
        client.string(&url).await.unwrap_err(),
        client.reader(&url).await.unwrap_err(),
        client.json::<Feed>(&url).await.unwrap_err(),
        client.xml::<Feed>(&url).await.unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, FetchError::Status { .. }), "got {err:?}");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.url(), Some(url.as_str()));
        assert_eq!(err.message(), format!("Get {url} -> 404"));
    }
}

#[tokio::test]
async fn test_json_round_trip() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let feed = Feed {
        title: "release notes".to_string(),
        entries: vec![
            Entry {
                id: 1,
                link: "https://example.com/1".to_string(),
            },
            Entry {
                id: 2,
                link: "https://example.com/2".to_string(),
            },
        ],
        updated: Some(1_700_000_000),
    };
    let encoded = serde_json::to_vec(&feed).expect("feed serializes");
    mount(
        &server,
        "/feed.json",
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "application/json")
            .set_body_bytes(encoded),
    )
    .await;

    let decoded: Feed = Client::new()
        .json(&format!("{}/feed.json", server.uri()))
        .await
        .expect("json should decode");
    assert_eq!(decoded, feed);
}

#[tokio::test]
async fn test_malformed_json_names_url_and_status() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/bad.json",
        ResponseTemplate::new(200).set_body_string("{\"title\": \"x\",, }"),
    )
    .await;

    let url = format!("{}/bad.json", server.uri());
    let err = Client::new().json::<Feed>(&url).await.unwrap_err();

    assert_eq!(err.status_code(), Some(200));
    let msg = err.message();
    assert!(msg.contains(&url), "expected URL in: {msg}");
    assert_eq!(msg, format!("JSON syntax error at {url}"));
}

#[tokio::test]
async fn test_xml_decodes_nested_elements() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let body = "<feed>\
        <title>release notes</title>\
        <entries><id>1</id><link>https://example.com/1</link></entries>\
        <entries><id>2</id><link>https://example.com/2</link></entries>\
        </feed>";
    mount(&server, "/feed.xml", ResponseTemplate::new(200).set_body_string(body)).await;

    let feed: Feed = Client::new()
        .xml(&format!("{}/feed.xml", server.uri()))
        .await
        .expect("xml should decode");
    assert_eq!(feed.title, "release notes");
    assert_eq!(feed.entries.len(), 2);
    assert_eq!(feed.entries[1].link, "https://example.com/2");
    assert_eq!(feed.updated, None);
}

#[tokio::test]
async fn test_reader_read_to_end_matches_bytes() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let payload: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
    mount(
        &server,
        "/archive.bin",
        ResponseTemplate::new(200).set_body_bytes(payload.clone()),
    )
    .await;

    let client = Client::new();
    let url = format!("{}/archive.bin", server.uri());

    let reader = client.reader(&url).await.expect("reader should open");
    assert_eq!(reader.url(), url);
    let streamed = reader.read_to_end().await.expect("body should read");

    assert_eq!(streamed, payload);
    assert_eq!(client.bytes(&url).await.expect("bytes"), payload);
}

#[tokio::test]
async fn test_injected_transport_is_used() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(wiremock::matchers::header("user-agent", "custom-agent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("seen"))
        .mount(&server)
        .await;

    let transport = reqwest::Client::builder()
        .user_agent("custom-agent/1.0")
        .build()
        .expect("client builds");
    let client = Client::from(transport);

    let text = client
        .string(&format!("{}/ua", server.uri()))
        .await
        .expect("request should match user-agent");
    assert_eq!(text, "seen");
}

#[tokio::test]
async fn test_non_200_bodies_are_released() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount(
        &server,
        "/error-page",
        ResponseTemplate::new(503).set_body_bytes(vec![b'x'; 256 * 1024]),
    )
    .await;

    // No idle pooling: a body left open would pin its connection.
    let transport = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .expect("client builds");
    let client = Client::with_transport(transport);
    let url = format!("{}/error-page", server.uri());

    let run = async {
        for _ in 0..40 {
            let err = client.reader(&url).await.expect_err("reader should fail");
            assert_eq!(err.status_code(), Some(503));
            let err = client.bytes(&url).await.expect_err("bytes should fail");
            assert_eq!(err.status_code(), Some(503));
        }
    };
    tokio::time::timeout(Duration::from_secs(30), run)
        .await
        .expect("non-200 calls should not hang");

    let received = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(received.len(), 80);
}

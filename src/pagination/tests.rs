//! Tests for pagination module

use super::*;
use crate::connection::mock::ScriptedConnection;
use crate::connection::{
    ApiRequest, ApiResponse, Connection, ConnectionRequest, DefaultConnection, HttpConfig,
};
use crate::error::Error;
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use std::sync::Arc;
use test_case::test_case;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Link header parsing
// ============================================================================

#[test]
fn test_parse_all_relations() {
    let header = concat!(
        r#"<https://h/api/v1/repos?page=1>; rel="first", "#,
        r#"<https://h/api/v1/repos?page=9>; rel="last", "#,
        r#"<https://h/api/v1/repos?page=4>; rel="next", "#,
        r#"<https://h/api/v1/repos?page=2>; rel="prev""#,
    );
    let links = PageLinks::parse(Some(header));

    assert_eq!(links.first.as_deref(), Some("https://h/api/v1/repos?page=1"));
    assert_eq!(links.last.as_deref(), Some("https://h/api/v1/repos?page=9"));
    assert_eq!(links.next.as_deref(), Some("https://h/api/v1/repos?page=4"));
    assert_eq!(links.prev.as_deref(), Some("https://h/api/v1/repos?page=2"));
    assert!(links.has_next());
}

#[test]
fn test_parse_absent_header() {
    let links = PageLinks::parse(None);
    assert_eq!(links, PageLinks::default());
    assert!(links.is_empty());
    assert!(!links.has_next());
}

#[test_case(r#"<https://h/p2>; rel="next""# ; "quoted")]
#[test_case("<https://h/p2>; rel=next" ; "unquoted")]
#[test_case(r#"<https://h/p2>; rel="NEXT""# ; "upper case value")]
#[test_case("<https://h/p2>; REL=Next" ; "upper case key")]
#[test_case("  <https://h/p2> ;  rel = \"next\"  " ; "extra whitespace")]
#[test_case(r#"<https://h/p2>; type="application/json"; rel="next""# ; "other params first")]
fn test_parse_next_variants(header: &str) {
    let links = PageLinks::parse(Some(header));
    assert_eq!(links.next.as_deref(), Some("https://h/p2"));
}

#[test_case("https://h/p2; rel=\"next\"" ; "missing brackets")]
#[test_case("<https://h/p2; rel=\"next\"" ; "missing closing bracket")]
#[test_case("https://h/p2>; rel=\"next\"" ; "missing opening bracket")]
#[test_case("" ; "empty")]
#[test_case("garbage" ; "garbage")]
fn test_parse_malformed_is_skipped(header: &str) {
    let links = PageLinks::parse(Some(header));
    assert!(links.is_empty());
}

#[test]
fn test_malformed_entry_does_not_hide_valid_ones() {
    let header = r#"https://h/bad; rel="first", <https://h/p3>; rel="next""#;
    let links = PageLinks::parse(Some(header));
    assert!(links.first.is_none());
    assert_eq!(links.next.as_deref(), Some("https://h/p3"));
}

#[test]
fn test_unknown_rel_and_bare_attributes_ignored() {
    let header = r#"<https://h/p1>; rel="canonical", <https://h/p2>; crossorigin; rel="prev""#;
    let links = PageLinks::parse(Some(header));
    assert_eq!(links.prev.as_deref(), Some("https://h/p2"));
    assert!(links.first.is_none() && links.next.is_none() && links.last.is_none());
}

#[test]
fn test_repeated_rel_last_occurrence_wins() {
    let header = r#"<https://h/a>; rel="next", <https://h/b>; rel="next""#;
    let links = PageLinks::parse(Some(header));
    assert_eq!(links.next.as_deref(), Some("https://h/b"));
}

// ============================================================================
// Paged fetches
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u32,
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Serves `pages[n]` for `?page=n+1`, linking each page to the next
fn paged_connection(pages: Vec<&'static str>) -> ScriptedConnection {
    let pages = Arc::new(pages);
    ScriptedConnection::new(
        "https://h",
        Arc::new(move |request: &ApiRequest| {
            let page: usize = request
                .url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .map_or(1, |(_, v)| v.parse().unwrap());
            let mut response = ApiResponse::new(200, pages[page - 1]);
            if page < pages.len() {
                let mut next = request.url.clone();
                next.set_query(Some(&format!("state=open&page={}", page + 1)));
                response = response
                    .with_header("link", &format!("<{next}>; rel=\"next\""))
                    .unwrap();
            }
            Ok(response)
        }),
    )
}

#[tokio::test]
async fn test_fetch_all_concatenates_pages_in_order() {
    let mut connection =
        paged_connection(vec![r#"[{"id":1},{"id":2}]"#, r#"[{"id":3}]"#, "[]"]);
    let requests = connection.requests();

    let items: Vec<Item> = fetch_all(&mut connection, url("https://h/api/v1/items?state=open"))
        .await
        .unwrap();

    assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }, Item { id: 3 }]);
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].url.as_str(), "https://h/api/v1/items?state=open&page=2");
}

#[tokio::test]
async fn test_paged_result_is_lazy_and_restartable() {
    let mut connection = paged_connection(vec![r#"[{"id":1}]"#, r#"[{"id":2}]"#]);
    let requests = connection.requests();

    let mut pages: PagedResult<'_, Item> =
        PagedResult::new(&mut connection, url("https://h/items"));
    assert_eq!(requests.lock().unwrap().len(), 0);

    assert_eq!(pages.next_page().await.unwrap(), Some(vec![Item { id: 1 }]));
    assert_eq!(pages.next_page().await.unwrap(), Some(vec![Item { id: 2 }]));
    assert_eq!(pages.next_page().await.unwrap(), None);
    assert!(pages.is_exhausted());
    assert_eq!(pages.pages_fetched(), 2);

    pages.restart();
    assert_eq!(pages.next_page().await.unwrap(), Some(vec![Item { id: 1 }]));
    assert_eq!(requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_failed_page_fails_whole_fetch() {
    let mut connection = ScriptedConnection::new(
        "https://h",
        Arc::new(|request: &ApiRequest| {
            if request.url.query().is_some_and(|q| q.contains("page=2")) {
                Ok(ApiResponse::new(500, "boom"))
            } else {
                ApiResponse::new(200, r#"[{"id":1}]"#)
                    .with_header("link", "<https://h/items?page=2>; rel=\"next\"")
            }
        }),
    );

    let err = fetch_all::<Item>(&mut connection, url("https://h/items"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_next_link_on_separate_header_line_is_followed() {
    let mut connection = ScriptedConnection::new(
        "https://h",
        Arc::new(|request: &ApiRequest| {
            if request.url.query().is_some_and(|q| q.contains("page=2")) {
                Ok(ApiResponse::new(200, r#"[{"id":2}]"#))
            } else {
                ApiResponse::new(200, r#"[{"id":1}]"#)
                    .with_header("link", "<https://h/items?page=1>; rel=\"first\"")?
                    .with_header("link", "<https://h/items?page=2>; rel=\"next\"")
            }
        }),
    );
    let requests = connection.requests();

    let items: Vec<Item> = fetch_all(&mut connection, url("https://h/items"))
        .await
        .unwrap();

    assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_undecodable_page_is_decode_error() {
    let mut connection = ScriptedConnection::new(
        "https://h",
        Arc::new(|_: &ApiRequest| Ok(ApiResponse::new(200, r#"{"not":"a list"}"#))),
    );

    let err = fetch_all::<Item>(&mut connection, url("https://h/items"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_relative_next_link_resolves_against_page() {
    let mut connection = ScriptedConnection::new(
        "https://h",
        Arc::new(|request: &ApiRequest| {
            if request.url.path() == "/api/v1/items" && request.url.query().is_none() {
                ApiResponse::new(200, r#"[{"id":1}]"#)
                    .with_header("link", "</api/v1/items?page=2>; rel=\"next\"")
            } else {
                Ok(ApiResponse::new(200, r#"[{"id":2}]"#))
            }
        }),
    );
    let requests = connection.requests();

    let items: Vec<Item> = fetch_all(&mut connection, url("https://h/api/v1/items"))
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        requests.lock().unwrap()[1].url.as_str(),
        "https://h/api/v1/items?page=2"
    );
}

#[tokio::test]
async fn test_self_referencing_next_link_stops() {
    let mut connection = ScriptedConnection::new(
        "https://h",
        Arc::new(|_: &ApiRequest| {
            ApiResponse::new(200, r#"[{"id":1}]"#)
                .with_header("link", "<https://h/items>; rel=\"next\"")
        }),
    );
    let requests = connection.requests();

    let items: Vec<Item> = fetch_all(&mut connection, url("https://h/items"))
        .await
        .unwrap();
    assert_eq!(items, vec![Item { id: 1 }]);
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_into_stream_yields_items_in_order() {
    let mut connection = paged_connection(vec![r#"[{"id":1},{"id":2}]"#, r#"[{"id":3}]"#]);

    let items: Vec<Item> = PagedResult::new(&mut connection, url("https://h/items"))
        .into_stream()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_two_pages_over_http_issue_two_requests() {
    let server = MockServer::start().await;
    let page2 = format!("{}/api/v1/repos/o/r/pulls?state=open&page=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/pulls"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/repos/o/r/pulls"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header("Link", format!("<{page2}>; rel=\"next\"").as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ConnectionRequest::new(server.uri());
    let mut connection = DefaultConnection::open(&request, HttpConfig::default()).unwrap();
    let start = url(&format!("{}/api/v1/repos/o/r/pulls?state=open", server.uri()));

    let items: Vec<Item> = fetch_all(&mut connection, start).await.unwrap();

    assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    connection.close().await.unwrap();
}

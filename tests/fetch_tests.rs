//! Generic fetch helper over the gateway.

mod common;

use std::collections::BTreeMap;

use authgate::error::GatewayError;
use authgate::fetch::{FetchQuery, SortOrder};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{gateway, mount_token_endpoint, session};

#[derive(Debug, Deserialize, PartialEq)]
struct Recipe {
    id: u32,
    name: String,
}

#[tokio::test]
async fn fetch_sends_serialized_query_and_decodes_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .and(header("authorization", "Bearer T1"))
        .and(query_param("filter", r#"["cuisine","thai"]"#))
        .and(query_param("orderBy", r#"["createdAt","desc"]"#))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("offset"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Pad Thai"},
            {"id": 2, "name": "Tom Yum"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut additional = BTreeMap::new();
    additional.insert("lang".to_string(), json!("en"));
    let query = FetchQuery::builder()
        .filter(("cuisine".to_string(), json!("thai")))
        .order_by(("createdAt".to_string(), SortOrder::Desc))
        .limit(2)
        .offset(0)
        .additional(additional)
        .build();

    let recipes: Vec<Recipe> = gateway(&server, session(Some("T1"), None))
        .fetch("/recipes", &query)
        .await
        .expect("fetch");

    assert_eq!(
        recipes,
        vec![
            Recipe {
                id: 1,
                name: "Pad Thai".to_string()
            },
            Recipe {
                id: 2,
                name: "Tom Yum".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn fetch_non_200_fails_with_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let result = gateway(&server, session(Some("T1"), None))
        .fetch::<serde_json::Value>("/recipes/99", &FetchQuery::default())
        .await;

    let err = result.expect_err("404 must fail");
    match &err {
        GatewayError::Fetch {
            status,
            status_text,
            body,
        } => {
            assert_eq!(*status, 404);
            assert_eq!(status_text, "Not Found");
            assert_eq!(body, &json!({"error": "not found"}));
        }
        other => panic!("expected Fetch error, got {other:?}"),
    }
    let message: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
    assert_eq!(
        message,
        json!({"status": 404, "statusText": "Not Found", "data": {"error": "not found"}})
    );
}

#[tokio::test]
async fn fetch_non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(422).set_body_string("bad input"))
        .mount(&server)
        .await;

    let result = gateway(&server, session(None, None))
        .fetch::<serde_json::Value>("/broken", &FetchQuery::default())
        .await;

    match result {
        Err(GatewayError::Fetch { status, body, .. }) => {
            assert_eq!(status, 422);
            assert_eq!(body, json!("bad input"));
        }
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_refreshes_before_decoding() {
    let server = MockServer::start().await;
    common::mount_api(&server, "/api/recipes", "T1", ResponseTemplate::new(401)).await;
    common::mount_api(
        &server,
        "/api/recipes",
        "T2",
        ResponseTemplate::new(200).set_body_json(json!([])),
    )
    .await;
    mount_token_endpoint(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})),
        1,
    )
    .await;

    let recipes: Vec<Recipe> = gateway(&server, session(Some("T1"), Some("R1")))
        .fetch("/recipes", &FetchQuery::default())
        .await
        .expect("fetch after refresh");

    assert!(recipes.is_empty());
}

#[tokio::test]
async fn fetch_unrecoverable_401_is_unauthorized() {
    let server = MockServer::start().await;
    common::mount_api(&server, "/api/recipes", "T1", ResponseTemplate::new(401)).await;

    let result = gateway(&server, session(Some("T1"), None))
        .fetch::<serde_json::Value>("/recipes", &FetchQuery::default())
        .await;

    let err = result.expect_err("401 must fail");
    assert!(err.is_unauthorized());
    assert!(matches!(err, GatewayError::Unauthorized { .. }));
}

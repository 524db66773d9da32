//! `SnowflakeStore` against a mocked SQL API.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use alertsync_core::{Guid, QuerySpec, SpecKind, SuppressionSpec};
use alertsync_store::{records, SnowflakeStore, SpecStore, StoreConfig, StoreError, TokenType};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const STATEMENTS: &str = "/api/v2/statements";

fn config(url: &str) -> StoreConfig {
    StoreConfig {
        account: "acme".into(),
        user: "ops".into(),
        warehouse: "update_wh".into(),
        role: "snowalert_admin".into(),
        database: "snowalert".into(),
        schema: "public".into(),
        token: "tok".into(),
        token_type: TokenType::KeypairJwt,
        api_url: Some(url.to_string()),
    }
}

fn store(server: &MockServer) -> SnowflakeStore {
    SnowflakeStore::new(config(&server.uri())).with_poll_interval(Duration::from_millis(1))
}

/// The store is blocking; keep it off the runtime threads serving the mock.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}

fn rows(payloads: &[&str]) -> Value {
    let data: Vec<Value> = payloads.iter().map(|p| json!([p])).collect();
    json!({
        "resultSetMetaData": {"numRows": payloads.len(), "partitionInfo": [{"rowCount": payloads.len()}]},
        "data": data,
        "statementHandle": "h-1"
    })
}

async fn requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
}

fn body(request: &Request) -> Value {
    request.body_json().expect("request body is JSON")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn select_sends_context_and_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .and(header("Authorization", "Bearer tok"))
        .and(header("X-Snowflake-Authorization-Token-Type", "KEYPAIR_JWT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows(&[
            r#"{"SuppressionName":"S","GUID":"a","Query":"select 1"}"#,
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = store(&server);
    let specs: Vec<SuppressionSpec> = blocking(move || records::read_specs(&mut store))
        .await
        .expect("read");
    assert_eq!(specs, vec![SuppressionSpec::new("S", "a", "select 1")]);

    let received = requests(&server).await;
    let body = body(&received[0]);
    assert_eq!(
        body["statement"],
        "select suppression_spec from snowalert.public.suppression_queries;"
    );
    assert_eq!(body["warehouse"], "update_wh");
    assert_eq!(body["role"], "snowalert_admin");
    assert!(body.get("bindings").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_binds_payload_then_guid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"stats": {"numRowsUpdated": 1}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let spec = QuerySpec::new("Q", "g-1", "select 1");
    let mut store = store(&server);
    let written = spec.clone();
    let affected = blocking(move || records::update_spec(&mut store, &written))
        .await
        .expect("update");
    assert_eq!(affected, 1);

    let body = body(&requests(&server).await[0]);
    assert_eq!(
        body["statement"],
        "update snowalert.public.snowalert_queries set query_spec = parse_json(?) where query_spec:GUID = ?;"
    );
    let payload: QuerySpec =
        serde_json::from_str(body["bindings"]["1"]["value"].as_str().unwrap()).unwrap();
    assert_eq!(payload, spec);
    assert_eq!(body["bindings"]["2"], json!({"type": "TEXT", "value": "g-1"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn running_statement_is_polled_until_done() {
    let server = MockServer::start().await;
    let running = json!({"code": "333334", "statementHandle": "h-9"});
    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(ResponseTemplate::new(202).set_body_json(running.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/statements/h-9"))
        .respond_with(ResponseTemplate::new(202).set_body_json(running))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/statements/h-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"stats": {"numRowsDeleted": 2}, "statementHandle": "h-9"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = store(&server);
    let deleted = blocking(move || store.delete_by_guid(SpecKind::Query, &Guid::from("g")))
        .await
        .expect("delete");
    assert_eq!(deleted, 2);
    assert_eq!(requests(&server).await.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn extra_partitions_are_fetched_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultSetMetaData": {"numRows": 3, "partitionInfo": [{"rowCount": 1}, {"rowCount": 1}, {"rowCount": 1}]},
            "data": [["p0"]],
            "statementHandle": "h-2"
        })))
        .mount(&server)
        .await;
    for partition in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/api/v2/statements/h-2"))
            .and(query_param("partition", partition))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [[format!("p{partition}")]]})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut store = store(&server);
    let payloads = blocking(move || store.fetch_payloads(SpecKind::Query))
        .await
        .expect("fetch");
    assert_eq!(payloads, vec!["p0", "p1", "p2"]);

    let queries: Vec<_> = requests(&server)
        .await
        .iter()
        .filter_map(|r| r.url.query().map(str::to_owned))
        .collect();
    assert_eq!(queries, vec!["partition=1", "partition=2"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_surfaces_code_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STATEMENTS))
        .respond_with(ResponseTemplate::new(422).set_body_json(
            json!({"code": "002003", "message": "Table does not exist", "sqlState": "42S02"}),
        ))
        .mount(&server)
        .await;

    let mut store = store(&server);
    let err = blocking(move || store.insert_payload(SpecKind::Suppression, "{}"))
        .await
        .expect_err("insert should fail");
    match err {
        StoreError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 422);
            assert_eq!(code, "002003");
            assert_eq!(message, "Table does not exist");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_store_is_a_request_error() {
    // Nothing listens on port 1.
    let mut store = SnowflakeStore::new(config("http://127.0.0.1:1"));
    let err = blocking(move || store.create_table(SpecKind::Query))
        .await
        .expect_err("no server");
    assert!(matches!(err, StoreError::Request(_)));
}

//! HTTP adapters against a local mock server

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pitchdesk::verify::{BalanceError, BalanceSource, DocumentRelocator, DriveRelocator, EvmBalanceSource, RelocateError};

fn balance_word(raw: u128) -> String {
    format!("0x{:064x}", raw)
}

fn source_for(server: &MockServer) -> EvmBalanceSource {
    EvmBalanceSource::new(
        server.uri(),
        "0x1185cB5122Edad199BdBC0cbd7a0457E448f23c7".to_string(),
        18,
        50,
        50,
        Duration::from_secs(60),
    )
}

const HOLDER: &str = "0x00000000000000000000000000000000000000aa";

#[tokio::test]
async fn balance_of_decodes_the_returned_word() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(serde_json::json!({ "method": "eth_call" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": balance_word(4 * 10u128.pow(18)),
        })))
        .mount(&server)
        .await;

    let source = source_for(&server);
    let amount = source.balance_of(HOLDER).await.unwrap();
    assert_eq!(amount.raw, 4 * 10u128.pow(18));
    assert_eq!(amount.format_units(), "4");
}

#[tokio::test]
async fn rpc_errors_surface_as_lookup_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "execution reverted" },
        })))
        .mount(&server)
        .await;

    let source = source_for(&server);
    match source.balance_of(HOLDER).await {
        Err(BalanceError::Rpc { code, message }) => {
            assert_eq!(code, -32000);
            assert!(message.contains("reverted"));
        }
        other => panic!("expected an RPC error, got {other:?}"),
    }
}

#[tokio::test]
async fn repeated_lookups_are_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": balance_word(10u128.pow(18)),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server);
    let first = source.balance_of(HOLDER).await.unwrap();
    let second = source.balance_of(HOLDER).await.unwrap();
    assert_eq!(first.raw, second.raw);
    // the mock's expect(1) verifies on drop that only one request went out
}

#[tokio::test]
async fn relocator_returns_the_public_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://files.test/deck-relocated.pdf",
        })))
        .mount(&server)
        .await;

    let relocator = DriveRelocator::new(
        format!("{}/upload", server.uri()),
        Some("token".to_string()),
        Some("folder".to_string()),
    );
    let file = relocator.relocate(vec![1, 2, 3], "deck.pdf").await.unwrap();
    assert_eq!(file.url, "https://files.test/deck-relocated.pdf");
}

#[tokio::test]
async fn upload_rejection_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(507).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let relocator = DriveRelocator::new(server.uri(), None, None);
    match relocator.relocate(vec![1], "deck.pdf").await {
        Err(RelocateError::Upload { status, body }) => {
            assert_eq!(status, 507);
            assert!(body.contains("quota"));
        }
        other => panic!("expected an upload error, got {other:?}"),
    }
}

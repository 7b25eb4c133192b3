//! # Integration Tests for consign-api
//!
//! Tests the HTTP surface end to end: template CRUD with soft delete,
//! the contract signing flow (create, send, sign, decline, cancel),
//! sequential ordering, actor attribution, rate limiting, and OpenAPI
//! spec generation.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use consign_api::middleware::rate_limit::RateLimitConfig;
use consign_api::state::{AppConfig, AppState};

/// Helper: build the test app with in-memory stores only.
fn test_app() -> axum::Router {
    consign_api::app(AppState::new())
}

/// Helper: read a response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper: JSON request with an acting user.
fn request(method: &str, uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", user)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn two_party_contract_body() -> Value {
    json!({
        "title": "Carriage of goods",
        "type": "ECMR",
        "parties": [
            {
                "type": "COMPANY",
                "name": "Shipper BV",
                "email": "ops@shipper.example",
                "role": "SENDER",
                "signatureRequired": true,
                "company": {
                    "name": "Shipper BV",
                    "vatNumber": "NL123456789B01",
                    "registrationNumber": "12345678",
                    "address": "Dockweg 1, Rotterdam"
                }
            },
            {
                "type": "INDIVIDUAL",
                "name": "Carrier One",
                "email": "driver@carrier.example",
                "role": "CARRIER",
                "signatureRequired": true
            }
        ],
        "content": "terms of carriage",
        "effectiveDate": "2026-09-01T00:00:00Z"
    })
}

/// Create a contract and return its envelope `data`.
async fn create_contract(app: &axum::Router, user: &str) -> Value {
    let response = app
        .clone()
        .oneshot(request("POST", "/v1/contracts", user, two_party_contract_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    body["data"].clone()
}

/// Send a contract for signatures and return its pending signature ids,
/// keyed by signer email.
async fn send_for_signatures(app: &axum::Router, contract_id: &str, user: &str) -> Vec<Value> {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/contracts/{contract_id}/send"),
            user,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/contracts/{contract_id}/signatures")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]
        .as_array()
        .unwrap()
        .clone()
}

fn signature_id_for<'a>(signatures: &'a [Value], email: &str) -> &'a str {
    signatures
        .iter()
        .find(|s| s["signerEmail"] == email)
        .and_then(|s| s["id"].as_str())
        .expect("signature for signer")
}

async fn sign(app: &axum::Router, signature_id: &str, user: &str) -> axum::http::Response<Body> {
    app.clone()
        .oneshot(request(
            "POST",
            &format!("/v1/signatures/{signature_id}/sign"),
            user,
            json!({ "signatureData": "data:image/png;base64,aGVsbG8=" }),
        ))
        .await
        .unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(get("/health/liveness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app()
        .oneshot(get("/health/readiness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Templates ----------------------------------------------------------------

#[tokio::test]
async fn test_template_crud_with_soft_delete() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v1/templates",
            "ops-1",
            json!({
                "name": "eCMR standard",
                "type": "ECMR",
                "description": "Standard consignment note",
                "content": "Agreement between {{sender}} and {{carrier}}",
                "variables": [
                    { "name": "sender", "label": "Sender", "type": "TEXT", "required": true }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await["data"].clone();
    assert_eq!(created["version"], json!("1.0"));
    assert_eq!(created["isActive"], json!(true));
    assert_eq!(created["createdBy"], json!("ops-1"));
    let id = created["id"].as_str().unwrap().to_string();

    // listed while active
    let response = app
        .clone()
        .oneshot(get("/v1/templates?type=ECMR"))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    // update
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/v1/templates/{id}"),
            "ops-1",
            json!({ "version": "1.1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["version"], json!("1.1"));

    // soft delete: hidden from listing, still fetchable
    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/v1/templates/{id}"), "ops-1", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/v1/templates")).await.unwrap();
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/templates/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["isActive"], json!(false));
}

#[tokio::test]
async fn test_blank_template_name_is_rejected() {
    let response = test_app()
        .oneshot(request(
            "POST",
            "/v1/templates",
            "ops-1",
            json!({
                "name": "  ",
                "type": "NDA",
                "description": "d",
                "content": "c"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

// -- Contract Creation --------------------------------------------------------

#[tokio::test]
async fn test_create_contract_assigns_number_and_workflow() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;

    assert_eq!(contract["status"], json!("DRAFT"));
    assert!(contract["contractNumber"]
        .as_str()
        .unwrap()
        .starts_with("CTR-"));
    assert_eq!(contract["createdBy"], json!("dispatcher-1"));
    assert_eq!(contract["parties"][0]["id"], json!("party-1"));
    assert_eq!(contract["parties"][1]["id"], json!("party-2"));

    let id = contract["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/contracts/{id}/workflow")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let workflow = body_json(response).await["data"].clone();
    assert_eq!(workflow["status"], json!("PENDING"));
    assert_eq!(workflow["totalSteps"], json!(2));
    assert_eq!(workflow["expirationDays"], json!(30));
}

#[tokio::test]
async fn test_contract_numbers_are_unique_and_sequential() {
    let app = test_app();
    let first = create_contract(&app, "dispatcher-1").await;
    let second = create_contract(&app, "dispatcher-1").await;
    let a = first["contractNumber"].as_str().unwrap();
    let b = second["contractNumber"].as_str().unwrap();
    assert_ne!(a, b);
    assert!(a < b, "numbers must be monotonic: {a} vs {b}");
}

#[tokio::test]
async fn test_single_party_contract_is_rejected() {
    let mut body = two_party_contract_body();
    body["parties"].as_array_mut().unwrap().truncate(1);
    let response = test_app()
        .oneshot(request("POST", "/v1/contracts", "dispatcher-1", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_sequential_contract_requires_order_on_signers() {
    let mut body = two_party_contract_body();
    body["isSequentialSigning"] = json!(true);
    body["parties"][0]["signatureOrder"] = json!(1);
    // second signer has no order
    let response = test_app()
        .oneshot(request("POST", "/v1/contracts", "dispatcher-1", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_unknown_contract_is_404() {
    let response = test_app()
        .oneshot(get("/v1/contracts/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_list_contracts_filters() {
    let app = test_app();
    create_contract(&app, "dispatcher-1").await;
    create_contract(&app, "dispatcher-2").await;

    let response = app
        .clone()
        .oneshot(get("/v1/contracts?createdBy=dispatcher-1"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get("/v1/contracts?partyEmail=driver@carrier.example"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    // without filters, lists the acting user's own contracts
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/contracts")
                .header("x-user-id", "dispatcher-2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

// -- Signing Flow -------------------------------------------------------------

#[tokio::test]
async fn test_full_signing_flow_reaches_fully_signed() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();

    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;
    assert_eq!(signatures.len(), 2);
    assert!(signatures.iter().all(|s| s["status"] == "PENDING"));

    // first signature: contract becomes PARTIALLY_SIGNED
    let response = sign(
        &app,
        signature_id_for(&signatures, "ops@shipper.example"),
        "shipper-user",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.clone().oneshot(get(&format!("/v1/contracts/{id}"))).await.unwrap();
    assert_eq!(
        body_json(response).await["data"]["status"],
        json!("PARTIALLY_SIGNED")
    );

    // second signature: FULLY_SIGNED, workflow COMPLETED
    let response = sign(
        &app,
        signature_id_for(&signatures, "driver@carrier.example"),
        "carrier-user",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get(&format!("/v1/contracts/{id}"))).await.unwrap();
    assert_eq!(
        body_json(response).await["data"]["status"],
        json!("FULLY_SIGNED")
    );
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/contracts/{id}/workflow")))
        .await
        .unwrap();
    let workflow = body_json(response).await["data"].clone();
    assert_eq!(workflow["status"], json!("COMPLETED"));

    // the audit trail records the promotion exactly once
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/contracts/{id}/audit")))
        .await
        .unwrap();
    let trail = body_json(response).await["data"].as_array().unwrap().clone();
    let fully_signed: Vec<_> = trail
        .iter()
        .filter(|e| e["action"] == "CONTRACT_FULLY_SIGNED")
        .collect();
    assert_eq!(fully_signed.len(), 1);
    assert_eq!(fully_signed[0]["actorType"], json!("SYSTEM"));
}

#[tokio::test]
async fn test_send_twice_is_a_conflict() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();
    send_for_signatures(&app, id, "dispatcher-1").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/contracts/{id}/send"),
            "dispatcher-1",
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signing_captures_client_metadata() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();
    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;
    let sig_id = signature_id_for(&signatures, "ops@shipper.example");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/signatures/{sig_id}/sign"))
                .header("content-type", "application/json")
                .header("x-user-id", "shipper-user")
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .header("user-agent", "consign-test")
                .body(Body::from(
                    json!({
                        "signatureData": "blob",
                        "geolocation": { "latitude": 51.9, "longitude": 4.47 }
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let signed = body_json(response).await["data"].clone();
    assert_eq!(signed["ipAddress"], json!("203.0.113.7"));
    assert_eq!(signed["userAgent"], json!("consign-test"));
    assert_eq!(signed["geolocation"]["latitude"], json!(51.9));
}

#[tokio::test]
async fn test_signing_twice_is_a_conflict() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();
    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;
    let sig_id = signature_id_for(&signatures, "ops@shipper.example");

    assert_eq!(sign(&app, sig_id, "u").await.status(), StatusCode::OK);
    assert_eq!(sign(&app, sig_id, "u").await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_decline_cancels_the_contract() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();
    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;
    let sig_id = signature_id_for(&signatures, "driver@carrier.example");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/signatures/{sig_id}/decline"),
            "carrier-user",
            json!({ "reason": "pricing dispute" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["status"],
        json!("DECLINED")
    );

    let response = app.clone().oneshot(get(&format!("/v1/contracts/{id}"))).await.unwrap();
    assert_eq!(
        body_json(response).await["data"]["status"],
        json!("CANCELLED")
    );
}

#[tokio::test]
async fn test_second_decline_after_cancellation_still_succeeds() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();
    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;

    let first = signature_id_for(&signatures, "ops@shipper.example");
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/signatures/{first}/decline"),
            "shipper-user",
            json!({ "reason": "pricing dispute" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // the first decline cancelled the contract; the second still lands
    let second = signature_id_for(&signatures, "driver@carrier.example");
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/signatures/{second}/decline"),
            "carrier-user",
            json!({ "reason": "also out" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["status"],
        json!("DECLINED")
    );

    let response = app.clone().oneshot(get(&format!("/v1/contracts/{id}"))).await.unwrap();
    assert_eq!(
        body_json(response).await["data"]["status"],
        json!("CANCELLED")
    );
}

#[tokio::test]
async fn test_decline_without_reason_is_rejected() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();
    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;
    let sig_id = signature_id_for(&signatures, "driver@carrier.example");

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/signatures/{sig_id}/decline"),
            "carrier-user",
            json!({ "reason": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_sequential_order_is_enforced_over_http() {
    let app = test_app();
    let mut body = two_party_contract_body();
    body["isSequentialSigning"] = json!(true);
    body["parties"][0]["signatureOrder"] = json!(1);
    body["parties"][1]["signatureOrder"] = json!(2);

    let response = app
        .clone()
        .oneshot(request("POST", "/v1/contracts", "dispatcher-1", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let contract = body_json(response).await["data"].clone();
    let id = contract["id"].as_str().unwrap();
    let signatures = send_for_signatures(&app, id, "dispatcher-1").await;

    // the second-ordered signer cannot go first
    let second = signature_id_for(&signatures, "driver@carrier.example");
    assert_eq!(sign(&app, second, "u").await.status(), StatusCode::CONFLICT);

    let first = signature_id_for(&signatures, "ops@shipper.example");
    assert_eq!(sign(&app, first, "u").await.status(), StatusCode::OK);
    assert_eq!(sign(&app, second, "u").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cancelling_twice_is_a_conflict() {
    let app = test_app();
    let contract = create_contract(&app, "dispatcher-1").await;
    let id = contract["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/contracts/{id}/cancel"),
            "dispatcher-1",
            json!({ "reason": "changed plans" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // cancelling again conflicts
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/contracts/{id}/cancel"),
            "dispatcher-1",
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// -- Rate Limiting ------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let config = AppConfig {
        port: 8080,
        rate_limit: RateLimitConfig {
            max_requests: 2,
            window_secs: 60,
        },
    };
    let app = consign_api::app(AppState::with_config(config, None));

    for _ in 0..2 {
        let response = app.clone().oneshot(get("/v1/templates")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(get("/v1/templates")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("RATE_LIMITED"));

    // health probes sit outside the limiter
    let response = app.clone().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/v1/contracts"].is_object());
    assert!(spec["paths"]["/v1/signatures/{id}/sign"].is_object());
}

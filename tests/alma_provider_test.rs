//! HTTP behaviour of the Alma client against a local stand-in for the API

mod common;

use alma_checkout::error::ExternalError;
use alma_checkout::payments::providers::{AlmaConfig, AlmaMode, AlmaProvider};
use alma_checkout::payments::settings::KEY_API_KEY_TEST;
use alma_checkout::payments::types::{InstallmentState, PaymentPayload, PaymentState};
use alma_checkout::payments::AlmaApi;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use common::InMemoryConfigurationStore;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Path (with query) and `Authorization` header of every request received
type RequestLog = Arc<Mutex<Vec<(String, String)>>>;

async fn fake_alma(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    log.lock().unwrap().push((path, auth));

    match (method, uri.path()) {
        (Method::POST, "/v1/payments/eligibility") => {
            axum::Json(json!({ "eligible": true })).into_response()
        }
        (Method::POST, "/v1/payments") => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "errors": [
                    { "error_code": "missing_field", "field": "billing_address.city", "message": "This field is required" },
                    { "error_code": "invalid_format", "field": "customer.email" }
                ]
            })),
        )
            .into_response(),
        (Method::GET, "/v1/payments/payment_slow") => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            StatusCode::OK.into_response()
        }
        (Method::GET, "/v1/payments/payment_garbled") => "<html>maintenance</html>".into_response(),
        (Method::GET, "/v1/payments/payment_1") => axum::Json(json!({
            "id": "payment_1",
            "url": "https://checkout.sandbox.getalma.eu/payment_1",
            "state": "paid",
            "purchase_amount": 4999,
            "payment_plan": [{ "state": "paid", "purchase_amount": 1667 }, { "state": "pending" }]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_fake_alma() -> (String, RequestLog) {
    let log = RequestLog::default();
    let app = Router::new().fallback(fake_alma).with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), log)
}

fn provider(base_url: &str, mode: AlmaMode, api_key: &str) -> AlmaProvider {
    AlmaProvider::new(AlmaConfig {
        api_key: api_key.to_string(),
        mode,
        base_url: Some(base_url.to_string()),
        timeout_secs: 1,
    })
    .unwrap()
}

fn auth_headers(log: &RequestLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|(_, auth)| auth.clone()).collect()
}

#[tokio::test]
async fn test_fetch_payment_parses_session() {
    let (base_url, log) = spawn_fake_alma().await;

    let session = provider(&base_url, AlmaMode::Test, "sk_test_env")
        .fetch_payment("payment_1")
        .await
        .unwrap();

    assert_eq!(session.state, PaymentState::Paid);
    assert_eq!(session.purchase_amount, 4999);
    assert_eq!(session.payment_plan[0].state, InstallmentState::Paid);
    assert_eq!(log.lock().unwrap()[0].0, "/v1/payments/payment_1");
}

#[tokio::test]
async fn test_fetch_payment_never_leaves_the_payments_path() {
    let (base_url, log) = spawn_fake_alma().await;
    let provider = provider(&base_url, AlmaMode::Test, "sk_test_env");

    for id in ["../../v2/merchants/me?x=", "payment_1/../../me", "payment_1#x", "%2e%2e"] {
        let err = provider.fetch_payment(id).await.unwrap_err();
        assert!(
            matches!(err, ExternalError::InvalidRequest { .. }),
            "unexpected error for {:?}: {:?}",
            id,
            err
        );
    }

    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_keeps_every_sub_error() {
    let (base_url, _) = spawn_fake_alma().await;

    let err = provider(&base_url, AlmaMode::Test, "sk_test_env")
        .create_payment(&PaymentPayload::default())
        .await
        .unwrap_err();

    match &err {
        ExternalError::PaymentProvider { status, .. } => assert_eq!(*status, 400),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.messages(),
        vec![
            "billing_address.city: This field is required".to_string(),
            "customer.email: invalid_format".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_non_json_success_body_is_invalid_response() {
    let (base_url, _) = spawn_fake_alma().await;

    let err = provider(&base_url, AlmaMode::Test, "sk_test_env")
        .fetch_payment("payment_garbled")
        .await
        .unwrap_err();

    assert!(matches!(err, ExternalError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let (base_url, log) = spawn_fake_alma().await;

    let err = provider(&base_url, AlmaMode::Test, "sk_test_env")
        .fetch_payment("payment_slow")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExternalError::Timeout {
            service: "Alma".to_string(),
            seconds: 1,
        }
    );
    // Single attempt
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stored_test_key_takes_precedence_in_test_mode() {
    let (base_url, log) = spawn_fake_alma().await;
    let store = Arc::new(InMemoryConfigurationStore::with_values(&[(
        KEY_API_KEY_TEST,
        "sk_test_stored",
    )]));

    provider(&base_url, AlmaMode::Test, "sk_test_env")
        .with_key_store(store)
        .eligibility(&PaymentPayload::default())
        .await
        .unwrap();

    assert_eq!(auth_headers(&log), vec!["Alma-Auth sk_test_stored".to_string()]);
}

#[tokio::test]
async fn test_blank_stored_key_falls_back_to_env_key() {
    let (base_url, log) = spawn_fake_alma().await;
    let store = Arc::new(InMemoryConfigurationStore::with_values(&[(KEY_API_KEY_TEST, "  ")]));

    provider(&base_url, AlmaMode::Test, "sk_test_env")
        .with_key_store(store)
        .eligibility(&PaymentPayload::default())
        .await
        .unwrap();

    assert_eq!(auth_headers(&log), vec!["Alma-Auth sk_test_env".to_string()]);
}

#[tokio::test]
async fn test_live_mode_ignores_stored_test_key() {
    let (base_url, log) = spawn_fake_alma().await;
    let store = Arc::new(InMemoryConfigurationStore::with_values(&[(
        KEY_API_KEY_TEST,
        "sk_test_stored",
    )]));

    provider(&base_url, AlmaMode::Live, "sk_live_env")
        .with_key_store(store)
        .eligibility(&PaymentPayload::default())
        .await
        .unwrap();

    assert_eq!(auth_headers(&log), vec!["Alma-Auth sk_live_env".to_string()]);
}

#[tokio::test]
async fn test_missing_key_fails_before_sending() {
    let (base_url, log) = spawn_fake_alma().await;
    let store = Arc::new(InMemoryConfigurationStore::default());

    let err = provider(&base_url, AlmaMode::Test, "")
        .with_key_store(store.clone())
        .eligibility(&PaymentPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExternalError::Credentials { .. }));

    *store.fail.lock().unwrap() = true;
    let err = provider(&base_url, AlmaMode::Test, "sk_test_env")
        .with_key_store(store)
        .eligibility(&PaymentPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExternalError::Credentials { .. }));

    assert!(log.lock().unwrap().is_empty());
}

//! HTTP API tests, driving the router in-process

mod common;

use std::collections::BTreeMap;

use axum::body::Body;
use booking_server::api::build_app;
use booking_server::auth::telegram::sign;
use booking_server::ServerState;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{ADMIN_CHAT, shop, test_state};

async fn call(state: &ServerState, request: Request<Body>) -> (StatusCode, Value) {
    let app = build_app(state).with_state(state.clone());
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn booking_body(user: i64) -> Value {
    json!({
        "shopId": 1,
        "shopName": "Cuts Inc",
        "userTelegramId": user,
        "userTelegramUsername": "alice",
        "requestedTime": "2030-05-01T10:00:00Z",
        "userNumber": "+998901234567"
    })
}

#[tokio::test]
async fn test_health() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, _) = test_state(&tmp, vec![]).await;

    let (status, body) = call(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_user_requires_id_and_reports_missing_user() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, _) = test_state(&tmp, vec![]).await;

    let (status, body) = call(&state, json_request("POST", "/api/user/get-user", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Telegram ID is required");

    let (status, body) =
        call(&state, json_request("POST", "/api/shops/get-user", json!({ "id": 99 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found in database");
}

#[tokio::test]
async fn test_booking_request_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, notifier) = test_state(&tmp, vec![shop(1, "Cuts Inc")]).await;

    let (status, body) = call(
        &state,
        json_request("POST", "/api/shops/booking-requests", json!({ "shopId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("userTelegramId"));

    let (status, body) = call(
        &state,
        json_request("POST", "/api/shops/booking-requests", booking_body(42)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Booking request sent successfully!");
    let booking_id = body["bookingId"].as_str().unwrap().to_string();

    // 管理员收到带两个按钮的审批消息
    let prompts = notifier.sent_to(ADMIN_CHAT);
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0].1,
        vec![format!("confirm_{booking_id}"), format!("reject_{booking_id}")]
    );

    // 非本人取消被拒绝
    let (status, _) = call(
        &state,
        json_request("PATCH", &format!("/api/user/bookings/{booking_id}/cancel?actor=7"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &state,
        json_request("PATCH", &format!("/api/user/bookings/{booking_id}/cancel?actor=42"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _) = call(
        &state,
        json_request("PATCH", &format!("/api/user/bookings/{booking_id}/cancel"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &state,
        json_request("PATCH", "/api/user/bookings/missing/cancel", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_lists_bookings_with_shop() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, _) = test_state(&tmp, vec![shop(1, "Cuts Inc")]).await;

    let (status, _) = call(&state, get("/api/user/profile/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    state
        .users
        .upsert(shared::models::UserUpsert {
            telegram_id: "42".into(),
            name: "Alice".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    call(
        &state,
        json_request("POST", "/api/shops/booking-requests", booking_body(42)),
    )
    .await;

    let (status, body) = call(&state, get("/api/user/profile/42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["telegramId"], "42");
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["status"], "pending");
    assert_eq!(bookings[0]["shop"]["name"]["en"], "Cuts Inc");
}

#[tokio::test]
async fn test_availability_lists_working_hours() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, _) = test_state(&tmp, vec![shop(1, "Cuts Inc")]).await;

    let (status, body) = call(&state, get("/api/shops/service/1/availability")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workingHours"].as_array().unwrap().len(), 1);
    assert!(body["bookedSlots"].as_array().unwrap().is_empty());

    let (status, _) = call(&state, get("/api/shops/service/99/availability")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_path_and_query_return_json_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, _) = test_state(&tmp, vec![shop(1, "Cuts Inc")]).await;

    let (status, body) = call(&state, get("/api/shops/service/abc/availability")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let request = Request::builder()
        .method("PATCH")
        .uri("/api/user/bookings/x/cancel?actor=abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_search_and_discovery() {
    let tmp = tempfile::tempdir().unwrap();
    let shops = (1..=12).map(|i| shop(i, &format!("Shop {i}"))).collect();
    let (state, _) = test_state(&tmp, shops).await;

    let (status, body) = call(
        &state,
        json_request("POST", "/api/shops/search-shops", json!({ "page": 2, "limit": "5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["totalShops"], 12);
    assert_eq!(body["shops"].as_array().unwrap().len(), 5);

    let (status, _) = call(
        &state,
        json_request("POST", "/api/shops/search-shops", json!({ "category": "Spa" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &state,
        json_request("POST", "/api/shops/discovery-search", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["nearYouShops"].as_array().unwrap().is_empty());
    assert_eq!(body["topRatedShops"].as_array().unwrap().len(), 10);

    let (status, body) = call(&state, get("/api/shops/home-feed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Barbershop"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_validate_telegram() {
    let tmp = tempfile::tempdir().unwrap();
    let (state, _) = test_state(&tmp, vec![]).await;
    let token = state.config.telegram_bot_token.clone().unwrap();

    let (status, body) = call(
        &state,
        json_request("POST", "/api/auth/validate-telegram", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No initData provided");

    let mut fields = BTreeMap::new();
    fields.insert("auth_date".to_string(), "1700000000".to_string());
    fields.insert(
        "user".to_string(),
        r#"{"id":42,"first_name":"Alice","username":"alice"}"#.to_string(),
    );
    let hash = sign(&fields, &token).unwrap();

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in &fields {
        serializer.append_pair(k, v);
    }
    let signed = serializer.append_pair("hash", &hash).finish();

    let (status, body) = call(
        &state,
        json_request("POST", "/api/auth/validate-telegram", json!({ "initData": signed })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User validated successfully");
    assert_eq!(body["user"]["telegramId"], "42");
    assert_eq!(body["user"]["name"], "Alice");

    let tampered = signed.replace("Alice", "Mallory");
    let (status, _) = call(
        &state,
        json_request("POST", "/api/auth/validate-telegram", json!({ "initData": tampered })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

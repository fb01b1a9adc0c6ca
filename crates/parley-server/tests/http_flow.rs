mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::{ServerOptions, spawn_server};

#[tokio::test]
async fn banner_and_health() {
    let server = spawn_server(ServerOptions::default()).await;

    let response = server.http.get(server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Parley"));

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "active_sessions": 0 }));
}

#[tokio::test]
async fn checkout_then_settlement_mints_token() {
    let server = spawn_server(ServerOptions::default()).await;
    server.post("/users", json!({ "id": 1 })).await;
    server.post("/admins", json!({ "id": 2 })).await;

    let (status, body) = server
        .post("/transactions", json!({ "user_id": 1, "admin_id": 2, "price": 1000 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["transaction"]["status"], "pending_payment");
    assert_eq!(body["checkout"]["token"], "offline-1");

    let (_, body) = server.get("/transactions/1").await;
    assert!(body.get("token").is_none());

    let (status, _) = server
        .post(
            "/payment-webhook",
            json!({ "order_id": "1", "transaction_status": "settlement", "fraud_status": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Replayed settlement is a no-op.
    let (status, _) = server
        .post(
            "/payment-webhook",
            json!({ "order_id": "1", "transaction_status": "settlement" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // A late pending notification cannot reopen a settled transaction.
    let (status, _) = server
        .post(
            "/payment-webhook",
            json!({ "order_id": "1", "transaction_status": "pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get("/transactions/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["status"], "success");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn pair_is_free_again_after_terminal_status() {
    let server = spawn_server(ServerOptions::default()).await;
    server.post("/users", json!({ "id": 1 })).await;
    server.post("/admins", json!({ "id": 2 })).await;
    let request = json!({ "user_id": 1, "admin_id": 2, "price": 500 });

    let (status, _) = server.post("/transactions", request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = server.post("/transactions", request.clone()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    server
        .post(
            "/payment-webhook",
            json!({ "order_id": "1", "transaction_status": "cancel" }),
        )
        .await;

    let (status, body) = server.post("/transactions", request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["transaction"]["id"], 2);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let server = spawn_server(ServerOptions::default()).await;
    server.post("/users", json!({ "id": 1 })).await;
    server.post("/admins", json!({ "id": 2 })).await;

    let (status, _) = server
        .post("/transactions", json!({ "user_id": 1, "admin_id": 2, "price": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.get("/transactions/nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.get("/transactions/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = server
        .http
        .post(server.url("/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn relay_parameters_are_checked_before_upgrade() {
    let server = spawn_server(ServerOptions::default()).await;

    let response = server.http.get(server.url("/relay")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .http
        .get(server.url("/relay?token=abc&role=owner"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid parameters but a plain HTTP request: the upgrade itself fails.
    let response = server
        .http
        .get(server.url("/relay?token=abc&role=user"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

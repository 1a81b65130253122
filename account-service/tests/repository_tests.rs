mod common;

use std::sync::Arc;

use account_service::domain::account::models::UserId;
use account_service::domain::account::ports::UserRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

async fn registered_user_id(app: &TestApp) -> String {
    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "nicola@example.com",
            "password": "pass_word!",
            "name": "Nicola",
            "last_name": "Rossi",
            "phone_number": "+39 02 1234 5678",
            "address": "1 Main Street",
            "location": "Milan"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_find_by_id_returns_stored_user() {
    let app = TestApp::spawn().await;
    let id = registered_user_id(&app).await;

    let repository = Arc::new(PostgresUserRepository::new(app.db.pool.clone()));
    let user_id = UserId::from_string(&id).expect("Response id is not a valid user id");

    let user = repository
        .find_by_id(&user_id)
        .await
        .expect("Lookup failed")
        .expect("User not found by id");

    assert_eq!(user.email.as_str(), "nicola@example.com");
    assert!(!user.verification_status);
    assert!(user.verification_token.is_some());
}

#[tokio::test]
async fn test_find_by_phone_number() {
    let app = TestApp::spawn().await;
    registered_user_id(&app).await;

    let repository = Arc::new(PostgresUserRepository::new(app.db.pool.clone()));

    let user = repository
        .find_by_phone_number("+39 02 1234 5678")
        .await
        .expect("Lookup failed")
        .expect("User not found by phone number");
    assert_eq!(user.email.as_str(), "nicola@example.com");

    let missing = repository
        .find_by_phone_number("+39 02 0000 0000")
        .await
        .expect("Lookup failed");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_delete_removes_user() {
    let app = TestApp::spawn().await;
    let id = registered_user_id(&app).await;

    let repository = Arc::new(PostgresUserRepository::new(app.db.pool.clone()));
    let user_id = UserId::from_string(&id).expect("Response id is not a valid user id");

    repository.delete(&user_id).await.expect("Delete failed");

    let user = repository
        .find_by_id(&user_id)
        .await
        .expect("Lookup failed");
    assert!(user.is_none());

    // Deleting again reports not found
    let result = repository.delete(&user_id).await;
    assert!(result.is_err());
}

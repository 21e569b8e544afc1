//! Administrative user lifecycle under `/api/pengguna`.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use personnel_service::models::Role;
use serde_json::json;

#[tokio::test]
async fn admin_creates_user_with_explicit_role() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;
    let token = app.token_for(admin);

    let (status, body) = app
        .post_json(
            "/api/pengguna",
            Some(&token),
            json!({
                "nama": "Sari",
                "nomorTelepon": "0800000020",
                "password": "supervisor1",
                "role": "SUPERVISOR",
                "email": "sari@example.com"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "SUPERVISOR");
    let id = body["data"]["nomor"].as_i64().unwrap();

    let (status, body) = app.get(&format!("/api/pengguna/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "sari@example.com");
}

#[tokio::test]
async fn create_rejects_unknown_role_literal() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;

    let (status, _) = app
        .post_json(
            "/api/pengguna",
            Some(&app.token_for(admin)),
            json!({
                "nama": "Loose",
                "nomorTelepon": "0800000021",
                "password": "password1",
                "role": "Admin"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_duplicate_email_case_insensitively() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;
    let token = app.token_for(admin);

    let first = json!({ "nama": "A", "nomorTelepon": "0801", "password": "password1", "email": "a@example.com" });
    let second = json!({ "nama": "B", "nomorTelepon": "0802", "password": "password1", "email": "A@Example.com" });

    assert_eq!(app.post_json("/api/pengguna", Some(&token), first).await.0, StatusCode::CREATED);
    let (status, body) = app.post_json("/api/pengguna", Some(&token), second).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email already in use");
}

#[tokio::test]
async fn employees_cannot_create_users() {
    let app = TestApp::spawn().await;
    let employee = app.seed_user(Role::Employee, "0800000002", "employee1").await;

    let (status, body) = app
        .post_json(
            "/api/pengguna",
            Some(&app.token_for(employee)),
            json!({ "nama": "X", "nomorTelepon": "0803", "password": "password1" }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "insufficient role");
}

#[tokio::test]
async fn soft_delete_frees_the_phone_number() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;
    let employee = app.seed_user(Role::Employee, "0811", "employee1").await;
    let token = app.token_for(admin);

    let (status, _) = app
        .delete(&format!("/api/pengguna/{}", employee), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/pengguna/{}", employee), Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/api/pengguna/{}", employee), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post_json(
            "/api/auth/register",
            None,
            json!({ "nama": "Again", "nomorTelepon": "0811", "password": "password1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["data"]["user"]["nomor"], employee);
}

#[tokio::test]
async fn admin_cannot_delete_self() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;
    let token = app.token_for(admin);

    let (status, body) = app
        .delete(&format!("/api/pengguna/{}", admin), Some(&token))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_numeric_id_answers_json_bad_request() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;
    let token = app.token_for(admin);

    let (status, body) = app.get("/api/pengguna/abc", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some());

    let (status, body) = app.delete("/api/pengguna/abc", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_rejects_blank_phone_number() {
    let app = TestApp::spawn().await;
    let admin = app.seed_user(Role::Admin, "0800000001", "adminpass1").await;

    let (status, body) = app
        .post_json(
            "/api/pengguna",
            Some(&app.token_for(admin)),
            json!({
                "nama": "Kosong",
                "nomorTelepon": "   ",
                "password": "password1"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "phone number and password are required");
}

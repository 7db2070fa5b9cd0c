// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::http::StatusCode;
use serde_json::json;

use super::helpers::{PASSWORD, bootstrap_operators, create_test_server, login, send};

#[tokio::test]
async fn test_first_admin_can_only_be_created_once() {
    let server = create_test_server();
    bootstrap_operators(&server.app).await;

    let (status, body) = send(
        &server.app,
        "POST",
        "/auth/first_admin",
        None,
        Some(json!({
            "login_name": "intruder",
            "display_name": "Intruder",
            "email": "intruder@agency.test",
            "password": PASSWORD
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let server = create_test_server();
    bootstrap_operators(&server.app).await;

    let (status, body) = send(
        &server.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "login_name": "agent1", "password": "not-the-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!(true));
}

#[tokio::test]
async fn test_whoami_reports_the_session_operator() {
    let server = create_test_server();
    let sessions = bootstrap_operators(&server.app).await;

    let (status, body) = send(
        &server.app,
        "GET",
        "/auth/whoami",
        Some(&sessions.agent),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["login_name"], json!("AGENT1"));
    assert_eq!(body["role"], json!("Agent"));
}

#[tokio::test]
async fn test_missing_and_malformed_authorization_are_rejected() {
    let server = create_test_server();

    let (status, body) = send(&server.app, "GET", "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Missing Authorization header"));

    let (status, _) = send(&server.app, "GET", "/cart", Some("not-a-session"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_the_session() {
    let server = create_test_server();
    bootstrap_operators(&server.app).await;
    let token = login(&server.app, "agent1").await;

    let (status, _) = send(&server.app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&server.app, "GET", "/auth/whoami", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_agent_cannot_create_operators() {
    let server = create_test_server();
    let sessions = bootstrap_operators(&server.app).await;

    let (status, _) = send(
        &server.app,
        "POST",
        "/operators",
        Some(&sessions.agent),
        Some(json!({
            "login_name": "agent3",
            "display_name": "Agent Three",
            "email": "agent3@agency.test",
            "role": "Agent",
            "password": PASSWORD
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

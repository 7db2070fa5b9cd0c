// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router fixtures and request helpers.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use hotel_booking_api::{
    AddToCartRequest, CreateFirstAdminRequest, CreateOperatorRequest, LoginRequest, Notification,
};
use hotel_booking_persistence::SqlitePersistence;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::mailer::{Mailer, MailerError};
use crate::storage::LocalFileStorage;
use crate::{AppState, ServerConfig, build_router};

pub const ADMIN_EMAIL: &str = "reservations@agency.test";
pub const AGENT_EMAIL: &str = "agent1@agency.test";
pub const HOTEL_EMAIL: &str = "frontdesk@harbourview.test";
pub const PASSWORD: &str = "correct-horse-battery";

/// Mailer that keeps every notification it is given.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: StdMutex<Vec<Notification>>,
}

impl Mailer for RecordingMailer {
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailerError>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        })
    }
}

impl RecordingMailer {
    /// Waits until at least `count` notifications were delivered.
    pub async fn wait_for(&self, count: usize) -> Vec<Notification> {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let sent = self.sent.lock().unwrap().clone();
                if sent.len() >= count {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("notifications were not delivered in time")
    }
}

pub struct TestServer {
    pub app: Router,
    pub mailer: Arc<RecordingMailer>,
    pub storage_root: PathBuf,
    pub room_price_id: i64,
    pub long_stay_promo_id: i64,
}

/// Builds a router over an in-memory database holding one hotel with a
/// nightly price and a three-night promo.
pub fn create_test_server() -> TestServer {
    let mut persistence =
        SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
    let hotel_id = persistence.create_hotel("Harbour View", HOTEL_EMAIL).unwrap();
    let room_type_id = persistence
        .create_room_type(hotel_id, "Deluxe Twin", 2)
        .unwrap();
    let room_price_id = persistence
        .create_room_price(room_type_id, "Breakfast included", 12000, "USD")
        .unwrap();
    let long_stay_promo_id = persistence
        .create_promo(hotel_id, "Stay longer", None, 3)
        .unwrap();

    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    let storage_root = std::env::temp_dir().join(format!("hotel_booking_server_{nanos}"));
    let mailer = Arc::new(RecordingMailer::default());

    let app_state = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        mailer: mailer.clone(),
        storage: LocalFileStorage::new(&storage_root, "http://localhost:3000/uploads").shared(),
        config: Arc::new(ServerConfig {
            admin_email: Some(String::from(ADMIN_EMAIL)),
            notification_timeout: Duration::from_secs(1),
        }),
    };

    TestServer {
        app: build_router(app_state),
        mailer,
        storage_root,
        room_price_id,
        long_stay_promo_id,
    }
}

/// Sends one request and returns the status with the decoded JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

pub async fn login(app: &Router, login_name: &str) -> String {
    let request = LoginRequest {
        login_name: login_name.to_string(),
        password: String::from(PASSWORD),
    };
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::to_value(&request).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["session_token"].as_str().unwrap().to_string()
}

/// Session tokens for the bootstrap admin and two agents.
pub struct Sessions {
    pub admin: String,
    pub agent: String,
    pub other_agent: String,
}

/// Creates the first admin over HTTP, then the two agents, and logs all
/// three in.
pub async fn bootstrap_operators(app: &Router) -> Sessions {
    let first_admin = CreateFirstAdminRequest {
        login_name: String::from("admin"),
        display_name: String::from("Reservations Desk"),
        email: String::from(ADMIN_EMAIL),
        password: String::from(PASSWORD),
    };
    let (status, body) = send(
        app,
        "POST",
        "/auth/first_admin",
        None,
        Some(serde_json::to_value(&first_admin).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "first admin failed: {body}");
    let admin = login(app, "admin").await;

    for (login_name, email) in [("agent1", AGENT_EMAIL), ("agent2", "agent2@agency.test")] {
        let request = CreateOperatorRequest {
            login_name: login_name.to_string(),
            display_name: format!("Agent {login_name}"),
            email: email.to_string(),
            role: String::from("Agent"),
            password: String::from(PASSWORD),
        };
        let (status, body) = send(
            app,
            "POST",
            "/operators",
            Some(&admin),
            Some(serde_json::to_value(&request).unwrap()),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "create operator failed: {body}");
    }

    Sessions {
        admin,
        agent: login(app, "agent1").await,
        other_agent: login(app, "agent2").await,
    }
}

/// Two nights from 2026-03-01.
pub fn add_request(room_price_id: i64, quantity: i64, promo_id: Option<i64>) -> Value {
    serde_json::to_value(AddToCartRequest {
        room_price_id,
        check_in: String::from("2026-03-01"),
        check_out: String::from("2026-03-03"),
        quantity,
        promo_id,
        additionals: Vec::new(),
    })
    .unwrap()
}

/// Fills the agent's cart with one room and checks it out with guest
/// "Jane Doe". Returns the checkout response body.
pub async fn submit_booking(server: &TestServer, agent: &str) -> Value {
    let (status, cart) = send(
        &server.app,
        "POST",
        "/cart/items",
        Some(agent),
        Some(add_request(server.room_price_id, 1, None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "add to cart failed: {cart}");
    let detail_id = cart["created_details"][0]["booking_detail_id"]
        .as_i64()
        .unwrap();

    let checkout = json!({
        "guests": [
            { "name": "Jane Doe", "honorific": "Ms", "category": "adult", "age": null }
        ],
        "assignments": [
            { "booking_detail_id": detail_id, "guest_name": "Jane Doe" }
        ]
    });
    let (status, body) = send(
        &server.app,
        "POST",
        "/cart/checkout",
        Some(agent),
        Some(checkout),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "checkout failed: {body}");
    body
}

//! End-to-end API flows dispatched through the in-process router.
//!
//! Run: cargo test -p booking-server --test api_flow

use axum::body::Body;
use booking_server::auth::JwtConfig;
use booking_server::db::DbService;
use booking_server::services::HttpService;
use booking_server::{Config, ServerState};
use http::StatusCode;
use http_body_util::BodyExt;
use serde_json::{Value, json};

fn test_config() -> Config {
    Config {
        work_dir: ".".to_string(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "api-flow-test-secret-key-0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "booking-server".to_string(),
            audience: "booking-clients".to_string(),
        },
        environment: "test".to_string(),
        event_queue_capacity: 64,
        admin_username: "admin".to_string(),
        admin_password: "admin-test-password".to_string(),
    }
}

async fn setup() -> HttpService {
    let config = test_config();
    let db = DbService::memory().await.unwrap().db;
    let state = ServerState::with_db(&config, db).await.unwrap();
    state.start_background_tasks();

    let http = HttpService::new(config);
    http.initialize(state);
    http
}

async fn send(
    http: &HttpService,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = http::Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = http.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(http: &HttpService, username: &str, password: &str) -> String {
    let (status, body) = send(
        http,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn register(http: &HttpService, username: &str, password: &str) -> Value {
    let (status, body) = send(
        http,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

#[tokio::test]
async fn registration_and_login() {
    let http = setup().await;

    let user = register(&http, "alice", "alice-password").await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "User");
    // The password hash never leaves the server
    assert!(user.get("hashPass").is_none());

    // Duplicate username
    let (status, body) = send(
        &http,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "alice", "password": "other-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Too-short password
    let (status, _) = send(
        &http,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "bob", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong password yields the unified message
    let (status, body) = send(
        &http,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid username or password");

    // Unknown user yields the same message
    let (_, body2) = send(
        &http,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "nobody", "password": "whatever"})),
    )
    .await;
    assert_eq!(body2["message"], body["message"]);

    let token = login(&http, "alice", "alice-password").await;
    let (status, me) = send(&http, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
async fn room_management_is_admin_gated() {
    let http = setup().await;
    register(&http, "alice", "alice-password").await;
    let alice = login(&http, "alice", "alice-password").await;
    let admin = login(&http, "admin", "admin-test-password").await;

    let payload = json!({"name": "Conference A", "capacity": 12, "type": "conference"});

    // Anonymous and non-admin callers are refused
    let (status, _) = send(&http, "POST", "/api/rooms", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&http, "POST", "/api/rooms", Some(&alice), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, room) = send(&http, "POST", "/api/rooms", Some(&admin), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["type"], "conference");
    let room_id = room["id"].as_str().unwrap().to_string();

    // Invalid payloads
    let (status, _) = send(
        &http,
        "POST",
        "/api/rooms",
        Some(&admin),
        Some(json!({"name": "X", "capacity": 0, "type": "workspace"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &http,
        "POST",
        "/api/rooms",
        Some(&admin),
        Some(json!({"name": "X", "capacity": 4, "type": "garage"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The catalogue is public, the rest of the API is not
    let (status, rooms) = send(&http, "GET", "/api/rooms", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    let (status, _) = send(&http, "GET", "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Update and fetch
    let (status, updated) = send(
        &http,
        "PUT",
        &format!("/api/rooms/{room_id}"),
        Some(&admin),
        Some(json!({"capacity": 20})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["capacity"], 20);
    assert_eq!(updated["name"], "Conference A");

    let (status, _) = send(
        &http,
        "GET",
        &format!("/api/rooms/{room_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Deleting an empty room works
    let (status, _) = send(
        &http,
        "DELETE",
        &format!("/api/rooms/{room_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &http,
        "GET",
        &format!("/api/rooms/{room_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_lifecycle_and_conflicts() {
    let http = setup().await;
    register(&http, "alice", "alice-password").await;
    register(&http, "bob", "bob-password").await;
    let alice = login(&http, "alice", "alice-password").await;
    let bob = login(&http, "bob", "bob-password").await;
    let admin = login(&http, "admin", "admin-test-password").await;

    let (_, room) = send(
        &http,
        "POST",
        "/api/rooms",
        Some(&admin),
        Some(json!({"name": "Conference A", "capacity": 12, "type": "conference"})),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_string();

    // Alice reserves 10:00-11:00
    let (status, booking) = send(
        &http,
        "POST",
        "/api/bookings",
        Some(&alice),
        Some(json!({
            "room": room_id,
            "startTime": "2026-03-02T10:00:00Z",
            "endTime": "2026-03-02T11:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {booking}");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // Bob's overlapping attempt is refused and told who is in the way
    let (status, conflict) = send(
        &http,
        "POST",
        "/api/bookings",
        Some(&bob),
        Some(json!({
            "room": room_id,
            "startTime": "2026-03-02T10:30:00Z",
            "endTime": "2026-03-02T11:30:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["error"], "conflict");
    assert_eq!(
        conflict["details"]["conflictingBooking"]["id"],
        Value::String(booking_id.clone())
    );

    // Back-to-back is fine
    let (status, bob_booking) = send(
        &http,
        "POST",
        "/api/bookings",
        Some(&bob),
        Some(json!({
            "room": room_id,
            "startTime": "2026-03-02T11:00:00Z",
            "endTime": "2026-03-02T12:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bob_booking_id = bob_booking["id"].as_str().unwrap().to_string();

    // Invalid interval
    let (status, _) = send(
        &http,
        "POST",
        "/api/bookings",
        Some(&alice),
        Some(json!({
            "room": room_id,
            "startTime": "2026-03-02T13:00:00Z",
            "endTime": "2026-03-02T13:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown room
    let (status, _) = send(
        &http,
        "POST",
        "/api/bookings",
        Some(&alice),
        Some(json!({
            "room": "room:doesnotexist",
            "startTime": "2026-03-02T10:00:00Z",
            "endTime": "2026-03-02T11:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Missing fields
    let (status, _) = send(
        &http,
        "POST",
        "/api/bookings",
        Some(&alice),
        Some(json!({"room": room_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Listing: users see their own, admins see everything, entries carry
    // the denormalized projections
    let (_, alice_list) = send(&http, "GET", "/api/bookings", Some(&alice), None).await;
    let alice_list = alice_list.as_array().unwrap().clone();
    assert_eq!(alice_list.len(), 1);
    assert_eq!(alice_list[0]["room"]["name"], "Conference A");
    assert_eq!(alice_list[0]["user"]["username"], "alice");

    let (_, admin_list) = send(&http, "GET", "/api/bookings", Some(&admin), None).await;
    assert_eq!(admin_list.as_array().unwrap().len(), 2);

    // Ownership: alice cannot touch bob's booking, the admin can
    let (status, _) = send(
        &http,
        "PUT",
        &format!("/api/bookings/{bob_booking_id}"),
        Some(&alice),
        Some(json!({"endTime": "2026-03-02T12:30:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &http,
        "DELETE",
        &format!("/api/bookings/{bob_booking_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, moved) = send(
        &http,
        "PUT",
        &format!("/api/bookings/{bob_booking_id}"),
        Some(&admin),
        Some(json!({"endTime": "2026-03-02T12:30:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["user"], bob_booking["user"]);

    // Self-exclusion: alice may shift her own slot onto itself
    let (status, _) = send(
        &http,
        "PUT",
        &format!("/api/bookings/{booking_id}"),
        Some(&alice),
        Some(json!({
            "startTime": "2026-03-02T10:15:00Z",
            "endTime": "2026-03-02T11:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Update conflict (alice into bob's slot) reports the collision
    let (status, body) = send(
        &http,
        "PUT",
        &format!("/api/bookings/{booking_id}"),
        Some(&alice),
        Some(json!({"endTime": "2026-03-02T11:30:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["details"]["conflictingBooking"]["id"],
        Value::String(bob_booking_id.clone())
    );

    // Unknown booking id
    let (status, _) = send(
        &http,
        "PUT",
        "/api/bookings/booking:missing",
        Some(&alice),
        Some(json!({"endTime": "2026-03-02T11:30:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A room with bookings cannot be deleted
    let (status, _) = send(
        &http,
        "DELETE",
        &format!("/api/rooms/{room_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Cancel returns the removed record
    let (status, removed) = send(
        &http,
        "DELETE",
        &format!("/api/bookings/{booking_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], Value::String(booking_id));
}

#[tokio::test]
async fn user_deletion_cascades_to_bookings() {
    let http = setup().await;
    let alice_user = register(&http, "alice", "alice-password").await;
    let alice_id = alice_user["id"].as_str().unwrap().to_string();
    let alice = login(&http, "alice", "alice-password").await;
    let admin = login(&http, "admin", "admin-test-password").await;

    let (_, room) = send(
        &http,
        "POST",
        "/api/rooms",
        Some(&admin),
        Some(json!({"name": "Desk 1", "capacity": 1, "type": "workspace"})),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_string();

    for (start, end) in [
        ("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
        ("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z"),
    ] {
        let (status, _) = send(
            &http,
            "POST",
            "/api/bookings",
            Some(&alice),
            Some(json!({"room": room_id, "startTime": start, "endTime": end})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Only admins may administer users
    let (status, _) = send(&http, "GET", "/api/users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, users) = send(&http, "GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2); // admin + alice

    let (status, _) = send(
        &http,
        "DELETE",
        &format!("/api/users/{alice_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Alice's bookings went with her; the room is deletable again
    let (_, admin_list) = send(&http, "GET", "/api/bookings", Some(&admin), None).await;
    assert_eq!(admin_list.as_array().unwrap().len(), 0);
    let (status, _) = send(
        &http,
        "DELETE",
        &format!("/api/rooms/{room_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Deleting a missing user is a 404
    let (status, _) = send(
        &http,
        "DELETE",
        &format!("/api/users/{alice_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//! Scheduler properties under concurrency.
//!
//! Run: cargo test -p booking-server --test scheduling

use booking_server::booking::{BookingError, BookingRequest};
use booking_server::db::DbService;
use booking_server::db::models::{Role, RoomCreate, RoomKind, RoomId};
use booking_server::db::repository::{BookingRepository, RoomRepository, UserRepository};
use booking_server::{BookingScheduler, CurrentUser, EventBus};
use futures::future::join_all;

async fn setup() -> (BookingScheduler, surrealdb::Surreal<surrealdb::engine::local::Db>) {
    let db = DbService::memory().await.unwrap().db;
    let events = EventBus::new(256);
    events.start_publisher();
    (BookingScheduler::new(db.clone(), events), db)
}

async fn make_room(db: &surrealdb::Surreal<surrealdb::engine::local::Db>, name: &str) -> RoomId {
    RoomRepository::new(db.clone())
        .create(RoomCreate {
            name: name.to_string(),
            capacity: 10,
            kind: RoomKind::Workspace,
        })
        .await
        .unwrap()
        .id
        .unwrap()
}

async fn make_user(
    db: &surrealdb::Surreal<surrealdb::engine::local::Db>,
    username: &str,
) -> CurrentUser {
    let user = UserRepository::new(db.clone())
        .create(username.to_string(), "test-password", Role::User)
        .await
        .unwrap();
    CurrentUser {
        id: user.id.unwrap().to_string(),
        username: user.username,
        role: user.role,
    }
}

const HOUR: i64 = 3_600_000;
const MINUTE: i64 = 60_000;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_creates_admit_exactly_one() {
    let (scheduler, db) = setup().await;
    let room = make_room(&db, "Open Space").await;
    let base = 10 * HOUR;

    // 8 staggered requests, every pair overlapping (max offset 35min,
    // duration 60min)
    let mut tasks = Vec::new();
    for i in 0..8i64 {
        let scheduler = scheduler.clone();
        let room = room.clone();
        let caller = make_user(&db, &format!("user{i}")).await;
        tasks.push(tokio::spawn(async move {
            scheduler
                .create(
                    BookingRequest {
                        room,
                        start_time: base + i * 5 * MINUTE,
                        end_time: base + HOUR + i * 5 * MINUTE,
                    },
                    &caller,
                )
                .await
        }));
    }

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::Conflict(_))))
        .count();

    assert_eq!(successes, 1, "exactly one overlapping create may commit");
    assert_eq!(conflicts, results.len() - 1);

    // No-overlap invariant holds over the persisted state
    assert_no_overlaps(&db, &room).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_disjoint_creates_all_succeed() {
    let (scheduler, db) = setup().await;
    let room = make_room(&db, "Open Space").await;
    let caller = make_user(&db, "alice").await;
    let base = 8 * HOUR;

    // Back-to-back slots: no pair overlaps, so no request may be refused
    let mut tasks = Vec::new();
    for i in 0..6i64 {
        let scheduler = scheduler.clone();
        let room = room.clone();
        let caller = caller.clone();
        tasks.push(tokio::spawn(async move {
            scheduler
                .create(
                    BookingRequest {
                        room,
                        start_time: base + i * HOUR,
                        end_time: base + (i + 1) * HOUR,
                    },
                    &caller,
                )
                .await
        }));
    }

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(results.iter().all(|r| r.is_ok()));
    assert_no_overlaps(&db, &room).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_on_distinct_rooms_do_not_interfere() {
    let (scheduler, db) = setup().await;
    let caller = make_user(&db, "alice").await;
    let base = 9 * HOUR;

    let mut tasks = Vec::new();
    for i in 0..4 {
        let room = make_room(&db, &format!("Room {i}")).await;
        let scheduler = scheduler.clone();
        let caller = caller.clone();
        tasks.push(tokio::spawn(async move {
            scheduler
                .create(
                    BookingRequest {
                        room,
                        start_time: base,
                        end_time: base + HOUR,
                    },
                    &caller,
                )
                .await
        }));
    }

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    // Same interval, different rooms: every request succeeds
    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn cascade_leaves_no_orphaned_bookings() {
    let (scheduler, db) = setup().await;
    let room = make_room(&db, "Open Space").await;
    let alice = make_user(&db, "alice").await;
    let bob = make_user(&db, "bob").await;
    let base = 10 * HOUR;

    for (i, caller) in [&alice, &alice, &bob].iter().enumerate() {
        scheduler
            .create(
                BookingRequest {
                    room: room.clone(),
                    start_time: base + i as i64 * HOUR,
                    end_time: base + (i as i64 + 1) * HOUR,
                },
                caller,
            )
            .await
            .unwrap();
    }

    let alice_id: surrealdb::RecordId = alice.id.parse().unwrap();
    let removed = scheduler.cancel_all_for_user(&alice_id).await.unwrap();
    assert_eq!(removed, 2);
    UserRepository::new(db.clone())
        .delete(&alice.id)
        .await
        .unwrap();

    // Every remaining booking resolves to an existing owner
    let users = UserRepository::new(db.clone());
    let remaining = BookingRepository::new(db.clone()).find_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    for booking in &remaining {
        let owner = users.find_by_id(&booking.user.to_string()).await.unwrap();
        assert!(owner.is_some(), "booking references a deleted owner");
    }
}

#[tokio::test]
async fn state_initializes_on_disk_database_and_seeds_admin() {
    let tmp = tempfile::tempdir().unwrap();
    let config = booking_server::Config {
        work_dir: tmp.path().to_string_lossy().into_owned(),
        http_port: 0,
        jwt: booking_server::auth::JwtConfig {
            secret: "bootstrap-test-secret-key-0123456789abcd".to_string(),
            expiration_minutes: 60,
            issuer: "booking-server".to_string(),
            audience: "booking-clients".to_string(),
        },
        environment: "test".to_string(),
        event_queue_capacity: 16,
        admin_username: "admin".to_string(),
        admin_password: "admin-test-password".to_string(),
    };

    let state = booking_server::ServerState::initialize(&config).await.unwrap();

    let admin = UserRepository::new(state.get_db())
        .find_by_username("admin")
        .await
        .unwrap()
        .expect("admin account seeded at startup");
    assert_eq!(admin.role, Role::Admin);
    assert!(admin.verify_password("admin-test-password").unwrap());

    // Seeding is idempotent across restarts
    let state2 = booking_server::ServerState::with_db(&config, state.get_db())
        .await
        .unwrap();
    let users = UserRepository::new(state2.get_db()).find_all().await.unwrap();
    assert_eq!(users.len(), 1);
}

/// Assert that no two persisted bookings of a room overlap
async fn assert_no_overlaps(
    db: &surrealdb::Surreal<surrealdb::engine::local::Db>,
    room: &RoomId,
) {
    let bookings = BookingRepository::new(db.clone()).find_all().await.unwrap();
    let intervals: Vec<(i64, i64)> = bookings
        .iter()
        .filter(|b| b.room == *room)
        .map(|b| (b.start_time, b.end_time))
        .collect();

    for (i, a) in intervals.iter().enumerate() {
        for b in intervals.iter().skip(i + 1) {
            assert!(
                !(a.0 < b.1 && b.0 < a.1),
                "overlapping intervals persisted: {:?} and {:?}",
                a,
                b
            );
        }
    }
}

//! Integration tests for the reserve/cancel protocol: capacity bounds under
//! concurrency, duplicate prevention, rollback atomicity, and authorization.

mod common;

use std::sync::Arc;

use tokio::sync::Barrier;

use booking_core::error::ReservationError;
use booking_core::models::{AuthenticatedUser, UserRole};
use common::{FlakyReservationStore, TestEngine};

fn user(user_id: &str) -> AuthenticatedUser {
    AuthenticatedUser::new(user_id, UserRole::User)
}

fn admin(user_id: &str) -> AuthenticatedUser {
    AuthenticatedUser::new(user_id, UserRole::Admin)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reserves_from_distinct_users_never_overbook() {
    let engine = TestEngine::new();
    let capacity = 8u32;
    let attempts = 32u32;
    engine.seed_event("evt-1", capacity);

    let barrier = Arc::new(Barrier::new(attempts as usize));
    let mut handles = Vec::new();
    for i in 0..attempts {
        let coordinator = Arc::clone(&engine.coordinator);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            coordinator.reserve(&format!("user-{i}"), "evt-1").await
        }));
    }

    let mut successes = 0u32;
    let mut at_capacity = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ReservationError::AtCapacity { .. }) => at_capacity += 1,
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(successes, capacity);
    assert_eq!(at_capacity, attempts - capacity);

    let occupancy = engine.coordinator.event_occupancy("evt-1").unwrap();
    assert_eq!(occupancy.booked_count, capacity);
    assert_eq!(occupancy.capacity, capacity);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_reserves_from_one_user_yield_single_booking() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 100);
    engine.seed_user("user-1", UserRole::User);

    let attempts = 8u32;
    let barrier = Arc::new(Barrier::new(attempts as usize));
    let mut handles = Vec::new();
    for _ in 0..attempts {
        let coordinator = Arc::clone(&engine.coordinator);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            coordinator.reserve("user-1", "evt-1").await
        }));
    }

    let mut successes = 0u32;
    let mut duplicates = 0u32;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ReservationError::DuplicateBooking { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(duplicates, attempts - 1);
    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        1
    );
    assert!(engine.coordinator.booking_status("user-1", "evt-1").is_booked);
}

#[tokio::test]
async fn cancel_then_rebook_restores_occupancy() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 2);
    engine.seed_user("user-1", UserRole::User);

    let detail = engine.coordinator.reserve("user-1", "evt-1").await.unwrap();
    assert_eq!(detail.event.booked_count, 1);
    assert_eq!(detail.user.email, "user-1@example.com");

    engine
        .coordinator
        .cancel(detail.reservation.reservation_id, &user("user-1"))
        .await
        .unwrap();
    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        0
    );
    assert!(!engine.coordinator.booking_status("user-1", "evt-1").is_booked);

    // Same user can book again after cancelling
    let rebooked = engine.coordinator.reserve("user-1", "evt-1").await.unwrap();
    assert_eq!(rebooked.event.booked_count, 1);
    assert_ne!(
        rebooked.reservation.reservation_id,
        detail.reservation.reservation_id
    );
}

#[tokio::test]
async fn reserve_against_unknown_event_changes_nothing() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);

    let err = engine
        .coordinator
        .reserve("user-1", "evt-missing")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::EventNotFound { .. }));
    assert_eq!(err.user_message(), "Event not found");

    // No record anywhere: not in the ledger, not in the index, not in the store
    assert!(engine.coordinator.event_occupancy("evt-missing").is_none());
    assert!(!engine
        .coordinator
        .booking_status("user-1", "evt-missing")
        .is_booked);
    let all = engine
        .coordinator
        .list_all_reservations(&admin("admin-1"))
        .await
        .unwrap();
    assert!(all.is_empty());
    // The seeded event is also untouched
    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        0
    );
}

#[tokio::test]
async fn cancel_by_non_owner_is_rejected_without_side_effects() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);
    engine.seed_user("owner", UserRole::User);

    let detail = engine.coordinator.reserve("owner", "evt-1").await.unwrap();

    let err = engine
        .coordinator
        .cancel(detail.reservation.reservation_id, &user("intruder"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Unauthorized { .. }));
    assert_eq!(err.user_message(), "Not authorized");

    // Reservation, capacity, and uniqueness entries are unchanged
    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        1
    );
    assert!(engine.coordinator.booking_status("owner", "evt-1").is_booked);
    let fetched = engine
        .coordinator
        .get_reservation(detail.reservation.reservation_id, &user("owner"))
        .await
        .unwrap();
    assert_eq!(fetched.reservation, detail.reservation);
}

#[tokio::test]
async fn admin_may_cancel_any_reservation() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);

    let detail = engine.coordinator.reserve("owner", "evt-1").await.unwrap();
    engine
        .coordinator
        .cancel(detail.reservation.reservation_id, &admin("admin-1"))
        .await
        .unwrap();

    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        0
    );
    assert!(!engine.coordinator.booking_status("owner", "evt-1").is_booked);
}

#[tokio::test]
async fn cancel_of_unknown_reservation_fails_not_found() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);

    let err = engine
        .coordinator
        .cancel(uuid::Uuid::new_v4(), &user("user-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::ReservationNotFound { .. }));
    assert_eq!(err.user_message(), "Booking not found");
}

#[tokio::test]
async fn transient_storage_conflicts_are_retried_without_double_commit() {
    let store = FlakyReservationStore::failing(2);
    let engine = TestEngine::with_store(store);
    engine.seed_event("evt-1", 5);

    // Default budget is three attempts; two injected failures then success
    let detail = engine.coordinator.reserve("user-1", "evt-1").await.unwrap();
    assert_eq!(detail.event.booked_count, 1);
    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        1
    );
}

#[tokio::test]
async fn exhausted_storage_retries_leave_no_partial_state() {
    let store = FlakyReservationStore::failing(10);
    let engine = TestEngine::with_store(store);
    engine.seed_event("evt-1", 5);

    let err = engine
        .coordinator
        .reserve("user-1", "evt-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::StorageConflict { .. }));

    // Ledger increment and index entry were rolled back on every attempt
    assert_eq!(
        engine.coordinator.event_occupancy("evt-1").unwrap().booked_count,
        0
    );
    assert!(!engine.coordinator.booking_status("user-1", "evt-1").is_booked);
}

#[tokio::test]
async fn listings_are_scoped_and_admin_gated() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);
    engine.seed_event("evt-2", 5);
    engine.seed_user("user-1", UserRole::User);
    engine.seed_user("user-2", UserRole::User);

    engine.coordinator.reserve("user-1", "evt-1").await.unwrap();
    engine.coordinator.reserve("user-1", "evt-2").await.unwrap();
    engine.coordinator.reserve("user-2", "evt-1").await.unwrap();

    let mine = engine
        .coordinator
        .list_user_reservations("user-1")
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|d| d.reservation.user_id == "user-1"));

    let all = engine
        .coordinator
        .list_all_reservations(&admin("admin-1"))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let err = engine
        .coordinator
        .list_all_reservations(&user("user-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Unauthorized { .. }));
}

#[tokio::test]
async fn reservation_fetch_is_owner_or_admin_only() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);

    let detail = engine.coordinator.reserve("owner", "evt-1").await.unwrap();
    let id = detail.reservation.reservation_id;

    assert!(engine.coordinator.get_reservation(id, &user("owner")).await.is_ok());
    assert!(engine
        .coordinator
        .get_reservation(id, &admin("admin-1"))
        .await
        .is_ok());
    let err = engine
        .coordinator
        .get_reservation(id, &user("stranger"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::Unauthorized { .. }));
}

#[tokio::test]
async fn capacity_edit_is_admin_gated_and_bounded_by_bookings() {
    let engine = TestEngine::new();
    engine.seed_event("evt-1", 5);

    engine.coordinator.reserve("user-1", "evt-1").await.unwrap();
    engine.coordinator.reserve("user-2", "evt-1").await.unwrap();

    let err = engine
        .coordinator
        .set_event_capacity("evt-1", 10, &user("user-1"))
        .unwrap_err();
    assert!(matches!(err, ReservationError::Unauthorized { .. }));

    let err = engine
        .coordinator
        .set_event_capacity("evt-1", 1, &admin("admin-1"))
        .unwrap_err();
    assert!(matches!(err, ReservationError::InvalidCapacity { .. }));

    let occupancy = engine
        .coordinator
        .set_event_capacity("evt-1", 3, &admin("admin-1"))
        .unwrap();
    assert_eq!(occupancy.capacity, 3);
    assert_eq!(occupancy.booked_count, 2);

    // The new bound is enforced immediately
    engine.coordinator.reserve("user-3", "evt-1").await.unwrap();
    let err = engine
        .coordinator
        .reserve("user-4", "evt-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::AtCapacity { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_events_reserve_in_parallel() {
    let engine = TestEngine::new();
    for i in 0..4 {
        engine.seed_event(&format!("evt-{i}"), 50);
    }

    let mut handles = Vec::new();
    for i in 0..4 {
        for j in 0..25 {
            let coordinator = Arc::clone(&engine.coordinator);
            handles.push(tokio::spawn(async move {
                coordinator
                    .reserve(&format!("user-{i}-{j}"), &format!("evt-{i}"))
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for i in 0..4 {
        assert_eq!(
            engine
                .coordinator
                .event_occupancy(&format!("evt-{i}"))
                .unwrap()
                .booked_count,
            25
        );
    }
}
